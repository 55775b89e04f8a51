use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::board::Board;
use crate::engine::evaluator::AnsweredProblem;
use crate::engine::operator::Operator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub operand1: u32,
    pub operand2: u32,
    pub operator: Operator,
    pub user_answer: u32,
    pub correct_answer: u32,
    pub is_correct: bool,
}

impl From<AnsweredProblem> for TestResult {
    fn from(answered: AnsweredProblem) -> Self {
        Self {
            operand1: answered.operand1,
            operand2: answered.operand2,
            operator: answered.operator,
            user_answer: answered.user_answer,
            correct_answer: answered.correct_answer,
            is_correct: answered.user_answer == answered.correct_answer,
        }
    }
}

impl TestResult {
    /// `7 + 3 = 10`
    pub fn equation(&self) -> String {
        format!(
            "{} {} {} = {}",
            self.operand1,
            self.operator.symbol(),
            self.operand2,
            self.correct_answer
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub timestamp: DateTime<Utc>,
    pub board: Board,
    pub results: Vec<TestResult>,
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

impl TestReport {
    pub fn from_results(board: Board, results: &[TestResult], timestamp: DateTime<Utc>) -> Self {
        let correct = results.iter().filter(|r| r.is_correct).count();
        let total = results.len();
        let percentage = if total > 0 {
            (correct as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };
        Self {
            timestamp,
            board,
            results: results.to_vec(),
            correct,
            total,
            percentage,
        }
    }

    /// Printable summary, one line per question.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.timestamp.with_timezone(&Local);
        writeln!(f, "Arithmetic Test Report")?;
        writeln!(f, "{}", "=".repeat(22))?;
        writeln!(f)?;
        writeln!(f, "Date:   {}", local.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "Board:  {}", self.board.title())?;
        writeln!(
            f,
            "Score:  {} / {} ({}%)",
            self.correct, self.total, self.percentage
        )?;
        writeln!(f)?;
        writeln!(f, "Answers:")?;
        for (i, r) in self.results.iter().enumerate() {
            let verdict = if r.is_correct { "Correct" } else { "Wrong" };
            writeln!(
                f,
                "{:>3}.  {:<16} (your answer: {:>3})  {}",
                i + 1,
                r.equation(),
                r.user_answer,
                verdict
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(a: u32, op: Operator, b: u32, user: u32) -> TestResult {
        let correct_answer = op.apply(a, b);
        TestResult::from(AnsweredProblem {
            operand1: a,
            operand2: b,
            operator: op,
            user_answer: user,
            correct_answer,
        })
    }

    #[test]
    fn test_correctness_derived_from_answers() {
        assert!(result(7, Operator::Add, 3, 10).is_correct);
        assert!(!result(7, Operator::Add, 3, 9).is_correct);
    }

    #[test]
    fn test_percentage_rounds() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let results = vec![
            result(2, Operator::Add, 2, 4),
            result(9, Operator::Sub, 3, 6),
            result(3, Operator::Mul, 3, 8),
        ];
        let report = TestReport::from_results(Board::Line20, &results, ts);
        assert_eq!(report.correct, 2);
        assert_eq!(report.total, 3);
        assert_eq!(report.percentage, 67);
    }

    #[test]
    fn test_empty_report_is_zero_percent() {
        let report = TestReport::from_results(Board::Grid100, &[], Utc::now());
        assert_eq!(report.percentage, 0);
    }

    #[test]
    fn test_render_text_lists_each_question() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let results = vec![
            result(20, Operator::Div, 5, 4),
            result(6, Operator::Mul, 3, 17),
        ];
        let text = TestReport::from_results(Board::Line20, &results, ts).render_text();
        assert!(text.contains("Score:  1 / 2 (50%)"));
        assert!(text.contains("1.  20 \u{00f7} 5 = 4"));
        assert!(text.contains("(your answer:  17)  Wrong"));
        assert_eq!(text.lines().filter(|l| l.contains("your answer")).count(), 2);
    }

    #[test]
    fn test_display_matches_saved_text() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let report = TestReport::from_results(Board::Grid100, &[result(9, Operator::Sub, 4, 5)], ts);
        let shown = format!("{report}");
        assert_eq!(shown, report.render_text());
        assert!(shown.starts_with("Arithmetic Test Report\n"));
        assert!(shown.ends_with("Correct\n"));
    }
}
