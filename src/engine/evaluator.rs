use serde::{Deserialize, Serialize};

use crate::engine::operator::Operator;
use crate::engine::problem::Problem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnswerStatus {
    #[default]
    Idle,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub problem: Problem,
    pub chosen: u32,
    pub is_correct: bool,
}

impl Attempt {
    pub fn status(&self) -> AnswerStatus {
        if self.is_correct {
            AnswerStatus::Correct
        } else {
            AnswerStatus::Incorrect
        }
    }
}

/// A finalized test answer as handed to the session controller, which
/// derives correctness on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredProblem {
    pub operand1: u32,
    pub operand2: u32,
    pub operator: Operator,
    pub user_answer: u32,
    pub correct_answer: u32,
}

impl From<&Attempt> for AnsweredProblem {
    fn from(attempt: &Attempt) -> Self {
        Self {
            operand1: attempt.problem.operand1,
            operand2: attempt.problem.operand2,
            operator: attempt.problem.operator,
            user_answer: attempt.chosen,
            correct_answer: attempt.problem.correct_answer(),
        }
    }
}

pub fn evaluate(problem: &Problem, chosen: u32) -> Attempt {
    Attempt {
        problem: *problem,
        chosen,
        is_correct: chosen == problem.correct_answer(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        let p = Problem::new(7, Operator::Add, 3);
        assert!(evaluate(&p, 10).is_correct);
        assert!(!evaluate(&p, 9).is_correct);
        assert_eq!(evaluate(&p, 11).status(), AnswerStatus::Incorrect);
    }

    #[test]
    fn test_division_by_zero_fallback() {
        let p = Problem::new(8, Operator::Div, 0);
        assert!(evaluate(&p, 0).is_correct);
        assert!(!evaluate(&p, 8).is_correct);
    }

    #[test]
    fn test_answered_problem_from_attempt() {
        let attempt = evaluate(&Problem::new(20, Operator::Div, 5), 5);
        let answered = AnsweredProblem::from(&attempt);
        assert_eq!(answered.user_answer, 5);
        assert_eq!(answered.correct_answer, 4);
        assert_eq!(answered.operator, Operator::Div);
    }
}
