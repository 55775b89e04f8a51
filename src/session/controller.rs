use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::board::Board;
use crate::engine::evaluator::AnsweredProblem;
use crate::engine::operator::Operator;
use crate::engine::scheduler::Scheduler;
use crate::session::board::PlayMode;
use crate::session::report::{TestReport, TestResult};

pub const TEST_QUESTIONS: usize = 10;
/// Feedback time before the next test question loads.
pub const NEXT_QUESTION_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    pub operators: Vec<Operator>,
    pub hints_allowed: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            operators: vec![Operator::Add],
            hints_allowed: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Practice,
    Setup,
    Running,
    Report,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ControllerTask {
    NextQuestion,
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Boards should regenerate for this key.
    NextQuestion(u64),
    Finished,
}

/// Toggle `op` in `ops`, refusing to leave the set empty.
pub fn toggle_operator(ops: &mut Vec<Operator>, op: Operator) -> bool {
    if let Some(idx) = ops.iter().position(|&o| o == op) {
        if ops.len() == 1 {
            return false;
        }
        ops.remove(idx);
    } else {
        ops.push(op);
        ops.sort();
    }
    true
}

pub struct SessionController {
    phase: SessionPhase,
    practice_operators: Vec<Operator>,
    setup: TestConfig,
    test_config: Option<TestConfig>,
    results: Vec<TestResult>,
    problem_key: u64,
    started_at: Option<DateTime<Utc>>,
    timers: Scheduler<ControllerTask>,
}

impl SessionController {
    pub fn new(practice_operators: Vec<Operator>, setup: TestConfig) -> Self {
        let practice_operators = if practice_operators.is_empty() {
            vec![Operator::Add]
        } else {
            practice_operators
        };
        Self {
            phase: SessionPhase::Practice,
            practice_operators,
            setup,
            test_config: None,
            results: Vec::new(),
            problem_key: 0,
            started_at: None,
            timers: Scheduler::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_test_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn practice_operators(&self) -> &[Operator] {
        &self.practice_operators
    }

    pub fn toggle_practice_operator(&mut self, op: Operator) -> bool {
        toggle_operator(&mut self.practice_operators, op)
    }

    pub fn setup(&self) -> &TestConfig {
        &self.setup
    }

    pub fn toggle_setup_operator(&mut self, op: Operator) -> bool {
        toggle_operator(&mut self.setup.operators, op)
    }

    pub fn toggle_setup_hints(&mut self) {
        self.setup.hints_allowed = !self.setup.hints_allowed;
    }

    pub fn problem_key(&self) -> u64 {
        self.problem_key
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// 1-based number of the question on screen.
    pub fn question_number(&self) -> usize {
        (self.results.len() + 1).min(TEST_QUESTIONS)
    }

    /// Operators the boards should draw from right now.
    pub fn active_operators(&self) -> &[Operator] {
        match (&self.phase, &self.test_config) {
            (SessionPhase::Running, Some(cfg)) => &cfg.operators,
            _ => &self.practice_operators,
        }
    }

    pub fn play_mode(&self) -> PlayMode {
        match (&self.phase, &self.test_config) {
            (SessionPhase::Running, Some(cfg)) => PlayMode::Test {
                hints_allowed: cfg.hints_allowed,
            },
            _ => PlayMode::Practice,
        }
    }

    pub fn open_setup(&mut self) {
        if self.phase == SessionPhase::Practice {
            self.phase = SessionPhase::Setup;
        }
    }

    pub fn cancel_setup(&mut self) {
        if self.phase == SessionPhase::Setup {
            self.phase = SessionPhase::Practice;
        }
    }

    pub fn start_test(&mut self) -> Option<&TestConfig> {
        if self.phase != SessionPhase::Setup || self.setup.operators.is_empty() {
            return None;
        }
        self.timers.cancel_all();
        self.results.clear();
        self.problem_key = 0;
        self.started_at = Some(Utc::now());
        self.test_config = Some(self.setup.clone());
        self.phase = SessionPhase::Running;
        tracing::info!(
            operators = ?self.setup.operators,
            hints_allowed = self.setup.hints_allowed,
            "test started"
        );
        self.test_config.as_ref()
    }

    /// Store a finalized answer and schedule the next question (or the end
    /// of the test). Answers arriving outside a running test, or while the
    /// previous answer is still being shown, are dropped.
    pub fn record(&mut self, now: Instant, answered: AnsweredProblem) -> Option<&TestResult> {
        if self.phase != SessionPhase::Running
            || !self.timers.is_empty()
            || self.results.len() >= TEST_QUESTIONS
        {
            return None;
        }
        self.results.push(TestResult::from(answered));
        let task = if self.results.len() < TEST_QUESTIONS {
            ControllerTask::NextQuestion
        } else {
            ControllerTask::Finish
        };
        self.timers.schedule(now, NEXT_QUESTION_DELAY, task);
        self.results.last()
    }

    pub fn tick(&mut self, now: Instant) -> Option<ControllerEvent> {
        let mut event = None;
        for task in self.timers.drain_due(now) {
            match task {
                ControllerTask::NextQuestion => {
                    self.problem_key += 1;
                    event = Some(ControllerEvent::NextQuestion(self.problem_key));
                }
                ControllerTask::Finish => {
                    self.phase = SessionPhase::Report;
                    let correct = self.results.iter().filter(|r| r.is_correct).count();
                    tracing::info!(correct, total = self.results.len(), "test finished");
                    event = Some(ControllerEvent::Finished);
                }
            }
        }
        event
    }

    pub fn report(&self, board: Board) -> Option<TestReport> {
        if self.phase != SessionPhase::Report || self.results.len() < TEST_QUESTIONS {
            return None;
        }
        let timestamp = self.started_at.unwrap_or_else(Utc::now);
        Some(TestReport::from_results(board, &self.results, timestamp))
    }

    pub fn close_report(&mut self) {
        if self.phase == SessionPhase::Report {
            self.reset_to_practice();
        }
    }

    /// Leave a running test without a report.
    pub fn abort_test(&mut self) {
        if self.phase == SessionPhase::Running {
            tracing::info!(answered = self.results.len(), "test aborted");
            self.reset_to_practice();
        }
    }

    fn reset_to_practice(&mut self) {
        self.timers.cancel_all();
        self.results.clear();
        self.test_config = None;
        self.started_at = None;
        self.problem_key = 0;
        self.phase = SessionPhase::Practice;
    }
}
