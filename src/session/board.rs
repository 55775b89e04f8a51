use std::time::{Duration, Instant};

use rand::rngs::SmallRng;

use crate::engine::board::Board;
use crate::engine::evaluator::{self, AnswerStatus, AnsweredProblem};
use crate::engine::hint::{HintLayout, HintSequencer};
use crate::engine::operator::Operator;
use crate::engine::problem::{Problem, ProblemGenerator};
use crate::engine::scheduler::Scheduler;

/// Pause after a correct practice answer before the next problem.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayMode {
    Practice,
    /// Single attempt per problem.
    Test { hints_allowed: bool },
}

impl PlayMode {
    pub fn is_test(self) -> bool {
        matches!(self, PlayMode::Test { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    TryAgain,
    Wrong,
}

impl Feedback {
    pub fn text(self) -> &'static str {
        match self {
            Feedback::Correct => "Correct!",
            Feedback::TryAgain => "Try again!",
            Feedback::Wrong => "Wrong.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BoardTask {
    Advance,
}

/// Everything one board owns: its problem, answer state, hint and timers.
pub struct BoardSession {
    board: Board,
    mode: PlayMode,
    operators: Vec<Operator>,
    generator: ProblemGenerator,
    problem: Option<Problem>,
    problem_key: u64,
    status: AnswerStatus,
    last_attempt: Option<u32>,
    feedback: Option<Feedback>,
    hint_on: bool,
    hint_layout: HintLayout,
    hint: HintSequencer,
    timers: Scheduler<BoardTask>,
}

impl BoardSession {
    pub fn new(board: Board, operators: Vec<Operator>, mode: PlayMode, rng: SmallRng) -> Self {
        let mut generator = ProblemGenerator::new(board, rng);
        let problem = generator.generate(&operators);
        Self {
            board,
            mode,
            operators,
            generator,
            problem,
            problem_key: 0,
            status: AnswerStatus::Idle,
            last_attempt: None,
            feedback: None,
            hint_on: false,
            hint_layout: HintLayout::Cells,
            hint: HintSequencer::new(),
            timers: Scheduler::new(),
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn problem_key(&self) -> u64 {
        self.problem_key
    }

    pub fn status(&self) -> AnswerStatus {
        self.status
    }

    pub fn last_attempt(&self) -> Option<u32> {
        self.last_attempt
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn hint_on(&self) -> bool {
        self.hint_on
    }

    pub fn hint(&self) -> &HintSequencer {
        &self.hint
    }

    pub fn hint_layout(&self) -> HintLayout {
        self.hint_layout
    }

    /// Whether the hint switch is offered at all.
    pub fn hints_enabled(&self) -> bool {
        match self.mode {
            PlayMode::Practice => true,
            PlayMode::Test { hints_allowed } => hints_allowed,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.operators.is_empty()
    }

    pub fn advance_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Selections are ignored while a hint plays, after a correct answer,
    /// and after the single test attempt.
    pub fn is_locked(&self) -> bool {
        self.hint.is_running()
            || self.status == AnswerStatus::Correct
            || (self.mode.is_test() && self.status != AnswerStatus::Idle)
    }

    pub fn set_operators(&mut self, now: Instant, operators: Vec<Operator>) {
        if operators == self.operators {
            return;
        }
        self.operators = operators;
        self.new_problem(now);
    }

    pub fn set_mode(&mut self, now: Instant, mode: PlayMode) {
        self.mode = mode;
        if !self.hints_enabled() {
            self.hint_on = false;
        }
        self.problem_key = 0;
        self.new_problem(now);
    }

    /// The caller bumps the key to force a fresh problem.
    pub fn set_problem_key(&mut self, now: Instant, key: u64) {
        if key != self.problem_key {
            self.problem_key = key;
            self.new_problem(now);
        }
    }

    pub fn new_problem(&mut self, now: Instant) {
        self.timers.cancel_all();
        self.hint.cancel();
        self.status = AnswerStatus::Idle;
        self.last_attempt = None;
        self.feedback = None;
        self.problem = self.generator.generate(&self.operators);
        self.restart_hint(now);
    }

    pub fn set_hint_layout(&mut self, now: Instant, layout: HintLayout) {
        if layout == self.hint_layout {
            return;
        }
        self.hint_layout = layout;
        self.hint.cancel();
        self.restart_hint(now);
    }

    pub fn toggle_hint(&mut self, now: Instant) {
        let on = !self.hint_on;
        self.set_hint(now, on);
    }

    pub fn set_hint(&mut self, now: Instant, on: bool) {
        if !self.hints_enabled() || on == self.hint_on {
            return;
        }
        self.hint_on = on;
        if on {
            self.restart_hint(now);
        } else {
            self.hint.cancel();
        }
    }

    fn restart_hint(&mut self, now: Instant) {
        if !self.hint_on || !self.hints_enabled() {
            return;
        }
        if let Some(problem) = self.problem {
            self.hint.start(now, &problem, self.board, self.hint_layout);
        }
    }

    /// Handle a cell pick. In test mode the finalized answer is returned for
    /// the session controller.
    pub fn select(&mut self, now: Instant, value: u32) -> Option<AnsweredProblem> {
        if self.is_locked() || !self.board.contains(value) {
            return None;
        }
        let problem = self.problem?;
        let attempt = evaluator::evaluate(&problem, value);
        self.last_attempt = Some(value);
        self.status = attempt.status();

        if self.mode.is_test() {
            self.feedback = Some(if attempt.is_correct {
                Feedback::Correct
            } else {
                Feedback::Wrong
            });
            tracing::debug!(value, correct = attempt.is_correct, "test answer recorded");
            return Some(AnsweredProblem::from(&attempt));
        }

        if attempt.is_correct {
            self.feedback = Some(Feedback::Correct);
            self.timers.schedule(now, ADVANCE_DELAY, BoardTask::Advance);
        } else {
            self.feedback = Some(Feedback::TryAgain);
        }
        None
    }

    /// Run due timers. Returns true when the board changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.hint.tick(now);
        for task in self.timers.drain_due(now) {
            match task {
                BoardTask::Advance => {
                    self.new_problem(now);
                    changed = true;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::hint::HintRole;
    use rand::SeedableRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn session(board: Board, ops: &[Operator], mode: PlayMode) -> BoardSession {
        BoardSession::new(board, ops.to_vec(), mode, SmallRng::seed_from_u64(17))
    }

    fn answer(s: &BoardSession) -> u32 {
        s.problem().unwrap().correct_answer()
    }

    fn wrong(s: &BoardSession) -> u32 {
        let a = answer(s);
        if a == 1 { 2 } else { a - 1 }
    }

    #[test]
    fn test_practice_retry_then_advance() {
        let t0 = Instant::now();
        let mut s = session(Board::Line20, &[Operator::Add], PlayMode::Practice);
        let first = *s.problem().unwrap();

        assert!(s.select(t0, wrong(&s)).is_none());
        assert_eq!(s.status(), AnswerStatus::Incorrect);
        assert_eq!(s.feedback(), Some(Feedback::TryAgain));
        assert!(!s.is_locked());

        let right = answer(&s);
        assert!(s.select(t0, right).is_none());
        assert_eq!(s.status(), AnswerStatus::Correct);
        assert_eq!(s.last_attempt(), Some(right));
        assert!(s.is_locked());

        // Further picks are ignored until the board advances.
        s.select(t0, wrong(&s));
        assert_eq!(s.last_attempt(), Some(right));

        s.tick(t0 + ms(1499));
        assert_eq!(s.problem(), Some(&first));
        assert!(s.tick(t0 + ms(1500)));
        assert_ne!(s.problem(), Some(&first));
        assert_eq!(s.status(), AnswerStatus::Idle);
        assert_eq!(s.last_attempt(), None);
    }

    #[test]
    fn test_test_mode_single_attempt() {
        let t0 = Instant::now();
        let mut s = session(
            Board::Grid100,
            &[Operator::Mul],
            PlayMode::Test { hints_allowed: false },
        );
        let answered = s.select(t0, wrong(&s)).expect("finalized");
        assert_ne!(answered.user_answer, answered.correct_answer);
        assert_eq!(s.feedback(), Some(Feedback::Wrong));

        // No retry, no second record, no auto advance.
        assert!(s.select(t0, answer(&s)).is_none());
        assert!(!s.advance_pending());
        s.tick(t0 + ms(5000));
        assert_eq!(s.status(), AnswerStatus::Incorrect);
    }

    #[test]
    fn test_problem_key_regenerates() {
        let t0 = Instant::now();
        let mut s = session(Board::Line20, &[Operator::Sub], PlayMode::Test { hints_allowed: true });
        s.select(t0, wrong(&s));
        let before = *s.problem().unwrap();
        s.set_problem_key(t0, 1);
        assert_ne!(s.problem(), Some(&before));
        assert_eq!(s.status(), AnswerStatus::Idle);
        assert!(!s.is_locked());

        let same = *s.problem().unwrap();
        s.set_problem_key(t0, 1);
        assert_eq!(s.problem(), Some(&same));
    }

    #[test]
    fn test_hint_blocks_selection_until_done() {
        let t0 = Instant::now();
        let mut s = session(Board::Line20, &[Operator::Add], PlayMode::Practice);
        s.toggle_hint(t0);
        assert!(s.hint().is_running());
        let right = answer(&s);
        assert!(s.select(t0, right).is_none());
        assert_eq!(s.status(), AnswerStatus::Idle);

        s.tick(t0 + ms(20 * 400 + 50));
        assert!(!s.hint().is_running());
        assert_eq!(s.hint().highlight(right).unwrap().role, HintRole::Solution);
        s.select(t0 + ms(9000), right);
        assert_eq!(s.status(), AnswerStatus::Correct);
    }

    #[test]
    fn test_hint_toggle_off_cancels() {
        let t0 = Instant::now();
        let mut s = session(Board::Grid100, &[Operator::Add], PlayMode::Practice);
        s.set_hint(t0, true);
        s.tick(t0 + ms(400));
        assert!(!s.hint().highlights().is_empty());
        s.set_hint(t0 + ms(450), false);
        assert!(s.hint().highlights().is_empty());
        assert_eq!(s.hint().pending_timers(), 0);
        s.tick(t0 + ms(100_000));
        assert!(s.hint().highlights().is_empty());
    }

    #[test]
    fn test_problem_change_drops_stale_hint() {
        let t0 = Instant::now();
        let mut s = session(Board::Line20, &[Operator::Add, Operator::Mul], PlayMode::Practice);
        s.set_hint(t0, true);
        s.tick(t0 + ms(400));

        s.new_problem(t0 + ms(500));
        // Hint is still on, so a fresh sequence for the new problem starts
        // from an empty board.
        assert!(s.hint().highlights().is_empty());
        let expected = crate::engine::hint::HintPlan::for_problem(s.problem().unwrap(), Board::Line20);
        s.tick(t0 + ms(500) + ms(400));
        let shown: Vec<u32> = s.hint().highlights().keys().copied().collect();
        assert_eq!(shown, vec![expected.steps[0].target]);
    }

    #[test]
    fn test_operator_change_cancels_pending_work() {
        let t0 = Instant::now();
        let mut s = session(Board::Grid100, &[Operator::Add], PlayMode::Practice);
        s.select(t0, answer(&s));
        assert!(s.advance_pending());

        s.set_hint(t0 + ms(10), true);
        s.tick(t0 + ms(410));
        assert_eq!(s.hint().highlights().len(), 1);
        assert!(s.hint().is_running());

        s.set_operators(t0 + ms(500), vec![Operator::Mul]);
        assert!(!s.advance_pending());
        assert!(s.hint().highlights().is_empty());
        assert_eq!(s.status(), AnswerStatus::Idle);
        assert_eq!(s.feedback(), None);

        let fresh = *s.problem().unwrap();
        assert_eq!(fresh.operator, Operator::Mul);
        // Only the new sequence's reveals, solution and completion remain.
        let plan = crate::engine::hint::HintPlan::for_problem(&fresh, Board::Grid100);
        assert_eq!(s.hint().pending_timers(), plan.steps.len() + 2);

        s.tick(t0 + ms(120_000));
        let mut expected: std::collections::BTreeSet<u32> =
            plan.steps.iter().map(|step| step.target).collect();
        expected.extend(plan.solution);
        let shown: std::collections::BTreeSet<u32> =
            s.hint().highlights().keys().copied().collect();
        assert_eq!(shown, expected);
        assert_eq!(*s.problem().unwrap(), fresh);
    }

    #[test]
    fn test_hints_disabled_in_test_without_permission() {
        let t0 = Instant::now();
        let mut s = session(Board::Line20, &[Operator::Add], PlayMode::Test { hints_allowed: false });
        s.toggle_hint(t0);
        assert!(!s.hint_on());
        assert!(!s.hint().is_running());
    }

    #[test]
    fn test_empty_operators_leave_board_inactive() {
        let t0 = Instant::now();
        let mut s = session(Board::Line20, &[Operator::Add], PlayMode::Practice);
        s.set_operators(t0, Vec::new());
        assert!(!s.is_active());
        assert!(s.problem().is_none());
        assert!(s.select(t0, 5).is_none());
    }

    #[test]
    fn test_out_of_range_pick_ignored() {
        let t0 = Instant::now();
        let mut s = session(Board::Line20, &[Operator::Add], PlayMode::Practice);
        s.select(t0, 21);
        s.select(t0, 0);
        assert_eq!(s.last_attempt(), None);
    }
}
