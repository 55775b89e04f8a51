use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use numberline::engine::board::Board;
use numberline::engine::hint::{HintLayout, HintRole, LineGeometry};
use numberline::engine::operator::Operator;
use numberline::session::board::{BoardSession, Feedback, PlayMode};
use numberline::session::controller::{
    ControllerEvent, NEXT_QUESTION_DELAY, SessionController, SessionPhase, TEST_QUESTIONS,
    TestConfig,
};
use numberline::store::report_store::ReportStore;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn correct(board: &BoardSession) -> u32 {
    board.problem().expect("problem").correct_answer()
}

fn wrong(board: &BoardSession) -> u32 {
    let a = correct(board);
    if a == 1 { 2 } else { a - 1 }
}

/// Drive a whole test the way the app does: board answers feed the
/// controller, controller ticks move the board to the next question.
#[test]
fn test_full_test_produces_saved_report() {
    let mut now = Instant::now();
    let mut controller = SessionController::new(
        vec![Operator::Add],
        TestConfig {
            operators: vec![Operator::Add, Operator::Sub, Operator::Mul, Operator::Div],
            hints_allowed: false,
        },
    );
    let mut board = BoardSession::new(
        Board::Grid100,
        controller.practice_operators().to_vec(),
        PlayMode::Practice,
        SmallRng::seed_from_u64(2024),
    );

    controller.open_setup();
    let cfg = controller.start_test().cloned().expect("test starts");
    board.set_operators(now, cfg.operators);
    board.set_mode(now, controller.play_mode());
    assert!(!board.hints_enabled());

    let mut finished = false;
    for i in 0..TEST_QUESTIONS {
        let pick = if i % 2 == 0 { correct(&board) } else { wrong(&board) };
        let answered = board.select(now, pick).expect("one record per question");
        assert!(board.select(now, correct(&board)).is_none());
        assert!(controller.record(now, answered).is_some());

        now += NEXT_QUESTION_DELAY;
        match controller.tick(now) {
            Some(ControllerEvent::NextQuestion(key)) => board.set_problem_key(now, key),
            Some(ControllerEvent::Finished) => finished = true,
            None => panic!("controller should have advanced"),
        }
    }

    assert!(finished);
    assert_eq!(controller.phase(), SessionPhase::Report);
    let report = controller.report(Board::Grid100).expect("report");
    assert_eq!(report.total, 10);
    assert_eq!(report.correct, 5);
    assert_eq!(report.percentage, 50);

    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let saved = store.save(&report).unwrap();
    assert!(saved.json.exists());
    assert!(saved.text.exists());
    assert_eq!(store.load_all().unwrap(), vec![report]);

    controller.close_report();
    assert_eq!(controller.phase(), SessionPhase::Practice);
    assert_eq!(controller.active_operators(), &[Operator::Add]);
}

#[test]
fn test_practice_hint_then_answer_then_advance() {
    let t0 = Instant::now();
    let mut board = BoardSession::new(
        Board::Line20,
        vec![Operator::Sub],
        PlayMode::Practice,
        SmallRng::seed_from_u64(7),
    );
    let problem = *board.problem().unwrap();

    board.set_hint(t0, true);
    assert!(board.hint().is_running());
    assert!(board.is_locked());
    assert!(board.select(t0, correct(&board)).is_none());
    assert_eq!(board.feedback(), None);

    board.tick(t0 + ms(60_000));
    assert!(!board.hint().is_running());
    let solution = board.hint().highlight(problem.correct_answer()).unwrap();
    assert_eq!(solution.role, HintRole::Solution);

    board.select(t0 + ms(60_000), wrong(&board));
    assert_eq!(board.feedback(), Some(Feedback::TryAgain));
    board.select(t0 + ms(60_100), correct(&board));
    assert_eq!(board.feedback(), Some(Feedback::Correct));

    board.tick(t0 + ms(61_700));
    assert_ne!(*board.problem().unwrap(), problem);
    assert_eq!(board.feedback(), None);
    // The hint stays on and replays for the new problem.
    assert!(board.hint().is_running());
}

#[test]
fn test_arc_hint_on_wide_number_line() {
    let t0 = Instant::now();
    let mut board = BoardSession::new(
        Board::Line20,
        vec![Operator::Mul],
        PlayMode::Practice,
        SmallRng::seed_from_u64(11),
    );
    let geometry = LineGeometry::fit(Board::Line20, 140, 8);
    board.set_hint_layout(t0, HintLayout::Arcs(geometry));
    board.set_hint(t0, true);
    assert!(board.hint().is_running());

    board.tick(t0 + ms(60_000));
    let problem = board.problem().unwrap();
    assert_eq!(board.hint().visible_arcs().len() as u32, problem.operand2);
    assert!(!board.hint().is_running());
}

#[test]
fn test_arc_hint_without_geometry_shows_nothing() {
    let t0 = Instant::now();
    let mut board = BoardSession::new(
        Board::Line20,
        vec![Operator::Add],
        PlayMode::Practice,
        SmallRng::seed_from_u64(11),
    );
    board.set_hint_layout(t0, HintLayout::Arcs(None));
    board.set_hint(t0, true);
    assert!(!board.hint().is_running());
    assert!(board.hint().highlights().is_empty());
    assert_eq!(board.hint().pending_timers(), 0);
}
