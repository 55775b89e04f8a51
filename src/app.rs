use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::layout::Rect;

use crate::config::Config;
use crate::engine::board::Board;
use crate::engine::operator::Operator;
use crate::session::board::{BoardSession, PlayMode};
use crate::session::controller::{ControllerEvent, SessionController, SessionPhase, TestConfig};
use crate::session::report::TestReport;
use crate::store::report_store::ReportStore;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::layout::{LayoutTier, hint_layout_for};
use crate::ui::theme::Theme;

const MAX_TYPED_DIGITS: usize = 3;
pub const SETTINGS_FIELDS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Board,
    TestSetup,
    TestReport,
    Settings,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub controller: SessionController,
    pub active: Board,
    pub cursor: u32,
    pub typed: String,
    pub viewport: Rect,
    pub report: Option<TestReport>,
    pub status_message: Option<String>,
    pub should_quit: bool,
    pub settings_selected: usize,
    line: BoardSession,
    grid: BoardSession,
    store: Option<ReportStore>,
}

impl App {
    pub fn new(config: Config, theme: &'static Theme, store: Option<ReportStore>) -> Self {
        let practice = config.practice_operators.clone();
        let setup = TestConfig {
            operators: config.test_operators.clone(),
            hints_allowed: config.test_hints_allowed,
        };
        let controller = SessionController::new(practice, setup);
        let ops = controller.practice_operators().to_vec();

        let line = BoardSession::new(
            Board::Line20,
            ops.clone(),
            PlayMode::Practice,
            SmallRng::from_entropy(),
        );
        let grid = BoardSession::new(
            Board::Grid100,
            ops,
            PlayMode::Practice,
            SmallRng::from_entropy(),
        );

        Self {
            screen: AppScreen::Menu,
            menu: Menu::new(theme),
            theme,
            active: config.board(),
            config,
            controller,
            cursor: 1,
            typed: String::new(),
            viewport: Rect::default(),
            report: None,
            status_message: None,
            should_quit: false,
            settings_selected: 0,
            line,
            grid,
            store,
        }
    }

    pub fn session(&self) -> &BoardSession {
        match self.active {
            Board::Line20 => &self.line,
            Board::Grid100 => &self.grid,
        }
    }

    pub fn session_mut(&mut self) -> &mut BoardSession {
        match self.active {
            Board::Line20 => &mut self.line,
            Board::Grid100 => &mut self.grid,
        }
    }

    pub fn tier(&self) -> LayoutTier {
        LayoutTier::from_area(self.viewport)
    }

    pub fn columns(&self) -> u16 {
        self.tier().columns(self.active)
    }

    /// Record the terminal size and re-derive how hints are drawn.
    pub fn set_viewport(&mut self, now: Instant, area: Rect) {
        if area == self.viewport {
            return;
        }
        self.viewport = area;
        self.line
            .set_hint_layout(now, hint_layout_for(area, Board::Line20));
        self.grid
            .set_hint_layout(now, hint_layout_for(area, Board::Grid100));
    }

    pub fn menu_action(&mut self, now: Instant, action: MenuAction) {
        match action {
            MenuAction::NumberLine => self.open_board(Board::Line20),
            MenuAction::Grid => self.open_board(Board::Grid100),
            MenuAction::Test => {
                self.open_board(self.active);
                self.open_test_setup();
            }
            MenuAction::Settings => self.go_to_settings(),
            MenuAction::Quit => self.quit(now),
        }
    }

    pub fn open_board(&mut self, board: Board) {
        if !self.controller.is_test_running() {
            self.active = board;
        }
        self.cursor = self.cursor.clamp(1, self.active.max());
        self.typed.clear();
        self.screen = AppScreen::Board;
    }

    /// Switch to the other board. Refused while a test runs.
    pub fn switch_board(&mut self) -> bool {
        if self.controller.phase() != SessionPhase::Practice {
            return false;
        }
        self.active = self.active.other();
        self.cursor = self.cursor.clamp(1, self.active.max());
        self.typed.clear();
        true
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let columns = self.columns() as i64;
        let max = self.active.max() as i64;
        let next = self.cursor as i64 + dx as i64 + dy as i64 * columns;
        if (1..=max).contains(&next) {
            self.cursor = next as u32;
        }
        self.typed.clear();
    }

    pub fn type_digit(&mut self, ch: char) {
        if ch.is_ascii_digit() && self.typed.len() < MAX_TYPED_DIGITS {
            self.typed.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        self.typed.pop();
    }

    /// Enter: pick the typed number if any, otherwise the cell under the cursor.
    pub fn confirm(&mut self, now: Instant) {
        let value = if self.typed.is_empty() {
            Some(self.cursor)
        } else {
            self.typed.parse::<u32>().ok()
        };
        self.typed.clear();
        match value {
            Some(v) if self.active.contains(v) => {
                self.cursor = v;
                self.select(now, v);
            }
            _ => {
                self.status_message = Some(format!("Pick a number from 1 to {}", self.active.max()));
            }
        }
    }

    pub fn select(&mut self, now: Instant, value: u32) {
        self.status_message = None;
        if let Some(answered) = self.session_mut().select(now, value) {
            if let Some(correct) = self.controller.record(now, answered).map(|r| r.is_correct) {
                tracing::debug!(
                    question = self.controller.results().len(),
                    correct,
                    "test result recorded"
                );
            }
        }
    }

    pub fn toggle_hint(&mut self, now: Instant) {
        self.session_mut().toggle_hint(now);
    }

    /// Operators can only be changed in practice.
    pub fn toggle_practice_operator(&mut self, now: Instant, op: Operator) {
        if self.controller.phase() != SessionPhase::Practice {
            return;
        }
        if !self.controller.toggle_practice_operator(op) {
            self.status_message = Some("Keep at least one operation".to_string());
            return;
        }
        let ops = self.controller.practice_operators().to_vec();
        self.line.set_operators(now, ops.clone());
        self.grid.set_operators(now, ops.clone());
        self.config.practice_operators = ops;
        self.status_message = None;
    }

    pub fn open_test_setup(&mut self) {
        self.controller.open_setup();
        if self.controller.phase() == SessionPhase::Setup {
            self.screen = AppScreen::TestSetup;
        }
    }

    pub fn cancel_test_setup(&mut self) {
        self.controller.cancel_setup();
        self.screen = AppScreen::Board;
    }

    pub fn toggle_setup_operator(&mut self, op: Operator) {
        self.controller.toggle_setup_operator(op);
    }

    pub fn toggle_setup_hints(&mut self) {
        self.controller.toggle_setup_hints();
    }

    pub fn start_test(&mut self, now: Instant) {
        let Some(cfg) = self.controller.start_test().cloned() else {
            return;
        };
        self.config.test_operators = cfg.operators.clone();
        self.config.test_hints_allowed = cfg.hints_allowed;
        let mode = self.controller.play_mode();
        let session = self.session_mut();
        session.set_operators(now, cfg.operators);
        session.set_mode(now, mode);
        self.typed.clear();
        self.status_message = None;
        self.screen = AppScreen::Board;
    }

    /// Leave a running test without a report and restore practice.
    pub fn abort_test(&mut self, now: Instant) {
        if self.controller.is_test_running() {
            self.controller.abort_test();
            self.restore_practice(now);
        }
    }

    fn restore_practice(&mut self, now: Instant) {
        let ops = self.controller.practice_operators().to_vec();
        let session = self.session_mut();
        session.set_mode(now, PlayMode::Practice);
        session.set_operators(now, ops);
        self.typed.clear();
    }

    pub fn save_report(&mut self) {
        let Some(report) = self.report.as_ref() else {
            return;
        };
        let message = match self.store.as_ref() {
            Some(store) => match store.save(report) {
                Ok(saved) => format!("Saved to {}", saved.text.display()),
                Err(err) => {
                    tracing::warn!(error = %err, "report save failed");
                    format!("Could not save the report: {err}")
                }
            },
            None => "No report folder is available".to_string(),
        };
        self.status_message = Some(message);
    }

    pub fn close_report(&mut self, now: Instant) {
        self.controller.close_report();
        self.report = None;
        self.status_message = None;
        self.restore_practice(now);
        self.screen = AppScreen::Board;
    }

    pub fn go_to_menu(&mut self, now: Instant) {
        self.abort_test(now);
        self.controller.cancel_setup();
        self.status_message = None;
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                if themes.is_empty() {
                    return;
                }
                let len = themes.len();
                let next = match themes.iter().position(|t| *t == self.config.theme) {
                    Some(idx) if forward => (idx + 1) % len,
                    Some(idx) => (idx + len - 1) % len,
                    None => 0,
                };
                self.config.theme = themes[next].clone();
                if let Some(new_theme) = Theme::load(&self.config.theme) {
                    let theme: &'static Theme = Box::leak(Box::new(new_theme));
                    self.theme = theme;
                    self.menu.theme = theme;
                }
            }
            1 => {
                let board = self.config.board().other();
                self.config.board = board.as_str().to_string();
                if self.controller.phase() == SessionPhase::Practice {
                    self.active = board;
                }
            }
            2 => {
                self.config.test_hints_allowed = !self.config.test_hints_allowed;
                if self.controller.setup().hints_allowed != self.config.test_hints_allowed {
                    self.controller.toggle_setup_hints();
                }
            }
            _ => {}
        }
    }

    pub fn save_config(&mut self) {
        if let Err(err) = self.config.save() {
            tracing::warn!(error = %err, "config save failed");
        }
    }

    pub fn quit(&mut self, now: Instant) {
        self.abort_test(now);
        self.save_config();
        self.should_quit = true;
    }

    /// Run due timers on both boards and route test events.
    pub fn tick(&mut self, now: Instant) {
        self.line.tick(now);
        self.grid.tick(now);

        match self.controller.tick(now) {
            Some(ControllerEvent::NextQuestion(key)) => {
                self.typed.clear();
                self.session_mut().set_problem_key(now, key);
            }
            Some(ControllerEvent::Finished) => {
                self.report = self.controller.report(self.active);
                self.status_message = None;
                self.screen = AppScreen::TestReport;
            }
            None => {}
        }
    }
}
