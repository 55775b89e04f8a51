use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing_subscriber::EnvFilter;

use numberline::app::{App, AppScreen, SETTINGS_FIELDS};
use numberline::config::Config;
use numberline::engine::board::Board;
use numberline::engine::hint::HintLayout;
use numberline::engine::operator::{ALL_OPERATORS, Operator, parse_operator_list};
use numberline::event::{AppEvent, EventHandler, TICK_RATE};
use numberline::session::controller::TEST_QUESTIONS;
use numberline::store::report_store::ReportStore;
use numberline::ui;
use numberline::ui::components::arc_overlay::{ArcOverlay, aligned_area};
use numberline::ui::components::board_view::BoardView;
use numberline::ui::components::problem_panel::ProblemPanel;
use numberline::ui::components::progress_bar::ProgressBar;
use numberline::ui::components::report_view::ReportView;
use numberline::ui::components::test_setup::TestSetup;
use numberline::ui::layout::{AppLayout, BoardLayout, pack_hint_lines};
use numberline::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "numberline",
    version,
    about = "Arithmetic practice on the number line to 20 and the 100 grid"
)]
struct Cli {
    #[arg(short, long, help = "Board to open (line20, grid100)")]
    board: Option<String>,

    #[arg(short, long, help = "Practice operations, e.g. \"+-\" or \"*/\"")]
    operators: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Open the test setup straight away")]
    test: bool,
}

fn init_logging() -> Result<()> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("numberline");
    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("numberline.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("numberline=info".parse()?))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_logging() {
        eprintln!("logging disabled: {err:#}");
    }

    let mut config = Config::load().unwrap_or_default();

    let board = match cli.board.as_deref() {
        Some(name) => match Board::from_name(name) {
            Some(board) => Some(board),
            None => bail!("unknown board '{name}' (expected line20 or grid100)"),
        },
        None => None,
    };
    if let Some(board) = board {
        config.board = board.as_str().to_string();
    }
    if let Some(ops) = cli.operators.as_deref() {
        config.practice_operators = parse_operator_list(ops)?;
    }
    if let Some(theme_name) = cli.theme {
        if Theme::load(&theme_name).is_some() {
            config.theme = theme_name;
        } else {
            tracing::warn!(theme = %theme_name, "unknown theme, keeping configured one");
        }
    }

    let theme: &'static Theme = Box::leak(Box::new(Theme::load(&config.theme).unwrap_or_default()));
    let store = match ReportStore::with_base_dir(PathBuf::from(&config.report_dir)) {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::warn!(error = %err, "report saving unavailable");
            None
        }
    };

    let mut app = App::new(config, theme, store);
    if cli.test {
        app.open_board(app.active);
        app.open_test_setup();
    } else if board.is_some() {
        app.open_board(app.active);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.set_viewport(Instant::now(), Rect::new(0, 0, size.width, size.height));

    tracing::info!(board = app.active.as_str(), "numberline started");
    let events = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "main loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key, Instant::now()),
            AppEvent::Tick(now) => app.tick(now),
            AppEvent::Resize(area) => app.set_viewport(Instant::now(), area),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit(now);
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key, now),
        AppScreen::Board => handle_board_key(app, key, now),
        AppScreen::TestSetup => handle_setup_key(app, key, now),
        AppScreen::TestReport => handle_report_key(app, key, now),
        AppScreen::Settings => handle_settings_key(app, key, now),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => app.quit(now),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let action = app.menu.selected_action();
            app.menu_action(now, action);
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.menu_action(now, action);
            }
        }
        _ => {}
    }
}

fn handle_board_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => app.go_to_menu(now),
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
        KeyCode::Enter => app.confirm(now),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Tab => {
            app.switch_board();
        }
        KeyCode::Char('?') | KeyCode::Char(' ') => app.toggle_hint(now),
        KeyCode::Char('t') => app.open_test_setup(),
        KeyCode::Char(ch) if ch.is_ascii_digit() => app.type_digit(ch),
        KeyCode::Char(ch) => {
            if let Some(op) = Operator::from_char(ch) {
                app.toggle_practice_operator(now, op);
            }
        }
        _ => {}
    }
}

fn handle_setup_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => app.cancel_test_setup(),
        KeyCode::Enter => app.start_test(now),
        KeyCode::Char('h') => app.toggle_setup_hints(),
        KeyCode::Char(ch @ '1'..='4') => {
            let idx = ch as usize - '1' as usize;
            app.toggle_setup_operator(ALL_OPERATORS[idx]);
        }
        KeyCode::Char(ch) => {
            if let Some(op) = Operator::from_char(ch) {
                app.toggle_setup_operator(op);
            }
        }
        _ => {}
    }
}

fn handle_report_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('s') => app.save_report(),
        KeyCode::Enter | KeyCode::Char('q') | KeyCode::Esc => app.close_report(now),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => {
            app.save_config();
            app.go_to_menu(now);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_FIELDS {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle(false),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Board => render_board(frame, app),
        AppScreen::TestSetup => {
            render_board(frame, app);
            let popup = ui::layout::centered_rect(50, 60, area);
            frame.render_widget(TestSetup::new(app.controller.setup(), app.theme), popup);
        }
        AppScreen::TestReport => render_report(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let mode = if app.controller.is_test_running() {
        format!(
            "Test, question {} of {TEST_QUESTIONS}",
            app.controller.question_number()
        )
    } else {
        "Practice".to_string()
    };
    let info = format!(" {} | {mode}", app.active.title());
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " numberline ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.text_muted())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let lines: Vec<Line> = match app.status_message.as_deref() {
        Some(message) => vec![Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(colors.warning()),
        ))],
        None => pack_hint_lines(hints, area.width as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_muted()))))
            .collect(),
    };
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);

    render_header(frame, app, app_layout.header);

    let menu_area = ui::layout::centered_rect(50, 80, app_layout.main);
    frame.render_widget(&app.menu, menu_area);

    render_footer(
        frame,
        app,
        app_layout.footer,
        &["[1/2] Board", "[t] Test", "[c] Settings", "[q] Quit"],
    );
}

fn render_board(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);
    let session = app.session();

    render_header(frame, app, app_layout.header);

    let mut main = app_layout.main;
    if app.controller.is_test_running() {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(main);
        let progress = ProgressBar::new(app.controller.question_number(), TEST_QUESTIONS, app.theme);
        frame.render_widget(progress, split[0]);
        main = split[1];
    }

    let layout = BoardLayout::new(main, app_layout.tier, app.active);

    frame.render_widget(
        BoardView::new(session, app.columns(), app.cursor, app.theme),
        layout.board,
    );

    if let (Some(arcs_area), HintLayout::Arcs(Some(geometry))) = (layout.arcs, session.hint_layout()) {
        let board_inner = layout.board.inner(Margin::new(1, 1));
        let overlay_area = aligned_area(arcs_area, board_inner, &geometry);
        frame.render_widget(
            ArcOverlay::new(session.hint().visible_arcs(), geometry, app.theme),
            overlay_area,
        );
    }

    frame.render_widget(
        ProblemPanel::new(session, &app.typed, app.controller.is_test_running(), app.theme),
        layout.panel,
    );

    let hints: &[&str] = if app.controller.is_test_running() {
        &["[arrows/hjkl] Move", "[0-9] Type", "[Enter] Answer", "[?] Hint", "[Esc] Quit test"]
    } else {
        &[
            "[arrows/hjkl] Move",
            "[0-9] Type",
            "[Enter] Answer",
            "[?/Space] Hint",
            "[+ - * /] Operations",
            "[Tab] Board",
            "[t] Test",
            "[Esc] Menu",
        ]
    };
    render_footer(frame, app, app_layout.footer, hints);
}

fn render_report(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(ref report) = app.report {
        let centered = ui::layout::centered_rect(60, 80, area);
        let view = ReportView::new(report, app.theme, app.status_message.as_deref());
        frame.render_widget(view, centered);
    }
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields: Vec<(&str, String)> = vec![
        ("Theme", app.config.theme.clone()),
        ("Default board", app.config.board().title().to_string()),
        (
            "Hints in tests",
            if app.config.test_hints_allowed { "allowed" } else { "off" }.to_string(),
        ),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.text_muted()),
    )));
    header.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.fg()
        } else {
            colors.text_muted()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back  [Enter/arrows] Change value",
        Style::default().fg(colors.accent()),
    )));
    footer.render(layout[3], frame.buffer_mut());
}
