use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::engine::operator::ALL_OPERATORS;
use crate::session::controller::{TEST_QUESTIONS, TestConfig};
use crate::ui::theme::Theme;

/// Modal for choosing a test's operations and whether hints are allowed.
pub struct TestSetup<'a> {
    config: &'a TestConfig,
    theme: &'a Theme,
}

impl<'a> TestSetup<'a> {
    pub fn new(config: &'a TestConfig, theme: &'a Theme) -> Self {
        Self { config, theme }
    }
}

impl Widget for TestSetup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Clear.render(area, buf);

        let block = Block::bordered()
            .title(" Set Up a Test ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let heading = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{TEST_QUESTIONS} questions. Each question gets one answer."),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
            Line::from(Span::styled("Operations", heading)),
        ];

        for (i, op) in ALL_OPERATORS.iter().enumerate() {
            let on = self.config.operators.contains(op);
            let mark = if on { "[x]" } else { "[ ]" };
            let style = if on {
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text_muted())
            };
            lines.push(Line::from(Span::styled(
                format!("  {}  {mark} {} {}", i + 1, op.symbol(), op.name()),
                style,
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Hints", heading)));
        let hint_mark = if self.config.hints_allowed { "[x]" } else { "[ ]" };
        lines.push(Line::from(Span::styled(
            format!("  h  {hint_mark} allow the hint during the test"),
            Style::default().fg(colors.fg()),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[Enter] Start  [Esc] Cancel",
            Style::default().fg(colors.accent()),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
