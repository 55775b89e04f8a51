use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::evaluator::AnswerStatus;
use crate::engine::operator::{ALL_OPERATORS, Operator};
use crate::session::board::{BoardSession, Feedback};
use crate::ui::theme::Theme;

/// The current equation, feedback, hint switch and operator selector.
pub struct ProblemPanel<'a> {
    session: &'a BoardSession,
    typed: &'a str,
    operators_locked: bool,
    theme: &'a Theme,
}

impl<'a> ProblemPanel<'a> {
    pub fn new(session: &'a BoardSession, typed: &'a str, operators_locked: bool, theme: &'a Theme) -> Self {
        Self {
            session,
            typed,
            operators_locked,
            theme,
        }
    }

    pub fn equation_text(&self) -> String {
        match self.session.problem() {
            Some(problem) => format!("{} {}", problem.display(), self.answer_text()),
            None => "Choose at least one operation".to_string(),
        }
    }

    /// Digits being typed, else the last picked cell while it is being judged.
    fn answer_text(&self) -> String {
        if !self.typed.is_empty() {
            return self.typed.to_string();
        }
        match (self.session.status(), self.session.last_attempt()) {
            (AnswerStatus::Idle, _) | (_, None) => "?".to_string(),
            (_, Some(value)) => value.to_string(),
        }
    }

    fn equation_color(&self) -> Color {
        let colors = &self.theme.colors;
        if !self.typed.is_empty() {
            return colors.fg();
        }
        match self.session.status() {
            AnswerStatus::Correct => colors.success(),
            AnswerStatus::Incorrect => colors.error(),
            AnswerStatus::Idle => colors.fg(),
        }
    }

    /// Chips name the key that toggles them; in a test they are read-only.
    pub fn chip_label(&self, op: Operator) -> String {
        if self.operators_locked {
            format!(" {} ", op.symbol())
        } else {
            format!(" [{}] {} ", op.as_str(), op.symbol())
        }
    }
}

impl Widget for ProblemPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Problem ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();

        lines.push(Line::from(Span::styled(
            self.equation_text(),
            Style::default()
                .fg(self.equation_color())
                .add_modifier(Modifier::BOLD),
        )));

        let feedback = match self.session.feedback() {
            Some(fb) => {
                let color = match fb {
                    Feedback::Correct => colors.success(),
                    Feedback::TryAgain => colors.warning(),
                    Feedback::Wrong => colors.error(),
                };
                Span::styled(fb.text(), Style::default().fg(color).add_modifier(Modifier::BOLD))
            }
            None => Span::raw(""),
        };
        lines.push(Line::from(feedback));

        let hint_line = if self.session.hints_enabled() {
            let state = if self.session.hint_on() { "on" } else { "off" };
            let mut spans = vec![
                Span::styled("Hint: ", Style::default().fg(colors.fg())),
                Span::styled(
                    state,
                    Style::default()
                        .fg(if self.session.hint_on() {
                            colors.accent()
                        } else {
                            colors.text_muted()
                        })
                        .add_modifier(Modifier::BOLD),
                ),
            ];
            if self.session.hint().is_running() {
                spans.push(Span::styled("  (showing...)", Style::default().fg(colors.text_muted())));
            }
            Line::from(spans)
        } else {
            Line::from(Span::styled(
                "Hints are off for this test",
                Style::default().fg(colors.text_muted()),
            ))
        };
        lines.push(hint_line);

        let mut op_spans = vec![Span::styled("Operations: ", Style::default().fg(colors.fg()))];
        for op in ALL_OPERATORS {
            let on = self.session.operators().contains(&op);
            let style = if on {
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text_muted())
            };
            op_spans.push(Span::styled(self.chip_label(op), style));
            op_spans.push(Span::raw(" "));
        }
        lines.push(Line::from(op_spans));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
