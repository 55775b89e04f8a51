use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::board::Board;
use crate::engine::evaluator::AnswerStatus;
use crate::engine::hint::HintRole;
use crate::session::board::BoardSession;
use crate::ui::theme::Theme;

/// Terminal rows per cell row.
pub const CELL_HEIGHT: u16 = 3;

pub struct BoardView<'a> {
    session: &'a BoardSession,
    columns: u16,
    cursor: u32,
    theme: &'a Theme,
}

impl<'a> BoardView<'a> {
    pub fn new(session: &'a BoardSession, columns: u16, cursor: u32, theme: &'a Theme) -> Self {
        Self {
            session,
            columns: columns.max(1),
            cursor,
            theme,
        }
    }

    fn resting_color(&self, value: u32) -> Color {
        let colors = &self.theme.colors;
        let slot = match self.session.board() {
            Board::Line20 => ((value - 1) / 5) as usize,
            Board::Grid100 => (((value - 1) / 5) % 2) as usize,
        };
        colors.cell_palette(slot)
    }

    fn cell_style(&self, value: u32) -> Style {
        let colors = &self.theme.colors;
        let base = Style::default().fg(colors.cell_fg());

        if let Some(h) = self.session.hint().highlight(value) {
            let bg = match h.role {
                HintRole::Solution => colors.hint_solution(),
                HintRole::Final => colors.hint_final(),
                HintRole::Intermediate => colors.hint_step(),
            };
            return base.bg(bg).add_modifier(Modifier::BOLD);
        }

        let status = self.session.status();
        if status != AnswerStatus::Idle && self.session.last_attempt() == Some(value) {
            let bg = if status == AnswerStatus::Correct {
                colors.success()
            } else {
                colors.error()
            };
            return base.bg(bg).add_modifier(Modifier::BOLD);
        }

        base.bg(self.resting_color(value))
    }
}

impl Widget for BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.session.board().title()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let max = self.session.board().max();
        let cell_w = inner.width / self.columns;
        if cell_w < 3 || inner.height == 0 {
            Paragraph::new("Window too small")
                .alignment(Alignment::Center)
                .style(Style::default().fg(colors.warning()))
                .render(inner, buf);
            return;
        }
        let used_w = cell_w * self.columns;
        let offset_x = inner.x + (inner.width - used_w) / 2;

        for value in 1..=max {
            let idx = (value - 1) as u16;
            let col = idx % self.columns;
            let row = idx / self.columns;
            let y = inner.y + row * CELL_HEIGHT;
            if y + CELL_HEIGHT > inner.y + inner.height {
                break;
            }
            let x = offset_x + col * cell_w;
            // Leave a one-column gutter between cells.
            let w = cell_w.saturating_sub(1).max(1);
            let style = self.cell_style(value);

            for dy in 0..CELL_HEIGHT {
                for dx in 0..w {
                    buf[(x + dx, y + dy)].set_style(style);
                }
            }

            let is_cursor = value == self.cursor && self.session.is_active();
            let text = if is_cursor {
                format!("[{value}]")
            } else {
                value.to_string()
            };
            let text_w = text.chars().count() as u16;
            let tx = x + w.saturating_sub(text_w) / 2;
            let text_style = if is_cursor {
                style
                    .fg(colors.cursor())
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                style
            };
            buf.set_stringn(tx, y + 1, &text, w as usize, text_style);

            if let Some(label) = self
                .session
                .hint()
                .highlight(value)
                .and_then(|h| h.label.as_deref())
            {
                let lx = x + w.saturating_sub(label.chars().count() as u16);
                buf.set_string(lx, y, label, style.add_modifier(Modifier::BOLD));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::engine::operator::Operator;
    use crate::session::board::PlayMode;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_renders_every_number_and_cursor() {
        let session = BoardSession::new(
            Board::Line20,
            vec![Operator::Add],
            PlayMode::Practice,
            SmallRng::seed_from_u64(1),
        );
        let theme = Theme::default();
        let area = Rect::new(0, 0, 62, 8);
        let mut buf = Buffer::empty(area);
        BoardView::new(&session, 10, 7, &theme).render(area, &mut buf);
        let text = buffer_text(&buf);
        for n in [1, 6, 10, 11, 20] {
            assert!(text.contains(&n.to_string()), "missing {n}");
        }
        assert!(text.contains("[7]"));
    }

    #[test]
    fn test_solution_cell_uses_solution_color() {
        let mut session = BoardSession::new(
            Board::Grid100,
            vec![Operator::Add],
            PlayMode::Practice,
            SmallRng::seed_from_u64(4),
        );
        let t0 = Instant::now();
        session.set_hint(t0, true);
        session.tick(t0 + Duration::from_secs(60));
        let answer = session.problem().unwrap().correct_answer();

        let theme = Theme::default();
        let view = BoardView::new(&session, 10, 1, &theme);
        assert_eq!(
            view.cell_style(answer).bg,
            Some(theme.colors.hint_solution())
        );
    }
}
