use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Test progress: "Question n of total" over a filled bar.
pub struct ProgressBar<'a> {
    pub question: usize,
    pub total: usize,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(question: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            question: question.min(total),
            total,
            theme,
        }
    }

    /// Share of the bar that is filled; questions already answered count.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.question.saturating_sub(1) as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    pub fn label(&self) -> String {
        format!("Question {} of {}", self.question, self.total)
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Test ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        let label = self.label();

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_and_ratio() {
        let theme = Theme::default();
        let bar = ProgressBar::new(3, 10, &theme);
        assert_eq!(bar.label(), "Question 3 of 10");
        assert!((bar.ratio() - 0.2).abs() < 1e-9);
        assert_eq!(ProgressBar::new(1, 10, &theme).ratio(), 0.0);
        assert_eq!(ProgressBar::new(12, 10, &theme).label(), "Question 10 of 10");
    }
}
