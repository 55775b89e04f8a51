use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::report::TestReport;
use crate::ui::theme::Theme;

pub struct ReportView<'a> {
    pub report: &'a TestReport,
    pub theme: &'a Theme,
    pub save_status: Option<&'a str>,
}

impl<'a> ReportView<'a> {
    pub fn new(report: &'a TestReport, theme: &'a Theme, save_status: Option<&'a str>) -> Self {
        Self {
            report,
            theme,
            save_status,
        }
    }
}

impl Widget for ReportView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Test Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            format!("Results: {}", self.report.board.title()),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let score_color = if self.report.percentage >= 80 {
            colors.success()
        } else if self.report.percentage >= 50 {
            colors.warning()
        } else {
            colors.error()
        };
        let score_line = Line::from(vec![
            Span::styled("  Score: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}%", self.report.percentage),
                Style::default().fg(score_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({}/{} correct)", self.report.correct, self.report.total),
                Style::default().fg(colors.text_muted()),
            ),
        ]);
        Paragraph::new(score_line).render(layout[1], buf);

        let rows: Vec<Line> = self
            .report
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let (verdict, color) = if r.is_correct {
                    ("Correct", colors.success())
                } else {
                    ("Wrong", colors.error())
                };
                Line::from(vec![
                    Span::styled(
                        format!("  {:>2}. {:<16} your answer {:>3}  ", i + 1, r.equation(), r.user_answer),
                        Style::default().fg(colors.fg()),
                    ),
                    Span::styled(verdict, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                ])
            })
            .collect();
        Paragraph::new(rows).render(layout[2], buf);

        if let Some(status) = self.save_status {
            Paragraph::new(Span::styled(
                format!("  {status}"),
                Style::default().fg(colors.text_muted()),
            ))
            .render(layout[3], buf);
        }

        let help = Paragraph::new(Line::from(vec![
            Span::styled("  [s] Save report  ", Style::default().fg(colors.accent())),
            Span::styled("[Enter/q] Close", Style::default().fg(colors.accent())),
        ]));
        help.render(layout[4], buf);
    }
}
