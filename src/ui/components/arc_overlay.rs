use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::Widget;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};

use crate::engine::hint::{Arc, LineGeometry};
use crate::ui::theme::Theme;

const SEGMENTS: usize = 16;

/// Jump arcs drawn above the single-row number line.
pub struct ArcOverlay<'a> {
    arcs: &'a [Arc],
    geometry: LineGeometry,
    theme: &'a Theme,
}

impl<'a> ArcOverlay<'a> {
    pub fn new(arcs: &'a [Arc], geometry: LineGeometry, theme: &'a Theme) -> Self {
        Self {
            arcs,
            geometry,
            theme,
        }
    }
}

/// The part of `arcs_area` that sits directly above the board's cells, so
/// canvas x units line up with cell columns.
pub fn aligned_area(arcs_area: Rect, board_inner: Rect, geometry: &LineGeometry) -> Rect {
    let used = geometry.width() as u16;
    let offset = board_inner.width.saturating_sub(used) / 2;
    Rect::new(
        board_inner.x + offset,
        arcs_area.y,
        used.min(arcs_area.width),
        arcs_area.height,
    )
}

impl Widget for ArcOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.arcs.is_empty() || area.width == 0 || area.height == 0 {
            return;
        }
        let colors = &self.theme.colors;
        let arc_color = colors.arc();
        let label_style = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(colors.bg())
            .x_bounds([0.0, self.geometry.width()])
            .y_bounds([0.0, self.geometry.max_rise])
            .paint(|ctx| {
                for arc in self.arcs {
                    let points = arc.sample(SEGMENTS);
                    for pair in points.windows(2) {
                        ctx.draw(&CanvasLine::new(
                            pair[0].x, pair[0].y, pair[1].x, pair[1].y, arc_color,
                        ));
                    }
                }
                ctx.layer();
                for arc in self.arcs {
                    let apex = arc.apex();
                    ctx.print(
                        apex.x,
                        apex.y,
                        Span::styled(arc.label.clone(), label_style),
                    );
                }
            })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::Board;
    use crate::engine::hint::build_arcs;
    use crate::engine::operator::Operator;
    use crate::engine::problem::Problem;

    #[test]
    fn test_aligned_area_matches_cell_span() {
        let geometry = LineGeometry::fit(Board::Line20, 125, 8).unwrap();
        let area = aligned_area(Rect::new(0, 3, 127, 8), Rect::new(1, 12, 125, 3), &geometry);
        assert_eq!(area.width, 120);
        assert_eq!(area.x, 1 + 2);
        assert_eq!(area.y, 3);
    }

    #[test]
    fn test_renders_labels_for_each_arc() {
        let geometry = LineGeometry::fit(Board::Line20, 120, 8).unwrap();
        let problem = Problem::new(3, Operator::Mul, 4);
        let arcs = build_arcs(&problem, Board::Line20, &geometry);
        assert_eq!(arcs.len(), 4);

        let theme = Theme::default();
        let area = Rect::new(0, 0, 120, 8);
        let mut buf = Buffer::empty(area);
        ArcOverlay::new(&arcs, geometry, &theme).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        for label in ["1", "2", "3", "4"] {
            assert!(text.contains(label), "missing label {label}");
        }
    }
}
