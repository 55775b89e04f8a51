use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::engine::board::Board;
use crate::engine::hint::{HintLayout, LineGeometry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥110 cols: number line on one row, hints drawn as arcs
    Medium, // 60-109 cols: number line as 2 rows of 10
    Narrow, // <60 cols: number line as 4 rows of 5
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 110 {
            LayoutTier::Wide
        } else if area.width >= 60 {
            LayoutTier::Medium
        } else {
            LayoutTier::Narrow
        }
    }

    /// Cells per row for `board` in this tier.
    pub fn columns(&self, board: Board) -> u16 {
        match (board, self) {
            (Board::Grid100, _) => 10,
            (Board::Line20, LayoutTier::Wide) => 20,
            (Board::Line20, LayoutTier::Medium) => 10,
            (Board::Line20, LayoutTier::Narrow) => 5,
        }
    }

    /// The single-row number line gets arcs instead of tagged cells.
    pub fn uses_arcs(&self, board: Board) -> bool {
        board == Board::Line20 && *self == LayoutTier::Wide
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(2),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            footer: vertical[2],
            tier,
        }
    }
}

/// Split the main area into the board and the problem panel beneath it.
pub struct BoardLayout {
    pub arcs: Option<Rect>,
    pub board: Rect,
    pub panel: Rect,
}

impl BoardLayout {
    pub const ARC_ROWS: u16 = 8;
    pub const PANEL_ROWS: u16 = 7;

    pub fn new(main: Rect, tier: LayoutTier, board: Board) -> Self {
        let rows = board.max() as u16 / tier.columns(board);
        // Each cell row is 3 terminal rows tall.
        let board_height = rows * 3 + 2;
        if tier.uses_arcs(board) {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(Self::ARC_ROWS),
                    Constraint::Length(board_height),
                    Constraint::Min(Self::PANEL_ROWS),
                ])
                .split(main);
            Self {
                arcs: Some(split[0]),
                board: split[1],
                panel: split[2],
            }
        } else {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(board_height),
                    Constraint::Min(Self::PANEL_ROWS),
                ])
                .split(main);
            Self {
                arcs: None,
                board: split[0],
                panel: split[1],
            }
        }
    }
}

/// How hints are drawn for `board` on a terminal of size `area`.
pub fn hint_layout_for(area: Rect, board: Board) -> HintLayout {
    let app = AppLayout::new(area);
    if !app.tier.uses_arcs(board) {
        return HintLayout::Cells;
    }
    let layout = BoardLayout::new(app.main, app.tier, board);
    let geometry = layout.arcs.and_then(|arcs| {
        LineGeometry::fit(board, layout.board.width.saturating_sub(2), arcs.height)
    });
    HintLayout::Arcs(geometry)
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 56;
    const MIN_POPUP_HEIGHT: u16 = 18;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_by_width() {
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 140, 40)), LayoutTier::Wide);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 80, 40)), LayoutTier::Medium);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 50, 40)), LayoutTier::Narrow);
    }

    #[test]
    fn test_line20_columns_follow_tier() {
        assert_eq!(LayoutTier::Wide.columns(Board::Line20), 20);
        assert_eq!(LayoutTier::Medium.columns(Board::Line20), 10);
        assert_eq!(LayoutTier::Narrow.columns(Board::Line20), 5);
        assert_eq!(LayoutTier::Wide.columns(Board::Grid100), 10);
        assert!(LayoutTier::Wide.uses_arcs(Board::Line20));
        assert!(!LayoutTier::Wide.uses_arcs(Board::Grid100));
    }

    #[test]
    fn test_board_layout_reserves_arc_rows_when_wide() {
        let main = Rect::new(0, 3, 140, 40);
        let layout = BoardLayout::new(main, LayoutTier::Wide, Board::Line20);
        assert_eq!(layout.arcs.map(|r| r.height), Some(BoardLayout::ARC_ROWS));
        assert_eq!(layout.board.height, 5);

        let layout = BoardLayout::new(main, LayoutTier::Medium, Board::Grid100);
        assert!(layout.arcs.is_none());
        assert_eq!(layout.board.height, 32);
    }

    #[test]
    fn test_hint_layout_follows_width() {
        let wide = Rect::new(0, 0, 142, 40);
        match hint_layout_for(wide, Board::Line20) {
            HintLayout::Arcs(Some(geometry)) => {
                assert_eq!(geometry.cell_width, 7.0);
                assert_eq!(geometry.max_rise, BoardLayout::ARC_ROWS as f64);
            }
            other => panic!("expected arcs, got {other:?}"),
        }
        assert_eq!(hint_layout_for(wide, Board::Grid100), HintLayout::Cells);
        assert_eq!(
            hint_layout_for(Rect::new(0, 0, 80, 40), Board::Line20),
            HintLayout::Cells
        );
    }

    #[test]
    fn test_pack_hint_lines_wraps() {
        let lines = pack_hint_lines(&["[a] one", "[b] two", "[c] three"], 20);
        assert_eq!(lines, vec!["  [a] one  [b] two", "  [c] three"]);
    }
}
