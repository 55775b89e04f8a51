use serde::{Deserialize, Serialize};

/// Non-trivial `(operand1, operand2)` products on the number line to 20.
pub const LINE20_MUL_PAIRS: &[(u32, u32)] = &[
    (2, 2), (2, 3), (2, 4), (2, 5), (2, 6), (2, 7), (2, 8), (2, 9), (2, 10),
    (3, 2), (3, 3), (3, 4), (3, 5), (3, 6),
    (4, 2), (4, 3), (4, 4), (4, 5),
    (5, 2), (5, 3), (5, 4),
    (6, 2), (6, 3),
    (7, 2), (8, 2), (9, 2), (10, 2),
];

/// Exact `(dividend, divisor)` pairs on the number line to 20.
pub const LINE20_DIV_PAIRS: &[(u32, u32)] = &[
    (4, 2), (6, 2), (8, 2), (10, 2), (12, 2), (14, 2), (16, 2), (18, 2), (20, 2),
    (6, 3), (9, 3), (12, 3), (15, 3), (18, 3),
    (8, 4), (12, 4), (16, 4), (20, 4),
    (10, 5), (15, 5), (20, 5),
    (12, 6), (18, 6),
    (14, 7), (16, 8), (18, 9), (20, 10),
];

/// Where multiplication and division operands come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactorSource {
    Table(&'static [(u32, u32)]),
    /// First factor (or divisor) in `2..=max_factor`, the other at least 2
    /// and bounded by the board maximum.
    Random { max_factor: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Board {
    Line20,
    Grid100,
}

impl Board {
    pub fn max(self) -> u32 {
        match self {
            Board::Line20 => 20,
            Board::Grid100 => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Board::Line20 => "line20",
            Board::Grid100 => "grid100",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Board::Line20 => "Number Line to 20",
            Board::Grid100 => "The 100 Grid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "line20" | "line" | "20" => Some(Board::Line20),
            "grid100" | "grid" | "100" => Some(Board::Grid100),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Board::Line20 => Board::Grid100,
            Board::Grid100 => Board::Line20,
        }
    }

    pub fn contains(self, value: u32) -> bool {
        (1..=self.max()).contains(&value)
    }

    pub fn mul_source(self) -> FactorSource {
        match self {
            Board::Line20 => FactorSource::Table(LINE20_MUL_PAIRS),
            Board::Grid100 => FactorSource::Random { max_factor: 10 },
        }
    }

    pub fn div_source(self) -> FactorSource {
        match self {
            Board::Line20 => FactorSource::Table(LINE20_DIV_PAIRS),
            Board::Grid100 => FactorSource::Random { max_factor: 10 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line20_tables_stay_on_the_board() {
        for &(a, b) in LINE20_MUL_PAIRS {
            assert!(a >= 2 && b >= 2);
            assert!(a * b <= 20, "{a}*{b} leaves the line");
        }
        for &(a, b) in LINE20_DIV_PAIRS {
            assert_eq!(a % b, 0, "{a}/{b} is not exact");
            assert!(a / b >= 2 && a <= 20);
        }
        assert_eq!(LINE20_MUL_PAIRS.len(), 27);
        assert_eq!(LINE20_DIV_PAIRS.len(), 27);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Board::from_name("Grid100"), Some(Board::Grid100));
        assert_eq!(Board::from_name("20"), Some(Board::Line20));
        assert_eq!(Board::from_name("hex"), None);
    }
}
