use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

pub const ALL_OPERATORS: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseOperatorError {
    #[error("unknown operator '{0}' (expected one of + - * /)")]
    Unknown(String),
    #[error("empty operator list")]
    Empty,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }

    /// Symbol shown to the child.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "\u{00d7}",
            Operator::Div => "\u{00f7}",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "addition",
            Operator::Sub => "subtraction",
            Operator::Mul => "multiplication",
            Operator::Div => "division",
        }
    }

    /// Apply the operator. Subtraction saturates at 0 and division by zero
    /// yields 0; neither case can come out of the generator.
    pub fn apply(self, lhs: u32, rhs: u32) -> u32 {
        match self {
            Operator::Add => lhs.saturating_add(rhs),
            Operator::Sub => lhs.saturating_sub(rhs),
            Operator::Mul => lhs.saturating_mul(rhs),
            Operator::Div => lhs.checked_div(rhs).unwrap_or(0),
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' | 'x' | '\u{00d7}' => Some(Operator::Mul),
            '/' | ':' | '\u{00f7}' => Some(Operator::Div),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => {
                Operator::from_char(ch).ok_or_else(|| ParseOperatorError::Unknown(s.to_string()))
            }
            _ => Err(ParseOperatorError::Unknown(s.to_string())),
        }
    }
}

/// Parse a compact operator list such as `"+-"` or `"+,*,/"`.
/// Duplicates collapse; the result keeps canonical order.
pub fn parse_operator_list(s: &str) -> Result<Vec<Operator>, ParseOperatorError> {
    let mut ops = Vec::new();
    for ch in s.chars().filter(|ch| !ch.is_whitespace() && *ch != ',') {
        let op = Operator::from_char(ch).ok_or_else(|| ParseOperatorError::Unknown(ch.to_string()))?;
        if !ops.contains(&op) {
            ops.push(op);
        }
    }
    if ops.is_empty() {
        return Err(ParseOperatorError::Empty);
    }
    ops.sort();
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_basic() {
        assert_eq!(Operator::Add.apply(7, 3), 10);
        assert_eq!(Operator::Sub.apply(7, 3), 4);
        assert_eq!(Operator::Mul.apply(7, 3), 21);
        assert_eq!(Operator::Div.apply(20, 5), 4);
    }

    #[test]
    fn test_names_follow_operator() {
        assert_eq!(Operator::Add.name(), "addition");
        assert_eq!(Operator::Div.name(), "division");
        assert_eq!(Operator::from_char('*').map(Operator::name), Some("multiplication"));
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert_eq!(Operator::Div.apply(12, 0), 0);
    }

    #[test]
    fn test_subtraction_never_wraps() {
        assert_eq!(Operator::Sub.apply(3, 7), 0);
    }

    #[test]
    fn test_parse_operator_list() {
        assert_eq!(
            parse_operator_list("/+,+").unwrap(),
            vec![Operator::Add, Operator::Div]
        );
        assert_eq!(parse_operator_list(""), Err(ParseOperatorError::Empty));
        assert!(matches!(
            parse_operator_list("+%"),
            Err(ParseOperatorError::Unknown(s)) if s == "%"
        ));
    }

    #[test]
    fn test_serde_uses_symbols() {
        let json = serde_json::to_string(&vec![Operator::Mul, Operator::Div]).unwrap();
        assert_eq!(json, r#"["*","/"]"#);
        let ops: Vec<Operator> = serde_json::from_str(r#"["+","-"]"#).unwrap();
        assert_eq!(ops, vec![Operator::Add, Operator::Sub]);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(" x ".parse::<Operator>(), Ok(Operator::Mul));
        assert!("++".parse::<Operator>().is_err());
    }
}
