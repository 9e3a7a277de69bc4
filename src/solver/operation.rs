use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Binary arithmetic operation recognized in a frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BinaryKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl BinaryKind {
    pub fn symbol(&self) -> char {
        match self {
            BinaryKind::Addition => '+',
            BinaryKind::Subtraction => '-',
            BinaryKind::Multiplication => '*',
            BinaryKind::Division => '/',
        }
    }
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryKind::Addition => write!(f, "addition"),
            BinaryKind::Subtraction => write!(f, "subtraction"),
            BinaryKind::Multiplication => write!(f, "multiplication"),
            BinaryKind::Division => write!(f, "division"),
        }
    }
}

/// What the selector recognized. Absence of an operation is `Option::None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedOperation {
    /// Free-form expression over digits, `. + - * / ( )` and spaces
    Expression { text: String },
    BinaryOp {
        kind: BinaryKind,
        left: f64,
        right: f64,
    },
}

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"\d+\.?\d*").expect("valid number pattern"))
}

impl ParsedOperation {
    pub fn expression(text: &str) -> Self {
        ParsedOperation::Expression {
            text: text.to_string(),
        }
    }

    pub fn binary(kind: BinaryKind, left: f64, right: f64) -> Self {
        ParsedOperation::BinaryOp { kind, left, right }
    }

    /// Numeric literals appearing in the operation, left to right.
    pub fn numbers(&self) -> Vec<f64> {
        match self {
            ParsedOperation::Expression { text } => number_regex()
                .find_iter(text)
                .filter_map(|m| m.as_str().parse::<f64>().ok())
                .collect(),
            ParsedOperation::BinaryOp { left, right, .. } => vec![*left, *right],
        }
    }
}

impl fmt::Display for ParsedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedOperation::Expression { text } => write!(f, "{}", text),
            ParsedOperation::BinaryOp { kind, left, right } => {
                write!(f, "{} {} {}", left, kind.symbol(), right)
            }
        }
    }
}

/// Answer computed for an operation. Integral values are always `Integer`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SolveResult {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveResult::Integer(v) => write!(f, "{}", v),
            SolveResult::Float(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_numbers() {
        let op = ParsedOperation::expression("12 + 3.5*(4-1)");
        assert_eq!(op.numbers(), vec![12.0, 3.5, 4.0, 1.0]);
    }

    #[test]
    fn test_binary_numbers() {
        let op = ParsedOperation::binary(BinaryKind::Division, 12.0, 4.0);
        assert_eq!(op.numbers(), vec![12.0, 4.0]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ParsedOperation::binary(BinaryKind::Division, 12.0, 4.0).to_string(),
            "12 / 4"
        );
        assert_eq!(ParsedOperation::expression("2+2*3").to_string(), "2+2*3");
        assert_eq!(SolveResult::Integer(3).to_string(), "3");
        assert_eq!(SolveResult::Float(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_operation_serialization() {
        let op = ParsedOperation::binary(BinaryKind::Addition, 8.0, 2.0);
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"type":"binary_op","kind":"addition","left":8.0,"right":2.0}"#);
        let back: ParsedOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }
}
