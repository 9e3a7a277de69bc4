//! Arithmetic-only evaluator.
//!
//! Expressions are parsed by a small recursive-descent parser over numeric
//! literals, `+ - * / ( )` and spaces. Nothing else is accepted, so OCR
//! text can never reach a general-purpose interpreter.
//!
//! Grammar:
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! ```

use thiserror::Error;

use super::operation::{BinaryKind, ParsedOperation, SolveResult};

/// Nesting limit for parentheses and unary signs.
const MAX_DEPTH: usize = 64;

/// Largest magnitude reported as an `Integer`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("malformed expression: {0}")]
    Malformed(String),

    #[error("numeric overflow")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Negate(Box<Expr>),
    Binary(BinaryKind, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lexeme {
    Number(f64),
    Op(char),
    Open,
    Close,
}

fn tokenize(text: &str) -> Result<Vec<Lexeme>, EvalError> {
    let chars: Vec<char> = text.chars().collect();
    let mut lexemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' => i += 1,
            '+' | '-' | '*' | '/' => {
                lexemes.push(Lexeme::Op(c));
                i += 1;
            }
            '(' => {
                lexemes.push(Lexeme::Open);
                i += 1;
            }
            ')' => {
                lexemes.push(Lexeme::Close);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::Malformed(format!("bad number '{}'", literal)))?;
                lexemes.push(Lexeme::Number(value));
            }
            other => {
                return Err(EvalError::Malformed(format!(
                    "unexpected character '{}'",
                    other
                )));
            }
        }
    }

    Ok(lexemes)
}

struct Parser {
    lexemes: Vec<Lexeme>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Lexeme> {
        self.lexemes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Lexeme> {
        let lexeme = self.peek();
        self.pos += 1;
        lexeme
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Malformed("nesting too deep".to_string()));
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_term()?;
        while let Some(Lexeme::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.parse_term()?;
            let kind = if op == '+' {
                BinaryKind::Addition
            } else {
                BinaryKind::Subtraction
            };
            lhs = Expr::Binary(kind, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_unary()?;
        while let Some(Lexeme::Op(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.parse_unary()?;
            let kind = if op == '*' {
                BinaryKind::Multiplication
            } else {
                BinaryKind::Division
            };
            lhs = Expr::Binary(kind, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        match self.peek() {
            Some(Lexeme::Op(sign @ ('+' | '-'))) => {
                self.pos += 1;
                self.descend()?;
                let operand = self.parse_unary()?;
                self.depth -= 1;
                Ok(if sign == '-' {
                    Expr::Negate(Box::new(operand))
                } else {
                    operand
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Lexeme::Number(value)) => Ok(Expr::Number(value)),
            Some(Lexeme::Open) => {
                self.descend()?;
                let inner = self.parse_expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Lexeme::Close) => Ok(inner),
                    _ => Err(EvalError::Malformed("missing ')'".to_string())),
                }
            }
            Some(other) => Err(EvalError::Malformed(format!(
                "unexpected {:?}",
                other
            ))),
            None => Err(EvalError::Malformed("unexpected end of input".to_string())),
        }
    }
}

/// Parses `text` into an expression tree without evaluating it.
pub fn parse_expression(text: &str) -> Result<Expr, EvalError> {
    let lexemes = tokenize(text)?;
    let mut parser = Parser {
        lexemes,
        pos: 0,
        depth: 0,
    };

    let expr = parser.parse_expr()?;
    if let Some(trailing) = parser.peek() {
        return Err(EvalError::Malformed(format!(
            "unexpected trailing {:?}",
            trailing
        )));
    }
    Ok(expr)
}

fn apply(kind: BinaryKind, left: f64, right: f64) -> Result<f64, EvalError> {
    let value = match kind {
        BinaryKind::Addition => left + right,
        BinaryKind::Subtraction => left - right,
        BinaryKind::Multiplication => left * right,
        BinaryKind::Division => {
            if right == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            left / right
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::Overflow)
    }
}

impl Expr {
    pub fn eval(&self) -> Result<f64, EvalError> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Negate(inner) => Ok(-inner.eval()?),
            Expr::Binary(kind, lhs, rhs) => apply(*kind, lhs.eval()?, rhs.eval()?),
        }
    }
}

/// Rounds to 4 decimal places. Integral values are returned untouched so
/// large magnitudes never pass through the scaling step.
fn round4(value: f64) -> Result<f64, EvalError> {
    if value.fract() == 0.0 {
        return Ok(value);
    }
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded.is_finite() {
        Ok(rounded)
    } else {
        Err(EvalError::Overflow)
    }
}

/// Integral values become `Integer`; others are rounded to 4 places when asked.
fn to_result(value: f64, round: bool) -> Result<SolveResult, EvalError> {
    if !value.is_finite() {
        return Err(EvalError::Overflow);
    }
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        return Ok(SolveResult::Integer(value as i64));
    }
    let value = if round { round4(value)? } else { value };
    Ok(SolveResult::Float(value))
}

/// Evaluates an operation, reporting why it failed.
pub fn try_evaluate(op: &ParsedOperation) -> Result<SolveResult, EvalError> {
    match op {
        ParsedOperation::Expression { text } => {
            let value = parse_expression(text)?.eval()?;
            to_result(value, true)
        }
        ParsedOperation::BinaryOp { kind, left, right } => {
            let value = apply(*kind, *left, *right)?;
            to_result(value, *kind == BinaryKind::Division)
        }
    }
}

/// Evaluates an operation. Any failure yields `None`; use [`try_evaluate`]
/// for the reason.
pub fn evaluate(op: &ParsedOperation) -> Option<SolveResult> {
    try_evaluate(op).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(text: &str) -> ParsedOperation {
        ParsedOperation::expression(text)
    }

    #[test]
    fn test_division_rounding() {
        let ten_by_four = ParsedOperation::binary(BinaryKind::Division, 10.0, 4.0);
        assert_eq!(evaluate(&ten_by_four), Some(SolveResult::Float(2.5)));

        let ten_by_five = ParsedOperation::binary(BinaryKind::Division, 10.0, 5.0);
        assert_eq!(evaluate(&ten_by_five), Some(SolveResult::Integer(2)));

        let ten_by_three = ParsedOperation::binary(BinaryKind::Division, 10.0, 3.0);
        assert_eq!(evaluate(&ten_by_three), Some(SolveResult::Float(3.3333)));
    }

    #[test]
    fn test_division_by_zero() {
        let op = ParsedOperation::binary(BinaryKind::Division, 1.0, 0.0);
        assert_eq!(try_evaluate(&op), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate(&op), None);
    }

    #[test]
    fn test_other_binary_ops_not_rounded() {
        let add = ParsedOperation::binary(BinaryKind::Addition, 2.0, 3.0);
        assert_eq!(evaluate(&add), Some(SolveResult::Integer(5)));

        let sub = ParsedOperation::binary(BinaryKind::Subtraction, 2.0, 3.5);
        assert_eq!(evaluate(&sub), Some(SolveResult::Float(-1.5)));

        let mul = ParsedOperation::binary(BinaryKind::Multiplication, 1.23456, 1.0);
        assert_eq!(evaluate(&mul), Some(SolveResult::Float(1.23456)));
    }

    #[test]
    fn test_expression_precedence() {
        assert_eq!(evaluate(&expr("2+2*3")), Some(SolveResult::Integer(8)));
        assert_eq!(evaluate(&expr("(2+2)*3")), Some(SolveResult::Integer(12)));
        assert_eq!(evaluate(&expr("10 - 4 - 3")), Some(SolveResult::Integer(3)));
        assert_eq!(evaluate(&expr("12 / 4 / 3")), Some(SolveResult::Integer(1)));
    }

    #[test]
    fn test_expression_rounding() {
        assert_eq!(evaluate(&expr("7/2")), Some(SolveResult::Float(3.5)));
        assert_eq!(evaluate(&expr("2/3")), Some(SolveResult::Float(0.6667)));
        assert_eq!(evaluate(&expr("1.5*2")), Some(SolveResult::Integer(3)));
    }

    #[test]
    fn test_expression_unary_signs() {
        assert_eq!(evaluate(&expr("-3+5")), Some(SolveResult::Integer(2)));
        assert_eq!(evaluate(&expr("--3")), Some(SolveResult::Integer(3)));
        assert_eq!(evaluate(&expr("2*-(1+1)")), Some(SolveResult::Integer(-4)));
    }

    #[test]
    fn test_expression_division_by_zero_fails_safely() {
        assert_eq!(try_evaluate(&expr("2/0")), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate(&expr("2/0")), None);
        assert_eq!(evaluate(&expr("1/(3-3)")), None);
    }

    #[test]
    fn test_malformed_expressions() {
        for text in ["", "/", "2+", "(2+3", "2+3)", "1.2.3", "2 3", "2**3", "abs(2)", "__import__"] {
            assert!(
                matches!(try_evaluate(&expr(text)), Err(EvalError::Malformed(_))),
                "'{}' should be malformed",
                text
            );
        }
    }

    #[test]
    fn test_overflow() {
        let huge = format!("{}*{}", "9".repeat(200), "9".repeat(200));
        assert_eq!(try_evaluate(&expr(&huge)), Err(EvalError::Overflow));
    }

    #[test]
    fn test_huge_finite_results_are_never_infinite() {
        let literal = format!("1{}", "0".repeat(305));
        match evaluate(&expr(&literal)) {
            Some(SolveResult::Float(value)) => assert_eq!(value, 1e305),
            other => panic!("unexpected result: {:?}", other),
        }

        let halved = ParsedOperation::binary(BinaryKind::Division, 1e306, 0.5);
        assert_eq!(evaluate(&halved), Some(SolveResult::Float(2e306)));

        // Scaling by 1e4 for rounding would overflow here
        let fractional = ParsedOperation::binary(BinaryKind::Division, 1e305, 3.0);
        assert_eq!(try_evaluate(&fractional), Ok(SolveResult::Float(1e305 / 3.0)));

        let beyond = ParsedOperation::binary(BinaryKind::Division, 1e308, 0.01);
        assert_eq!(evaluate(&beyond), None);
        assert_eq!(try_evaluate(&beyond), Err(EvalError::Overflow));
    }

    #[test]
    fn test_round4_leaves_integral_values() {
        assert_eq!(round4(1e305), Ok(1e305));
        assert_eq!(round4(f64::MAX), Ok(f64::MAX));
        assert_eq!(round4(2.71828), Ok(2.7183));
        assert_eq!(round4(-1.23456), Ok(-1.2346));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert!(matches!(
            parse_expression(&deep),
            Err(EvalError::Malformed(_))
        ));
        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(parse_expression(&shallow), Ok(Expr::Number(1.0)));
    }

    #[test]
    fn test_leading_dot_number() {
        assert_eq!(evaluate(&expr(".5+1")), Some(SolveResult::Float(1.5)));
    }
}
