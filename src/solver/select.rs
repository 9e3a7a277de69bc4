use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::evaluate::parse_expression;
use super::operation::{BinaryKind, ParsedOperation};
use super::token::NormalizedToken;

/// Any operator glyph, before or after glyph normalization.
const OPERATOR_PATTERN: &str = r"[+\-×x*/÷]";

/// `<number> <op> <number>` for the division-mode override: any operator counts.
const DIVISION_MODE_PATTERN: &str = r"(\d+\.?\d*)\s*[/+*\-]\s*(\d+\.?\d*)";

/// A whole candidate that is a single binary operation.
const BINARY_SHAPE_PATTERN: &str = r"^\s*(\d+\.?\d*)\s*([/+*\-])\s*(\d+\.?\d*)\s*$";

/// Fallback patterns, tried in this order.
const BINARY_PATTERNS: [(&str, BinaryKind); 4] = [
    (r"(\d+\.?\d*)\s*[/÷:]\s*(\d+\.?\d*)", BinaryKind::Division),
    (r"(\d+\.?\d*)\s*\+\s*(\d+\.?\d*)", BinaryKind::Addition),
    (r"(\d+\.?\d*)\s*[*×x]\s*(\d+\.?\d*)", BinaryKind::Multiplication),
    (r"(\d+\.?\d*)\s*[\-−]\s*(\d+\.?\d*)", BinaryKind::Subtraction),
];

struct Patterns {
    operator: Regex,
    division_mode: Regex,
    binary_shape: Regex,
    binary: Vec<(Regex, BinaryKind)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        operator: Regex::new(OPERATOR_PATTERN).expect("valid operator pattern"),
        division_mode: Regex::new(DIVISION_MODE_PATTERN).expect("valid division pattern"),
        binary_shape: Regex::new(BINARY_SHAPE_PATTERN).expect("valid binary shape pattern"),
        binary: BINARY_PATTERNS
            .iter()
            .map(|(pattern, kind)| (Regex::new(pattern).expect("valid binary pattern"), *kind))
            .collect(),
    })
}

/// Outcome of expression selection for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub operation: Option<ParsedOperation>,
    /// Space-joined texts of the filtered tokens, in order
    pub combined_text: String,
    /// Which strategy was used and why candidates were rejected
    pub notes: Vec<String>,
}

/// Maps operator glyphs onto their ASCII forms.
pub fn normalize_glyphs(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '×' | 'x' => '*',
            '−' | '–' => '-',
            '÷' | ':' => '/',
            other => other,
        })
        .collect()
}

/// True if `text` contains any operator glyph.
pub fn contains_operator(text: &str) -> bool {
    patterns().operator.is_match(text)
}

/// Picks one operation out of filtered, ordered tokens.
pub fn select(tokens: &[NormalizedToken], division_mode: bool) -> Selection {
    select_with(tokens, division_mode, None)
}

/// Like [`select`], but when `high_confidence_min` is set the combined-text
/// fallback only uses tokens above that confidence (if there are any).
///
/// Strategies, first success wins:
/// 1. division mode: the first `<n> <op> <n>` in the combined text is a division
/// 2. the longest token holding an operator and a digit is the candidate,
///    otherwise the combined text is
/// 3. the candidate, reduced to expression characters, as a binary op or expression
/// 4. the first operator pattern found in the candidate
pub fn select_with(
    tokens: &[NormalizedToken],
    division_mode: bool,
    high_confidence_min: Option<i32>,
) -> Selection {
    let combined_text = tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let mut notes = Vec::new();

    if tokens.is_empty() {
        return Selection {
            operation: None,
            combined_text,
            notes,
        };
    }

    if division_mode {
        if let Some(operation) = division_override(&normalize_glyphs(&combined_text)) {
            notes.push(format!("Division mode: reading '{}' as {}", combined_text, operation));
            return Selection {
                operation: Some(operation),
                combined_text,
                notes,
            };
        }
    }

    let candidate = match main_expression(tokens) {
        Some(token) => {
            notes.push(format!(
                "Using main expression: '{}' (confidence: {})",
                token.text, token.confidence
            ));
            token.text.clone()
        }
        None => {
            let text = fallback_text(tokens, high_confidence_min);
            notes.push(format!("Using combined text: '{}'", text));
            text
        }
    };

    let normalized = normalize_glyphs(&candidate);
    let operation = assemble_expression(&normalized, &mut notes)
        .or_else(|| match_binary(&normalized, &mut notes));

    if operation.is_none() {
        notes.push(format!("No operation recognized in '{}'", combined_text));
    }

    Selection {
        operation,
        combined_text,
        notes,
    }
}

fn capture_numbers(caps: &Captures, left: usize, right: usize) -> Option<(f64, f64)> {
    let left = caps.get(left)?.as_str().parse::<f64>().ok()?;
    let right = caps.get(right)?.as_str().parse::<f64>().ok()?;
    Some((left, right))
}

fn division_override(text: &str) -> Option<ParsedOperation> {
    let caps = patterns().division_mode.captures(text)?;
    let (left, right) = capture_numbers(&caps, 1, 2)?;
    Some(ParsedOperation::binary(BinaryKind::Division, left, right))
}

/// Longest token with an operator and at least one digit; earliest wins ties.
fn main_expression(tokens: &[NormalizedToken]) -> Option<&NormalizedToken> {
    let mut best: Option<&NormalizedToken> = None;
    for token in tokens {
        if !contains_operator(&token.text) || !token.text.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }
        let longer = best.is_none_or(|b| token.text.chars().count() > b.text.chars().count());
        if longer {
            best = Some(token);
        }
    }
    best
}

fn fallback_text(tokens: &[NormalizedToken], high_confidence_min: Option<i32>) -> String {
    if let Some(min) = high_confidence_min {
        let confident: Vec<&str> = tokens
            .iter()
            .filter(|t| t.confidence > min)
            .map(|t| t.text.as_str())
            .collect();
        if !confident.is_empty() {
            return confident.join(" ");
        }
    }

    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn kind_from_symbol(symbol: &str) -> Option<BinaryKind> {
    match symbol {
        "+" => Some(BinaryKind::Addition),
        "-" => Some(BinaryKind::Subtraction),
        "*" => Some(BinaryKind::Multiplication),
        "/" => Some(BinaryKind::Division),
        _ => None,
    }
}

/// Keeps only expression characters. A lone `<n> <op> <n>` becomes a binary
/// op; anything else must parse as an arithmetic expression.
fn assemble_expression(text: &str, notes: &mut Vec<String>) -> Option<ParsedOperation> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || ".+-*/() ".contains(*c))
        .collect();
    let expression = kept.trim();
    if expression.is_empty() {
        return None;
    }

    if let Some(caps) = patterns().binary_shape.captures(expression) {
        let kind = kind_from_symbol(caps.get(2)?.as_str())?;
        let (left, right) = capture_numbers(&caps, 1, 3)?;
        return Some(ParsedOperation::binary(kind, left, right));
    }

    match parse_expression(expression) {
        Ok(_) => Some(ParsedOperation::expression(expression)),
        Err(e) => {
            notes.push(format!("Expression '{}' rejected: {}", expression, e));
            None
        }
    }
}

fn match_binary(text: &str, notes: &mut Vec<String>) -> Option<ParsedOperation> {
    patterns().binary.iter().find_map(|(regex, kind)| {
        let caps = regex.captures(text)?;
        let (left, right) = capture_numbers(&caps, 1, 2)?;
        notes.push(format!("Matched {} in '{}'", kind, text));
        Some(ParsedOperation::binary(*kind, left, right))
    })
}
