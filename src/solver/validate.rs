use super::select::contains_operator;

/// Words that only show up on menus and HUDs, never in a problem.
const NON_EQUATION_WORDS: &[&str] = &[
    "challenge", "level", "score", "time", "menu", "start", "pause", "resume", "home", "settings",
];

/// Characters counted as "math" when measuring how equation-like a text is.
const MATH_SYMBOLS: &str = "+-*/=().";

/// Default minimum share of math characters.
pub const DEFAULT_MIN_MATH_RATIO: f64 = 0.6;

/// Heuristic gate run on the combined text before evaluating anything.
pub fn is_plausible_equation(raw_text: &str) -> bool {
    is_plausible_equation_with(raw_text, DEFAULT_MIN_MATH_RATIO)
}

/// [`is_plausible_equation`] with a configurable math-character ratio.
pub fn is_plausible_equation_with(raw_text: &str, min_math_ratio: f64) -> bool {
    let math_chars = raw_text
        .chars()
        .filter(|c| c.is_ascii_digit() || MATH_SYMBOLS.contains(*c))
        .count();
    let total_chars = raw_text.chars().filter(|c| *c != ' ').count();
    if total_chars > 0 {
        let math_ratio = math_chars as f64 / total_chars as f64;
        if math_ratio < min_math_ratio {
            return false;
        }
    }

    if contains_non_equation_text(raw_text) {
        return false;
    }

    contains_operator(raw_text)
}

fn contains_non_equation_text(raw_text: &str) -> bool {
    let lower = raw_text.to_lowercase();
    NON_EQUATION_WORDS.iter().any(|word| lower.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_text_rejected() {
        assert!(!is_plausible_equation("Level 3 Score 100"));
    }

    #[test]
    fn test_only_decimal_digits_count_as_math() {
        assert!(!is_plausible_equation("½+½"));
        assert!(!is_plausible_equation("Ⅻ+Ⅻ"));
        assert!(!is_plausible_equation("٣+٣"));
        assert!(is_plausible_equation("3+3"));
    }

    #[test]
    fn test_division_glyph_accepted() {
        assert!(is_plausible_equation("12 ÷ 4"));
        assert!(is_plausible_equation("12 / 4"));
    }

    #[test]
    fn test_low_math_ratio_rejected() {
        // 2 math chars out of 6
        assert!(!is_plausible_equation("ab+1cd"));
    }

    #[test]
    fn test_denylist_is_case_insensitive_substring() {
        assert!(!is_plausible_equation("TIME 1+2+3+4+5+6+7+8"));
        assert!(!is_plausible_equation("home1+1+1+1+1+1+1+1"));
    }

    #[test]
    fn test_operator_required() {
        assert!(!is_plausible_equation("1234"));
        assert!(!is_plausible_equation("12 = 4"));
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(!is_plausible_equation(""));
        assert!(!is_plausible_equation("   "));
    }

    #[test]
    fn test_custom_ratio() {
        // 3 math chars out of 5
        assert!(is_plausible_equation_with("1+2ab", 0.5));
        assert!(!is_plausible_equation_with("1+2ab", 0.7));
    }
}
