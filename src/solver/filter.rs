use super::settings::SolverSettings;
use super::token::NormalizedToken;

/// Removes low-confidence noise and puts the rest into reading order.
///
/// Dropped:
/// - a single digit below `lone_digit_min_confidence`
/// - any text of at most `short_text_max_len` chars below `short_text_min_confidence`
///
/// Survivors are stably sorted by x, so tokens sharing a column keep the
/// order they were discovered in. Each drop is described in `notes`.
pub fn filter_and_order(
    tokens: Vec<NormalizedToken>,
    settings: &SolverSettings,
    notes: &mut Vec<String>,
) -> Vec<NormalizedToken> {
    let mut filtered: Vec<NormalizedToken> = tokens
        .into_iter()
        .filter(|token| match drop_reason(token, settings) {
            Some(reason) => {
                notes.push(reason);
                false
            }
            None => true,
        })
        .collect();

    filtered.sort_by_key(|token| token.x);
    filtered
}

fn drop_reason(token: &NormalizedToken, settings: &SolverSettings) -> Option<String> {
    let len = token.text.chars().count();

    if len == 1
        && token.text.chars().all(|c| c.is_ascii_digit())
        && token.confidence < settings.lone_digit_min_confidence
    {
        return Some(format!(
            "Filtering out low-confidence single digit: '{}' (confidence: {})",
            token.text, token.confidence
        ));
    }

    if len <= settings.short_text_max_len && token.confidence < settings.short_text_min_confidence {
        return Some(format!(
            "Filtering out low-confidence short text: '{}' (confidence: {})",
            token.text, token.confidence
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(text: &str, x: i32, confidence: i32) -> NormalizedToken {
        NormalizedToken {
            text: text.to_string(),
            x,
            y: 200,
            width: 20,
            height: 30,
            confidence,
        }
    }

    fn texts(tokens: &[NormalizedToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_low_confidence_lone_digit_dropped() {
        let tokens = vec![make_token("7", 10, 69), make_token("8", 20, 70)];
        let result = filter_and_order(tokens, &SolverSettings::default(), &mut Vec::new());
        assert_eq!(texts(&result), vec!["8"]);
    }

    #[test]
    fn test_low_confidence_short_text_dropped() {
        let tokens = vec![
            make_token("+", 10, 59),
            make_token("12", 20, 59),
            make_token("123", 30, 20),
            make_token("/", 40, 60),
        ];
        let result = filter_and_order(tokens, &SolverSettings::default(), &mut Vec::new());
        assert_eq!(texts(&result), vec!["123", "/"]);
    }

    #[test]
    fn test_sorted_left_to_right() {
        let tokens = vec![
            make_token("4", 60, 90),
            make_token("12", 10, 90),
            make_token("/", 40, 90),
        ];
        let result = filter_and_order(tokens, &SolverSettings::default(), &mut Vec::new());
        assert_eq!(texts(&result), vec!["12", "/", "4"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_x() {
        let tokens = vec![
            make_token("first", 30, 90),
            make_token("zero", 10, 90),
            make_token("second", 30, 90),
        ];
        let result = filter_and_order(tokens, &SolverSettings::default(), &mut Vec::new());
        assert_eq!(texts(&result), vec!["zero", "first", "second"]);
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let settings = SolverSettings {
            lone_digit_min_confidence: 95,
            ..SolverSettings::default()
        };
        let tokens = vec![make_token("7", 10, 90)];
        assert!(filter_and_order(tokens, &settings, &mut Vec::new()).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_and_order(Vec::new(), &SolverSettings::default(), &mut Vec::new()).is_empty());
    }

    #[test]
    fn test_drops_are_reported_in_notes() {
        let tokens = vec![
            make_token("7", 10, 40),
            make_token("ab", 20, 50),
            make_token("12", 30, 90),
        ];
        let mut notes = Vec::new();
        let result = filter_and_order(tokens, &SolverSettings::default(), &mut notes);

        assert_eq!(texts(&result), vec!["12"]);
        assert_eq!(notes.len(), 2);
        assert!(notes[0].contains("single digit: '7'"));
        assert!(notes[1].contains("short text: 'ab'"));
    }
}
