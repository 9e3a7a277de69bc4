use super::settings::SolverSettings;
use super::token::{FrameSize, NormalizedToken, RecognizedToken};

/// Characters OCR commonly returns in place of digits and operator glyphs.
const CONFUSIONS: &[(char, char)] = &[
    ('O', '0'),
    ('o', '0'),
    ('l', '1'),
    ('I', '1'),
    ('|', '1'),
    ('\u{00D7}', '*'), // ×
    ('x', '*'),
    ('\u{2212}', '-'), // − minus sign
    ('\u{2013}', '-'), // – en-dash
    ('\u{00F7}', '/'), // ÷
    (':', '/'),
    ('\u{201C}', '"'), // “
    ('\u{201D}', '"'), // ”
];

/// Replaces every confusable character in `text`.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            CONFUSIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

/// True for a non-empty string of ASCII digits.
pub fn is_digit_string(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Cleans each token's text and drops empty tokens and UI chrome.
///
/// A `+` sitting between two plain numbers is read as a misrecognized `÷`
/// and becomes `/`. Neighbors are judged on their raw text, before any
/// token is dropped. Output keeps input order; reading order is the
/// filter's job. Every correction and drop is described in `notes`.
pub fn normalize(
    tokens: &[RecognizedToken],
    frame: FrameSize,
    settings: &SolverSettings,
    notes: &mut Vec<String>,
) -> Vec<NormalizedToken> {
    let mut normalized = Vec::with_capacity(tokens.len());

    for (idx, token) in tokens.iter().enumerate() {
        let raw = token.text.trim();
        if raw.is_empty() {
            continue;
        }

        let mut cleaned = clean_text(raw);

        if raw == "+" || cleaned == "+" {
            let left_ok = idx > 0 && is_digit_string(tokens[idx - 1].text.trim());
            let right_ok = tokens
                .get(idx + 1)
                .is_some_and(|next| is_digit_string(next.text.trim()));
            if left_ok && right_ok {
                notes.push(format!("Correcting misread '+' to '/' at index {}", idx));
                cleaned = "/".to_string();
            }
        }

        let element = NormalizedToken {
            text: cleaned,
            x: token.x,
            y: token.y,
            width: token.width,
            height: token.height,
            confidence: token.confidence,
        };

        if is_ui_element(&element, frame, settings) {
            notes.push(format!(
                "Skipping potential UI element: '{}' at ({}, {})",
                element.text, element.x, element.y
            ));
            continue;
        }

        normalized.push(element);
    }

    normalized
}

/// Back/menu controls: anything starting in the top-left corner, and
/// optionally a lone `<` close to the left edge.
fn is_ui_element(element: &NormalizedToken, frame: FrameSize, settings: &SolverSettings) -> bool {
    let corner = settings.ui_corner_size;
    if element.x < corner && element.y < corner {
        return true;
    }

    match settings.back_button {
        Some(rule) => element.text == "<" && element.x <= rule.min_x(frame.width),
        None => false,
    }
}
