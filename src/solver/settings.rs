//! Tunable thresholds for the solver pipeline.
//!
//! Stored as the `solver` section of config.json.

use serde::{Deserialize, Serialize};

/// Narrow back-button heuristic: a lone `<` near the left edge is UI chrome.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BackButtonRule {
    /// `<` is kept only right of `frame width / width_divisor`
    pub width_divisor: u32,
    /// Used instead when the frame width is unknown (0)
    pub fallback_min_x: i32,
}

impl Default for BackButtonRule {
    fn default() -> Self {
        Self {
            width_divisor: 5,
            fallback_min_x: 50,
        }
    }
}

impl BackButtonRule {
    /// Smallest x (exclusive) at which a `<` is treated as problem text.
    pub fn min_x(&self, frame_width: u32) -> i32 {
        if frame_width == 0 || self.width_divisor == 0 {
            return self.fallback_min_x;
        }
        i32::try_from(frame_width / self.width_divisor).unwrap_or(i32::MAX)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverSettings {
    /// Tokens whose top-left lies inside this square at the origin are dropped
    pub ui_corner_size: i32,
    /// Optional second back-button filter
    pub back_button: Option<BackButtonRule>,
    /// Single digits below this confidence are noise
    pub lone_digit_min_confidence: i32,
    /// Length (chars) up to which a token counts as a short fragment
    pub short_text_max_len: usize,
    /// Short fragments below this confidence are noise
    pub short_text_min_confidence: i32,
    /// Confidence a token must exceed to join the combined text in high-confidence mode
    pub high_confidence_min: i32,
    /// Minimum share of math characters in an equation's text
    pub min_math_ratio: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            ui_corner_size: 150,
            back_button: None,
            lone_digit_min_confidence: 70,
            short_text_max_len: 2,
            short_text_min_confidence: 60,
            high_confidence_min: 50,
            min_math_ratio: 0.6,
        }
    }
}
