//! OCR tokens → arithmetic operation → answer.
//!
//! Stages run strictly forward:
//! - `normalize`: OCR confusion cleanup, UI chrome removal
//! - `filter`: confidence thresholds, left-to-right ordering
//! - `select`: strategy cascade producing a `ParsedOperation`
//! - `validate`: equation plausibility of the combined text
//! - `evaluate`: arithmetic-only evaluation
//!
//! Everything here is pure and holds no state between calls.

pub mod evaluate;
pub mod filter;
pub mod normalize;
pub mod operation;
pub mod select;
pub mod settings;
pub mod token;
pub mod validate;

pub use evaluate::{evaluate, try_evaluate, EvalError};
pub use filter::filter_and_order;
pub use normalize::normalize;
pub use operation::{BinaryKind, ParsedOperation, SolveResult};
pub use select::{select, select_with, Selection};
pub use settings::{BackButtonRule, SolverSettings};
pub use token::{BoundingBox, FrameSize, NormalizedToken, RecognizedToken};
pub use validate::{is_plausible_equation, is_plausible_equation_with};

/// Per-call switches forwarded from the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub division_mode: bool,
    pub high_confidence_mode: bool,
}

/// Everything the display and history need from one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    pub operation: Option<ParsedOperation>,
    pub combined_text: String,
    /// Boxes of the tokens that made it into `combined_text`
    pub boxes: Vec<BoundingBox>,
    /// Corrections, drops and the strategy used, in pipeline order
    pub notes: Vec<String>,
}

impl FrameAnalysis {
    /// Runs the equation validator on the combined text.
    pub fn is_plausible(&self, settings: &SolverSettings) -> bool {
        is_plausible_equation_with(&self.combined_text, settings.min_math_ratio)
    }

    /// Validates, then evaluates. `None` when there is nothing to answer.
    pub fn solve(&self, settings: &SolverSettings) -> Option<SolveResult> {
        let operation = self.operation.as_ref()?;
        if !self.is_plausible(settings) {
            return None;
        }
        evaluate(operation)
    }
}

/// Runs normalize → filter → select over one frame's tokens.
pub fn analyze_frame(
    tokens: &[RecognizedToken],
    frame: FrameSize,
    settings: &SolverSettings,
    options: AnalyzeOptions,
) -> FrameAnalysis {
    let mut notes = Vec::new();
    let normalized = normalize(tokens, frame, settings, &mut notes);
    let filtered = filter_and_order(normalized, settings, &mut notes);

    let boxes = filtered
        .iter()
        .filter_map(NormalizedToken::bounding_box)
        .collect();

    let high_confidence_min = options
        .high_confidence_mode
        .then_some(settings.high_confidence_min);
    let Selection {
        operation,
        combined_text,
        notes: selection_notes,
    } = select_with(&filtered, options.division_mode, high_confidence_min);
    notes.extend(selection_notes);

    FrameAnalysis {
        operation,
        combined_text,
        boxes,
        notes,
    }
}
