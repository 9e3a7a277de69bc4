pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::{parse_tsv_output, TesseractRecognizer, TextRecognizer};
pub use preprocess::{binarize, crop_problem_area};
pub use setup::find_tesseract;

use anyhow::Result;
use image::{ImageBuffer, Rgba};

use crate::config::Threshold;
use crate::solver::{FrameSize, RecognizedToken};

/// High-level function: screenshot → tokens.
///
/// Crops the problem area, binarizes it and runs the recognizer. Returns the
/// tokens together with the size of the recognized image.
pub fn recognize_frame(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    threshold: Threshold,
    recognizer: &dyn TextRecognizer,
) -> Result<(Vec<RecognizedToken>, FrameSize)> {
    let cropped = crop_problem_area(img);
    let (width, height) = cropped.dimensions();

    crate::log(&format!(
        "OCR: problem area {}x{} (threshold {})",
        width,
        height,
        threshold.value()
    ));

    let binary = binarize(&cropped, threshold);
    let tokens = recognizer.recognize(&binary)?;

    Ok((tokens, FrameSize::new(width, height)))
}
