use serde::{Deserialize, Serialize};

/// One text run reported by the OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizedToken {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Recognition confidence, 0-100
    pub confidence: i32,
}

impl RecognizedToken {
    pub fn new(text: &str, x: i32, y: i32, width: i32, height: i32, confidence: i32) -> Self {
        Self {
            text: text.to_string(),
            x,
            y,
            width,
            height,
            confidence,
        }
    }
}

/// A token whose text has been cleaned of common OCR confusions.
///
/// `text` is never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedToken {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: i32,
}

impl NormalizedToken {
    /// Builds the overlay box for this token, or `None` for a degenerate one
    /// or one whose far edge falls outside `i32`.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let right = self.x.checked_add(self.width)?;
        let bottom = self.y.checked_add(self.height)?;
        BoundingBox::from_bounds(self.x, self.y, right, bottom).ok()
    }
}

/// Pixel rectangle `(left, top, right, bottom)` handed to the display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    /// Create a box from bounds (left, top, right, bottom)
    pub fn from_bounds(left: i32, top: i32, right: i32, bottom: i32) -> Result<Self, String> {
        if right <= left {
            return Err("right must be greater than left".to_string());
        }
        if bottom <= top {
            return Err("bottom must be greater than top".to_string());
        }

        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    pub fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.abs_diff(self.top)
    }

    /// Check if the box contains a point (right/bottom edges exclusive)
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Dimensions of the image the tokens were recognized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
