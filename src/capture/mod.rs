//! Frame sources for the solver.
//!
//! This module provides:
//! - The `FrameSource` trait the scheduler pulls frames from
//! - Android screen capture over ADB (`AdbCapture`)
//! - A still image on disk (`ImageFileSource`)

pub mod adb;

pub use adb::{is_device_connected, AdbCapture};

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgba};
use std::path::PathBuf;

pub type Frame = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Anything that can produce the current screen as an RGBA image.
pub trait FrameSource: Send + Sync {
    fn capture(&self) -> Result<Frame>;

    /// Whether the source can currently deliver frames, with a reason.
    fn check_ready(&self) -> (bool, String) {
        (true, "ready".to_string())
    }
}

/// Serves the same image file on every capture.
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSource for ImageFileSource {
    fn capture(&self) -> Result<Frame> {
        let img = image::open(&self.path)
            .with_context(|| format!("Failed to load image {}", self.path.display()))?;
        Ok(img.to_rgba8())
    }

    fn check_ready(&self) -> (bool, String) {
        if self.path.is_file() {
            (true, format!("Image {}", self.path.display()))
        } else {
            (false, format!("Image not found: {}", self.path.display()))
        }
    }
}
