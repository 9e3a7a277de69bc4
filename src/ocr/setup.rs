use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::process::Command;

use crate::log;

pub struct TesseractPaths {
    pub executable: PathBuf,
    /// `None` means the executable's built-in tessdata location
    pub tessdata: Option<PathBuf>,
}

fn executable_name() -> &'static str {
    if cfg!(windows) { "tesseract.exe" } else { "tesseract" }
}

/// Returns the per-user directory for a bundled Tesseract
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("soroban-solver")
        .join("tesseract")
}

/// Directories searched, in order, before falling back to PATH.
fn candidate_dirs() -> Vec<PathBuf> {
    vec![
        crate::paths::get_exe_dir().join("tesseract"),
        get_tesseract_dir(),
    ]
}

fn runs(executable: &PathBuf) -> bool {
    Command::new(executable)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Locates a working Tesseract executable and its tessdata directory.
pub fn find_tesseract() -> Result<TesseractPaths> {
    for dir in candidate_dirs() {
        let executable = dir.join(executable_name());
        if executable.exists() {
            let tessdata = dir.join("tessdata");
            log(&format!("Tesseract found at: {}", dir.display()));
            return Ok(TesseractPaths {
                executable,
                tessdata: tessdata.exists().then_some(tessdata),
            });
        }
    }

    let system = PathBuf::from(executable_name());
    if runs(&system) {
        log("Found Tesseract in system PATH");
        return Ok(TesseractPaths {
            executable: system,
            tessdata: None,
        });
    }

    Err(anyhow!(
        "Tesseract not found. Install it or place it in {}",
        get_tesseract_dir().display()
    ))
}
