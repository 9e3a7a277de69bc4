//! Soroban Solver
//!
//! Reads the arithmetic problem shown by a soroban training app from a
//! captured screenshot and computes the answer.
//!
//! The `solver` module is the pure OCR-tokens-to-answer pipeline. The other
//! modules are the collaborators around it: screen capture, Tesseract OCR,
//! configuration, history and the polling scheduler.

pub mod capture;
pub mod config;
pub mod history;
pub mod ocr;
pub mod paths;
pub mod scheduler;
pub mod solver;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("soroban_solver.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
