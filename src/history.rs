//! Solve history stored as CSV.
//!
//! Rows are appended one at a time so a crash never loses earlier solves.
//! Each row contains: problem text, result, timestamp.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::solver::SolveResult;

/// CSV header row.
const CSV_HEADER: [&str; 3] = ["problem", "result", "solved_at"];

/// One solved problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub problem: String,
    pub result: String,
    /// Missing in files written before timestamps were recorded
    pub solved_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub total_problems: usize,
    pub unique_problems: usize,
    /// Most frequent problem and its count; earliest wins ties
    pub most_common: Option<(String, usize)>,
}

/// Creates the history file with a header if it doesn't exist or is empty.
///
/// If the file exists and has content, this does nothing (preserves existing data).
pub fn init_history(path: &Path) -> Result<()> {
    if path.exists() {
        let file = File::open(path).context("Failed to open existing history")?;
        let reader = BufReader::new(file);
        if reader.lines().next().is_some() {
            return Ok(());
        }
    }

    let mut writer = csv::Writer::from_path(path).context("Failed to create history file")?;
    writer
        .write_record(CSV_HEADER)
        .context("Failed to write history header")?;
    writer.flush().context("Failed to write history header")?;
    Ok(())
}

/// Appends one solved problem. Fields holding commas or quotes are quoted.
pub fn append_history(path: &Path, problem: &str, result: &SolveResult) -> Result<()> {
    init_history(path)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open history for append")?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer
        .serialize(HistoryEntry {
            problem: problem.to_string(),
            result: result.to_string(),
            solved_at: Some(Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
        })
        .context("Failed to write history row")?;
    writer.flush().context("Failed to write history row")?;
    Ok(())
}

/// Loads every entry. A missing file is an empty history.
///
/// Skips the header row, blank lines and rows with fewer than two columns.
/// Two-column files from before timestamps were recorded load with
/// `solved_at: None`.
pub fn load_history(path: &Path) -> Result<Vec<HistoryEntry>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open history file: {}", path.display()))?;
    let mut entries = Vec::new();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                crate::log(&format!("Warning: Skipping unreadable history row: {}", e));
                continue;
            }
        };

        match (record.get(0), record.get(1)) {
            (Some(problem), Some(result)) => entries.push(HistoryEntry {
                problem: problem.to_string(),
                result: result.to_string(),
                solved_at: record
                    .get(2)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            }),
            _ => crate::log(&format!(
                "Warning: Skipping malformed history row {}",
                record.position().map_or(0, |p| p.line())
            )),
        }
    }

    Ok(entries)
}

/// Loads the newest `max` entries, oldest first.
pub fn load_recent(path: &Path, max: usize) -> Result<Vec<HistoryEntry>> {
    let mut entries = load_history(path)?;
    let skip = entries.len().saturating_sub(max);
    entries.drain(..skip);
    Ok(entries)
}

/// Deletes the history file.
pub fn clear_history(path: &Path) -> Result<()> {
    if path.is_file() {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove history file: {}", path.display()))?;
    }
    Ok(())
}

pub fn history_stats(entries: &[HistoryEntry]) -> HistoryStats {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for entry in entries {
        let count = counts.entry(entry.problem.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(entry.problem.as_str());
        }
        *count += 1;
    }

    let mut most_common: Option<(String, usize)> = None;
    for problem in first_seen {
        let count = counts[problem];
        if most_common.as_ref().is_none_or(|(_, best)| count > *best) {
            most_common = Some((problem.to_string(), count));
        }
    }

    HistoryStats {
        total_problems: entries.len(),
        unique_problems: counts.len(),
        most_common,
    }
}
