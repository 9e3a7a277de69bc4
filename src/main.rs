//! Soroban Solver
//!
//! Captures the Android screen over ADB, reads the arithmetic problem with
//! Tesseract and logs the answer.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use soroban_solver::capture::{AdbCapture, FrameSource, ImageFileSource};
use soroban_solver::config::{get_config, init_config};
use soroban_solver::history::{
    append_history, clear_history, history_stats, load_history, load_recent,
};
use soroban_solver::ocr::TesseractRecognizer;
use soroban_solver::scheduler::{
    process_frame, run_solve_loop, FrameOutcome, LoopOptions, SolveSession,
};
use soroban_solver::{log, paths};

/// Reads soroban problems from an Android screen and solves them.
#[derive(Parser, Debug)]
#[command(name = "soroban-solver", version, about, long_about = None)]
struct Cli {
    /// Solve a single screenshot instead of capturing over ADB
    #[arg(long)]
    image: Option<PathBuf>,

    /// Stop live solving after this many frames
    #[arg(long)]
    frames: Option<u32>,

    /// Read every binary operation as a division
    #[arg(long)]
    division: bool,

    /// Print history statistics and recent entries
    #[arg(long, conflicts_with = "clear_history")]
    history: bool,

    /// Delete the solve history
    #[arg(long)]
    clear_history: bool,
}

fn show_history(path: &Path, max_entries: usize) -> Result<()> {
    let stats = history_stats(&load_history(path)?);
    log(&format!(
        "History: {} solved, {} unique",
        stats.total_problems, stats.unique_problems
    ));
    if let Some((problem, count)) = stats.most_common {
        log(&format!("Most common: {} ({} times)", problem, count));
    }

    for entry in load_recent(path, max_entries)? {
        log(&format!(
            "History: {} = {} ({})",
            entry.problem,
            entry.result,
            entry.solved_at.as_deref().unwrap_or("-")
        ));
    }
    Ok(())
}

fn solve_image(path: PathBuf, division_mode: bool) -> Result<()> {
    let config = get_config();
    let source = ImageFileSource::new(path);
    let recognizer = TesseractRecognizer::new()?;
    let mut session = SolveSession::new();

    let outcome = process_frame(&mut session, &source, &recognizer, config, division_mode)?;
    log(&format!("{:?}", outcome));

    if let FrameOutcome::Solved {
        problem, result, ..
    } = &outcome
    {
        println!("{} = {}", problem, result);
        if config.auto_save_history {
            append_history(&paths::get_history_path(), problem, result)?;
        }
    }
    Ok(())
}

fn run_live(frames: Option<u32>, division_mode: bool) -> Result<()> {
    let config = get_config();

    let source = AdbCapture::new(config.capture_timeout_secs);
    let (connected, message) = source.check_ready();
    log(&format!("ADB: {}", message));
    if !connected {
        log("No Android device found. Please connect a device.");
    }

    let recognizer = TesseractRecognizer::new()?;
    let session = run_solve_loop(
        Arc::new(source),
        Arc::new(recognizer),
        config.clone(),
        LoopOptions {
            division_mode,
            max_frames: frames,
            history_path: Some(paths::get_history_path()),
        },
    )?;

    log(&format!("Solved {} problem(s)", session.solved_count));
    Ok(())
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    paths::ensure_directories()?;
    init_config();

    let config = get_config();
    for issue in config.validate() {
        log(&format!("Config warning: {}", issue));
    }
    // An unusable threshold stops here rather than on the first frame
    config.threshold()?;

    let cli = Cli::parse();
    let history_path = paths::get_history_path();

    if cli.clear_history {
        clear_history(&history_path)?;
        log("History cleared");
        return Ok(());
    }

    if cli.history {
        return show_history(&history_path, config.max_history_entries);
    }

    let division_mode = cli.division || config.division_mode;

    if let Some(image) = cli.image {
        return solve_image(image, division_mode);
    }

    let recent = load_recent(&history_path, config.max_history_entries)?;
    if !recent.is_empty() {
        log(&format!("Loaded history ({} entries)", recent.len()));
    }

    run_live(cli.frames, division_mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_no_args() {
        let cli = Cli::try_parse_from(["soroban-solver"]).unwrap();
        assert_eq!(cli.image, None);
        assert_eq!(cli.frames, None);
        assert!(!cli.division && !cli.history && !cli.clear_history);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "soroban-solver",
            "--image",
            "shot.png",
            "--frames",
            "5",
            "--division",
        ])
        .unwrap();
        assert_eq!(cli.image, Some(PathBuf::from("shot.png")));
        assert_eq!(cli.frames, Some(5));
        assert!(cli.division);
        assert!(!cli.history);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Cli::try_parse_from(["soroban-solver", "--image"]).is_err());
        assert!(Cli::try_parse_from(["soroban-solver", "--frames", "many"]).is_err());
        assert!(Cli::try_parse_from(["soroban-solver", "--bogus"]).is_err());
        assert!(
            Cli::try_parse_from(["soroban-solver", "--history", "--clear-history"]).is_err()
        );
    }
}
