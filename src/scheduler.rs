//! Solve scheduler - drives capture → OCR → solver on a fixed interval.
//!
//! `process_frame` handles one frame against a caller-held `SolveSession`.
//! `run_solve_loop` repeats it on a worker thread, skipping a tick while the
//! previous frame is still being processed.

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::capture::FrameSource;
use crate::config::AppConfig;
use crate::history::append_history;
use crate::ocr::{recognize_frame, TextRecognizer};
use crate::solver::{analyze_frame, try_evaluate, AnalyzeOptions, ParsedOperation, SolveResult};

/// Global flag indicating if the solve loop is running.
static SOLVING_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Set by `request_stop`, checked between ticks.
static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Granularity of the interruptible sleep between ticks.
const STOP_POLL: Duration = Duration::from_millis(50);

pub fn is_solving() -> bool {
    SOLVING_ACTIVE.load(Ordering::SeqCst)
}

/// Asks a running solve loop to finish after the current frame.
pub fn request_stop() {
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

/// State carried from one frame to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveSession {
    /// The last operation that was solved; an identical frame is a duplicate
    pub last_problem: Option<ParsedOperation>,
    pub solved_count: u32,
}

impl SolveSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.last_problem = None;
        self.solved_count = 0;
    }
}

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// A new problem was answered; `count` is the session's running total
    Solved {
        problem: String,
        result: SolveResult,
        count: u32,
    },
    /// Same operation as the last solved one
    Duplicate,
    /// An operation was found but the frame doesn't look like an equation
    Rejected { text: String, reason: String },
    /// No operation in the frame
    NotRecognized { text: String },
    /// The operation can't be evaluated (e.g. division by zero)
    Unsolvable { text: String, reason: String },
}

/// Runs one frame through the full pipeline.
///
/// Errors are capture or OCR failures; every solver-level outcome is a
/// `FrameOutcome`.
pub fn process_frame(
    session: &mut SolveSession,
    source: &dyn FrameSource,
    recognizer: &dyn TextRecognizer,
    config: &AppConfig,
    division_mode: bool,
) -> Result<FrameOutcome> {
    let (ready, message) = source.check_ready();
    if !ready {
        return Err(anyhow!("Frame source not ready: {}", message));
    }

    let img = source.capture()?;
    let (tokens, frame) = recognize_frame(&img, config.threshold()?, recognizer)?;

    let options = AnalyzeOptions {
        division_mode,
        high_confidence_mode: config.high_confidence_mode,
    };
    let analysis = analyze_frame(&tokens, frame, &config.solver, options);
    for note in &analysis.notes {
        crate::log(note);
    }

    let Some(operation) = analysis.operation.as_ref() else {
        return Ok(FrameOutcome::NotRecognized {
            text: analysis.combined_text,
        });
    };

    if !analysis.is_plausible(&config.solver) {
        return Ok(FrameOutcome::Rejected {
            text: analysis.combined_text,
            reason: "not an equation".to_string(),
        });
    }

    let found = operation.numbers().len();
    if found < config.min_numbers_required {
        return Ok(FrameOutcome::Rejected {
            text: analysis.combined_text,
            reason: format!(
                "{} number(s), at least {} required",
                found, config.min_numbers_required
            ),
        });
    }

    if session.last_problem.as_ref() == Some(operation) {
        return Ok(FrameOutcome::Duplicate);
    }

    let result = match try_evaluate(operation) {
        Ok(result) => result,
        Err(e) => {
            return Ok(FrameOutcome::Unsolvable {
                text: analysis.combined_text,
                reason: e.to_string(),
            });
        }
    };

    session.solved_count += 1;
    session.last_problem = Some(operation.clone());

    Ok(FrameOutcome::Solved {
        problem: analysis.combined_text,
        result,
        count: session.solved_count,
    })
}

/// Settings for one run of the solve loop.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    pub division_mode: bool,
    /// Stop after this many frames; `None` runs until `request_stop`
    pub max_frames: Option<u32>,
    /// Where solved problems are appended when `auto_save_history` is on
    pub history_path: Option<PathBuf>,
}

/// Logs an outcome and records solves in the history.
fn report_outcome(outcome: &FrameOutcome, config: &AppConfig, options: &LoopOptions) {
    match outcome {
        FrameOutcome::Solved {
            problem,
            result,
            count,
        } => {
            crate::log(&format!("[{}] {} = {}", count, problem, result));
            if config.auto_save_history {
                if let Some(path) = &options.history_path {
                    if let Err(e) = append_history(path, problem, result) {
                        crate::log(&format!("Failed to save history: {}", e));
                    }
                }
            }
        }
        FrameOutcome::Duplicate => {}
        FrameOutcome::Rejected { text, reason } => {
            crate::log(&format!("Rejected: {} ({})", text, reason));
        }
        FrameOutcome::NotRecognized { text } => {
            crate::log(&format!("Skipped: {} (not recognized as equation)", text));
        }
        FrameOutcome::Unsolvable { text, reason } => {
            crate::log(&format!("Calculation error for '{}': {}", text, reason));
        }
    }
}

/// Sleeps for `duration`, returning early once a stop is requested.
fn sleep_unless_stopped(duration: Duration) {
    let deadline = Instant::now() + duration;
    while !STOP_REQUESTED.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(STOP_POLL.min(deadline - now));
    }
}

/// Runs the solve loop on the calling thread until stopped or out of frames.
///
/// Each frame is processed on a worker thread; a tick that finds the
/// previous frame still running is skipped. Returns the final session.
///
/// # Errors
/// Returns an error if a solve loop is already running.
pub fn run_solve_loop(
    source: Arc<dyn FrameSource>,
    recognizer: Arc<dyn TextRecognizer>,
    config: AppConfig,
    options: LoopOptions,
) -> Result<SolveSession> {
    if SOLVING_ACTIVE.swap(true, Ordering::SeqCst) {
        return Err(anyhow!("Solve loop is already running"));
    }
    STOP_REQUESTED.store(false, Ordering::SeqCst);

    let interval = Duration::from_millis(config.solve_interval_ms);
    crate::log(&format!(
        "Solving started (interval {} ms, division mode {})",
        config.solve_interval_ms, options.division_mode
    ));

    let session = Arc::new(Mutex::new(SolveSession::new()));
    let processing = Arc::new(AtomicBool::new(false));
    let config = Arc::new(config);
    let options = Arc::new(options);

    let mut frames_started: u32 = 0;
    let mut worker: Option<JoinHandle<()>> = None;

    while !STOP_REQUESTED.load(Ordering::SeqCst) {
        if options.max_frames.is_some_and(|max| frames_started >= max) {
            break;
        }

        if processing.load(Ordering::SeqCst) {
            crate::log("Previous frame still processing, skipping tick");
        } else {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }

            processing.store(true, Ordering::SeqCst);
            frames_started += 1;

            let source = Arc::clone(&source);
            let recognizer = Arc::clone(&recognizer);
            let config = Arc::clone(&config);
            let worker_options = Arc::clone(&options);
            let session = Arc::clone(&session);
            let processing = Arc::clone(&processing);

            worker = Some(thread::spawn(move || {
                let outcome = {
                    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
                    process_frame(
                        &mut session,
                        source.as_ref(),
                        recognizer.as_ref(),
                        &config,
                        worker_options.division_mode,
                    )
                };
                match outcome {
                    Ok(outcome) => report_outcome(&outcome, &config, &worker_options),
                    Err(e) => crate::log(&format!("Error: {}", e)),
                }
                processing.store(false, Ordering::SeqCst);
            }));

            if options.max_frames.is_some_and(|max| frames_started >= max) {
                break;
            }
        }

        sleep_unless_stopped(interval);
    }

    if let Some(handle) = worker.take() {
        if let Err(e) = handle.join() {
            crate::log(&format!("Frame worker panicked: {:?}", e));
        }
    }

    let session = session
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    crate::log(&format!(
        "Solving stopped ({} problem(s) solved, {} frame(s))",
        session.solved_count, frames_started
    ));
    SOLVING_ACTIVE.store(false, Ordering::SeqCst);

    Ok(session)
}
