//! Android screen capture through the `adb` command-line tool.

use anyhow::{anyhow, Context, Result};
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{Frame, FrameSource};

/// Timeout for `adb devices`.
const DEVICE_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// How often a running adb process is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Output of a finished adb invocation.
struct AdbOutput {
    success: bool,
    stdout: Vec<u8>,
    stderr: String,
}

/// Runs `adb <args>`, killing it if it outlives `timeout`.
///
/// stdout and stderr are drained on their own threads so a large screenshot
/// can't block the child on a full pipe.
fn run_adb(args: &[&str], timeout: Duration) -> Result<AdbOutput> {
    let mut child = Command::new("adb")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                anyhow!("ADB not found. Make sure Android Debug Bridge is installed and in PATH")
            }
            _ => anyhow!("Failed to start adb: {}", e),
        })?;

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let status = wait_with_timeout(&mut child, timeout)?;

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    match status {
        Some(status) => Ok(AdbOutput {
            success: status.success(),
            stdout,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        }),
        None => Err(anyhow!(
            "adb {} timed out after {} seconds",
            args.join(" "),
            timeout.as_secs()
        )),
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Returns `None` if the child was killed after `timeout`.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().context("Failed to poll adb")? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Counts attached devices in `adb devices` output.
///
/// Devices listed as `offline` or `unauthorized` are not counted.
fn count_devices(output: &str) -> usize {
    output
        .lines()
        .skip(1) // "List of devices attached"
        .filter(|line| line.split_whitespace().nth(1) == Some("device"))
        .count()
}

/// Checks whether at least one Android device is attached.
///
/// Returns the result together with a message for the log.
pub fn is_device_connected() -> (bool, String) {
    match run_adb(&["devices"], DEVICE_CHECK_TIMEOUT) {
        Ok(output) if output.success => {
            let count = count_devices(&String::from_utf8_lossy(&output.stdout));
            (count > 0, format!("Found {} device(s)", count))
        }
        Ok(output) => (false, format!("ADB error: {}", output.stderr)),
        Err(e) => (false, format!("Connection test failed: {}", e)),
    }
}

/// Captures the screen of the attached Android device.
pub struct AdbCapture {
    timeout: Duration,
}

impl AdbCapture {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl FrameSource for AdbCapture {
    fn capture(&self) -> Result<Frame> {
        let output = run_adb(&["exec-out", "screencap", "-p"], self.timeout)?;

        if !output.success || output.stdout.is_empty() {
            return Err(anyhow!("ADB error: {}", output.stderr));
        }

        let img = image::load_from_memory(&output.stdout)
            .context("Failed to decode screenshot from adb")?;
        Ok(img.to_rgba8())
    }

    fn check_ready(&self) -> (bool, String) {
        is_device_connected()
    }
}
