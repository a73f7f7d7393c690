//! Running the slicer as a child process with a time limit.

use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{SliceError, SliceResult};

/// How often the child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long output may keep arriving after the slicer exits.
///
/// A background process that inherited the pipes can hold them open
/// indefinitely; whatever arrived by then is used.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Stderr kept in error messages.
const STDERR_TAIL: usize = 2000;

/// Captured output of a finished slicer run.
#[derive(Debug)]
pub(crate) struct SlicerRun {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Run `executable args..` and wait at most `timeout`.
///
/// The child is killed and reaped on timeout. A non-zero exit is an error
/// carrying the tail of stderr.
pub(crate) fn run_slicer(executable: &Path, args: &[String], timeout: Duration) -> SliceResult<SlicerRun> {
    debug!(executable = %executable.display(), ?args, "starting slicer");
    let started = Instant::now();

    let mut child = Command::new(executable)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| SliceError::Spawn {
            executable: executable.to_path_buf(),
            source,
        })?;

    // Drain both pipes so a chatty slicer cannot block on a full buffer.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_with_timeout(&mut child, timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill(&mut child, executable);
            return Err(SliceError::Timeout {
                seconds: timeout.as_secs_f64(),
            });
        }
        Err(source) => {
            kill(&mut child, executable);
            return Err(SliceError::io(executable, source));
        }
    };

    let drained_by = Instant::now() + DRAIN_GRACE;
    let run = SlicerRun {
        stdout: collect(stdout, drained_by),
        stderr: collect(stderr, drained_by),
        elapsed: started.elapsed(),
    };

    if !status.success() {
        return Err(SliceError::SlicerFailed {
            code: status.code(),
            stderr: tail(&run.stderr),
        });
    }

    debug!(elapsed_ms = run.elapsed.as_millis(), "slicer finished");
    Ok(run)
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn kill(child: &mut Child, executable: &Path) {
    if let Err(e) = child.kill() {
        warn!(executable = %executable.display(), error = %e, "failed to kill slicer");
    }
    // Reap so no zombie is left behind.
    let _ = child.wait();
}

/// Forward chunks read from `pipe` until it closes or nobody listens.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    let mut pipe = pipe?;
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("slicer-output".into())
        .spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match pipe.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    // A read error leaves whatever was captured so far.
                    Err(_) => break,
                }
            }
        })
        .ok()?;
    Some(rx)
}

/// Gather drained output until the pipe closes or `deadline` passes.
///
/// A drain thread still blocked at the deadline is left behind; it ends
/// once the last writer closes the pipe.
fn collect(output: Option<Receiver<Vec<u8>>>, deadline: Instant) -> String {
    let Some(rx) = output else {
        return String::new();
    };
    let mut bytes = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(chunk) => bytes.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    grace_ms = DRAIN_GRACE.as_millis(),
                    "slicer output still open after exit, keeping what arrived"
                );
                break;
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn tail(text: &str) -> String {
    let trimmed = text.trim();
    let start = trimmed.len().saturating_sub(STDERR_TAIL);
    let start = (start..trimmed.len())
        .find(|&i| trimmed.is_char_boundary(i))
        .unwrap_or(trimmed.len());
    trimmed[start..].to_string()
}
