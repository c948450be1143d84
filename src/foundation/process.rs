use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::error::{SceneError, SceneResult};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of a child process that ran to completion.
#[derive(Debug)]
pub struct ProcessOutput {
    /// Exit status of the child.
    pub status: ExitStatus,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Raw standard error.
    pub stderr: Vec<u8>,
    /// Wall-clock time between spawn and exit.
    pub elapsed: Duration,
}

impl ProcessOutput {
    /// Standard output decoded lossily as UTF-8.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error decoded lossily as UTF-8.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// `Ok(self)` on a zero exit, otherwise [`SceneError::ProcessFailure`] carrying both streams.
    pub fn into_success(self) -> SceneResult<Self> {
        if self.status.success() {
            Ok(self)
        } else {
            Err(self.into_failure())
        }
    }

    /// Convert into a [`SceneError::ProcessFailure`] regardless of status.
    pub fn into_failure(self) -> SceneError {
        SceneError::ProcessFailure {
            status: self.status,
            stdout: self.stdout_lossy(),
            stderr: self.stderr_lossy(),
        }
    }
}

/// Run `cmd` to completion, killing it once `limit` elapses.
///
/// Both output streams are drained on helper threads so a chatty child cannot block on a full
/// pipe while we poll for its exit. On timeout the child is killed and reaped before
/// [`SceneError::Timeout`] is returned; no partial output is reported.
pub fn run_with_timeout(cmd: &mut Command, limit: Duration) -> SceneResult<ProcessOutput> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!(command = ?cmd, limit_ms = limit.as_millis() as u64, "spawning");

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let started = Instant::now();
    let mut child = cmd.spawn().map_err(|e| {
        SceneError::Other(anyhow::anyhow!(
            "failed to spawn '{program}' (is it installed and on PATH?): {e}"
        ))
    })?;

    let stdout_drain = child.stdout.take().map(drain);
    let stderr_drain = child.stderr.take().map(drain);

    let deadline = started + limit;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    kill_and_reap(&mut child);
                    // Grandchildren may still hold the pipes open; the drains are left detached.
                    drop(stdout_drain);
                    drop(stderr_drain);
                    tracing::warn!(program = %program, limit_ms = limit.as_millis() as u64, "process timed out");
                    return Err(SceneError::Timeout { limit });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(SceneError::Other(anyhow::anyhow!(
                    "failed to wait for '{program}': {e}"
                )));
            }
        }
    };

    let stdout = join_drain(stdout_drain)?;
    let stderr = join_drain(stderr_drain)?;
    let elapsed = started.elapsed();
    tracing::debug!(program = %program, %status, elapsed_ms = elapsed.as_millis() as u64, "process exited");

    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
        elapsed,
    })
}

/// Return `true` when `program` can be started with `version_flag` and exits cleanly.
pub fn is_on_path(program: &str, version_flag: &str) -> bool {
    Command::new(program)
        .arg(version_flag)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> SceneResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| SceneError::Other(anyhow::anyhow!("output drain thread panicked")))?
            .map_err(|e| SceneError::Other(anyhow::anyhow!("failed to read child output: {e}"))),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/process.rs"]
mod tests;
