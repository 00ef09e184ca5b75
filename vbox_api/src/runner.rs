//! Running `VBoxManage` as a child process.

use std::future::Future;
use std::io;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;
use vboxmanage::CommandVector;

/// Stderr quoted in errors is capped at this many bytes.
const MAX_STDERR_BYTES: usize = 512;

/// Failure to get usable stdout out of the external tool.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("command exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },
    #[error("command did not finish within {after:?}")]
    Timeout { after: Duration },
    #[error("I/O error while waiting for command: {0}")]
    Io(#[from] io::Error),
}

/// Something that can execute a built command and hand back its stdout.
///
/// The dispatcher is generic over this so tests can substitute canned output
/// for a real `VBoxManage`.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandVector) -> impl Future<Output = Result<String, ExecError>> + Send;
}

/// Spawns the command with `tokio::process` and kills it when it overruns
/// `timeout`.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandVector) -> impl Future<Output = Result<String, ExecError>> + Send {
        async move {
            debug!(command = %command, timeout = ?self.timeout, "spawning");
            let child = Command::new(command.program())
                .args(command.args())
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| ExecError::Spawn {
                    program: command.program().to_string(),
                    source,
                })?;

            // Dropping the wait future on timeout drops the child, which kills it.
            let output = tokio::time::timeout(self.timeout, child.wait_with_output())
                .await
                .map_err(|_| ExecError::Timeout {
                    after: self.timeout,
                })??;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                debug!(command = %command, status = %output.status, stderr = %stderr, "command failed");
                return Err(ExecError::NonZeroExit {
                    code: output.status.code(),
                    stderr: truncate_stderr(&stderr),
                });
            }

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

fn truncate_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.len() <= MAX_STDERR_BYTES {
        return stderr.to_string();
    }
    let mut end = MAX_STDERR_BYTES;
    while !stderr.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &stderr[..end])
}
