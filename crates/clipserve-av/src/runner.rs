//! External process execution.
//!
//! All subprocess invocations go through [`ProcessRunner`] so the exact
//! commands a request triggers stay auditable in one place, and so tests can
//! substitute a stub for the real tools.

use crate::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured output of a completed subprocess.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Boundary for invoking external commands.
///
/// Implementations never interpret argument semantics; callers own the full
/// argument template. A nonzero exit must surface as
/// [`Error::ProcessFailed`] carrying the captured stderr.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, tool: &str, args: &[String]) -> Result<RunOutput>;
}

/// Runs commands as real child processes with an optional timeout.
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Create a runner that waits indefinitely for children.
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Create a runner that kills children after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, tool: &str, args: &[String]) -> Result<RunOutput> {
        tracing::debug!("Running {} {:?}", tool, args);

        let child = Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::tool_not_found(tool),
                _ => Error::Io(e),
            })?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result?,
                // kill_on_drop reaps the child once the future is dropped
                Err(_) => {
                    return Err(Error::Timeout {
                        tool: tool.to_string(),
                        seconds: limit.as_secs(),
                    })
                }
            },
            None => child.wait_with_output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::warn!(
                "{} exited with {:?}: {}",
                tool,
                output.status.code(),
                stderr.trim()
            );
            return Err(Error::process_failed(
                tool,
                output.status.code(),
                stderr.trim().to_string(),
            ));
        }

        Ok(RunOutput { stdout, stderr })
    }
}
