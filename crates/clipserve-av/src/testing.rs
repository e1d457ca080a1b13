//! Test doubles for the process runner.
//!
//! Lets tests exercise full request flows without yt-dlp or ffmpeg on the
//! machine, and verify the cleanup invariant on both success and failure
//! paths.

use crate::runner::{ProcessRunner, RunOutput};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One recorded subprocess invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: String,
    pub args: Vec<String>,
}

type Handler = dyn Fn(&str, &[String]) -> Result<RunOutput> + Send + Sync;

/// A [`ProcessRunner`] that records invocations and answers from a handler
/// instead of spawning processes.
pub struct StubRunner {
    invocations: Mutex<Vec<Invocation>>,
    calls: AtomicUsize,
    handler: Box<Handler>,
}

impl StubRunner {
    /// Answer every invocation with the given handler.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &[String]) -> Result<RunOutput> + Send + Sync + 'static,
    {
        Self {
            invocations: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            handler: Box::new(handler),
        }
    }

    /// Every invocation succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::with_handler(|_, _| Ok(RunOutput::default()))
    }

    /// Every invocation succeeds with the given stdout.
    pub fn with_stdout(stdout: &str) -> Self {
        let stdout = stdout.to_string();
        Self::with_handler(move |_, _| {
            Ok(RunOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
            })
        })
    }

    /// Every invocation fails with a nonzero exit.
    pub fn failing() -> Self {
        Self::with_handler(|tool, _| Err(Error::process_failed(tool, Some(1), "stub failure")))
    }

    /// The first `n` invocations fail; later ones succeed.
    pub fn failing_first(n: usize) -> Self {
        let mut runner = Self::succeeding();
        let failures = AtomicUsize::new(n);
        runner.handler = Box::new(move |tool, _| {
            if failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
                .is_ok()
            {
                Err(Error::process_failed(tool, Some(1), "stub failure"))
            } else {
                Ok(RunOutput::default())
            }
        });
        runner
    }

    /// Recorded invocations, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Total number of invocations seen.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessRunner for StubRunner {
    async fn run(&self, tool: &str, args: &[String]) -> Result<RunOutput> {
        self.invocations.lock().unwrap().push(Invocation {
            tool: tool.to_string(),
            args: args.to_vec(),
        });
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.handler)(tool, args)
    }
}
