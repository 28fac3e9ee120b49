//! Lifecycle record of one analyzer execution
//!
//! `SubprocessRun` is created at the top of `ProcessOrchestrator::run` and
//! dropped when the call resolves. Its state follows:
//!
//! ```text
//! Starting ──> Running ──> Exited(code)
//!    │            └──────> TimedOut
//!    └──> StartFailed
//! ```

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::ffi::OsString;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

/// Lifecycle state of an analyzer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    /// Command assembled, not yet spawned
    Starting,
    /// Child spawned and being supervised
    Running,
    /// Time budget expired; child was killed
    TimedOut,
    /// Child exited on its own (`None` when ended by a signal)
    Exited(Option<i32>),
    /// Spawn failed
    StartFailed,
}

impl RunState {
    /// Whether no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::TimedOut | Self::Exited(_) | Self::StartFailed)
    }
}

/// Check a state transition
#[must_use]
pub fn transition_allowed(from: RunState, to: RunState) -> bool {
    use RunState::*;
    match from {
        Starting => matches!(to, Running | StartFailed),
        Running => matches!(to, TimedOut | Exited(_)),
        TimedOut | Exited(_) | StartFailed => false,
    }
}

/// Metadata returned for a clean exit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitInfo {
    /// Exit code (always 0 when returned from `run`)
    pub exit_code: i32,
    /// Wall-clock launch time
    pub started_at: DateTime<Utc>,
    /// Time from spawn to exit
    pub elapsed: Duration,
    /// Bytes captured from stdout
    pub stdout_len: usize,
    /// Bytes captured from stderr
    pub stderr_len: usize,
}

/// Unbounded capture buffer shared with a drain task
#[derive(Debug, Clone, Default)]
pub(crate) struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    /// Drain `pipe` into this buffer on a background task
    pub(crate) fn spawn_drain<R>(&self, pipe: Option<R>) -> Option<JoinHandle<()>>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let mut pipe = pipe?;
        let sink = Arc::clone(&self.0);
        Some(tokio::spawn(async move {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => sink.lock().extend_from_slice(&chunk[..n]),
                }
            }
        }))
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub(crate) fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

/// Transient record of one orchestrated execution
#[derive(Debug)]
pub struct SubprocessRun {
    command: String,
    args: Vec<OsString>,
    started_at: DateTime<Utc>,
    started: Instant,
    timeout: Duration,
    pub(crate) stdout: OutputBuffer,
    pub(crate) stderr: OutputBuffer,
    state: RunState,
}

impl SubprocessRun {
    /// Create a run in the `Starting` state
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<OsString>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            started_at: Utc::now(),
            started: Instant::now(),
            timeout,
            stdout: OutputBuffer::default(),
            stderr: OutputBuffer::default(),
            state: RunState::Starting,
        }
    }

    /// Move to `to`
    ///
    /// Illegal transitions are logged and ignored; the orchestrator never
    /// issues one.
    pub fn advance(&mut self, to: RunState) {
        if !transition_allowed(self.state, to) {
            tracing::warn!("Ignoring illegal run transition {:?} -> {:?}", self.state, to);
            return;
        }
        tracing::debug!("Analyzer run {:?} -> {:?}", self.state, to);
        if to == RunState::Running {
            self.started = Instant::now();
        }
        self.state = to;
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Display form of the command
    #[inline]
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Arguments passed after the interpreter
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Time budget
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time since the child was spawned
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Everything captured from stderr so far
    #[must_use]
    pub fn stderr_text(&self) -> String {
        self.stderr.to_string_lossy()
    }

    /// Everything captured from stdout so far
    #[must_use]
    pub fn stdout_text(&self) -> String {
        self.stdout.to_string_lossy()
    }

    /// Exit metadata for a clean exit
    #[must_use]
    pub fn exit_info(&self, exit_code: i32) -> ExitInfo {
        ExitInfo {
            exit_code,
            started_at: self.started_at,
            elapsed: self.elapsed(),
            stdout_len: self.stdout.len(),
            stderr_len: self.stderr.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        assert!(transition_allowed(RunState::Starting, RunState::Running));
        assert!(transition_allowed(RunState::Starting, RunState::StartFailed));
        assert!(transition_allowed(RunState::Running, RunState::Exited(Some(0))));
        assert!(transition_allowed(RunState::Running, RunState::TimedOut));
    }

    #[test]
    fn terminal_states_are_final() {
        for state in [RunState::TimedOut, RunState::Exited(Some(1)), RunState::StartFailed] {
            assert!(state.is_terminal());
            assert!(!transition_allowed(state, RunState::Running));
        }
        assert!(!transition_allowed(RunState::Starting, RunState::TimedOut));
    }

    #[test]
    fn advance_ignores_illegal_moves() {
        let mut run = SubprocessRun::new("sh x", Vec::new(), Duration::from_secs(1));
        run.advance(RunState::TimedOut);
        assert_eq!(run.state(), RunState::Starting);

        run.advance(RunState::Running);
        run.advance(RunState::Exited(Some(0)));
        assert_eq!(run.state(), RunState::Exited(Some(0)));

        run.advance(RunState::Running);
        assert_eq!(run.state(), RunState::Exited(Some(0)));
    }

    #[tokio::test]
    async fn output_buffer_collects_pipe() {
        let buffer = OutputBuffer::default();
        let pipe: &'static [u8] = b"hello analyzer";
        let task = buffer.spawn_drain(Some(pipe)).unwrap();
        task.await.unwrap();
        assert_eq!(buffer.to_string_lossy(), "hello analyzer");
        assert_eq!(buffer.len(), 14);
    }
}
