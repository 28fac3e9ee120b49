//! Analyzer process orchestrator
//!
//! One call, one child process. The child is reaped on every exit path:
//! normal exit, timeout (kill then wait), and wait failure. `kill_on_drop`
//! covers a caller that drops the future mid-flight.

use crate::classify::{classify_stderr, ExitClassification};
use crate::command::AnalyzerCommand;
use crate::error::ProcessError;
use crate::run::{ExitInfo, RunState, SubprocessRun};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Canonical analyzer time budget
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// How long drain tasks may lag behind process exit
///
/// A grandchild that inherited the pipes can keep them open after the
/// analyzer itself is gone.
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// Runs the statistical analyzer
///
/// Implement this trait to substitute the analyzer in tests or to run it
/// somewhere other than a local subprocess.
#[async_trait::async_trait]
pub trait StatisticalRunner: Send + Sync {
    /// Run the analyzer once over `dataset`, asking it to write its image
    /// to `output`
    ///
    /// # Errors
    /// - `ProcessError::StartFailure` if the analyzer cannot be launched
    /// - `ProcessError::Timeout` if it outlives `timeout`
    /// - `ProcessError::NonZeroExit` if it exits unsuccessfully
    async fn run(&self, dataset: &Path, output: &Path, timeout: Duration) -> Result<ExitInfo, ProcessError>;
}

/// Local subprocess runner
#[derive(Debug, Clone, Default)]
pub struct ProcessOrchestrator {
    command: AnalyzerCommand,
}

impl ProcessOrchestrator {
    /// Create orchestrator for an analyzer command
    #[inline]
    #[must_use]
    pub fn new(command: AnalyzerCommand) -> Self {
        Self { command }
    }

    /// Configured analyzer command
    #[inline]
    #[must_use]
    pub fn command(&self) -> &AnalyzerCommand {
        &self.command
    }

    fn spawn(&self, run: &SubprocessRun) -> std::io::Result<Child> {
        Command::new(self.command.interpreter())
            .args(run.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
    }
}

#[async_trait::async_trait]
impl StatisticalRunner for ProcessOrchestrator {
    async fn run(&self, dataset: &Path, output: &Path, timeout: Duration) -> Result<ExitInfo, ProcessError> {
        let mut run = SubprocessRun::new(
            self.command.to_string(),
            self.command.args(dataset, output),
            timeout,
        );

        if !tokio::fs::try_exists(self.command.script()).await.unwrap_or(false) {
            run.advance(RunState::StartFailed);
            tracing::error!("Analyzer script not found: {}", self.command.script().display());
            return Err(ProcessError::start_failure(
                run.command(),
                format!("analyzer script not found: {}", self.command.script().display()),
            ));
        }

        let mut child = match self.spawn(&run) {
            Ok(child) => child,
            Err(e) => {
                run.advance(RunState::StartFailed);
                tracing::error!("Failed to start analyzer `{}`: {}", run.command(), e);
                return Err(ProcessError::start_failure(run.command(), e.to_string()));
            }
        };
        run.advance(RunState::Running);
        tracing::info!(
            "Analyzer started (pid {:?}) for {} with {}ms budget",
            child.id(),
            dataset.display(),
            timeout.as_millis()
        );

        let readers = [
            run.stdout.spawn_drain(child.stdout.take()),
            run.stderr.spawn_drain(child.stderr.take()),
        ];

        match tokio::time::timeout(timeout, child.wait()).await {
            Err(_) => {
                run.advance(RunState::TimedOut);
                let terminated = terminate(&mut child).await;
                settle(readers).await;
                tracing::error!(
                    "Analyzer timed out after {}ms (terminated: {})",
                    timeout.as_millis(),
                    terminated
                );
                Err(ProcessError::Timeout {
                    timeout,
                    terminated,
                    stderr: run.stderr_text(),
                })
            }
            Ok(Err(e)) => {
                terminate(&mut child).await;
                run.advance(RunState::Exited(None));
                settle(readers).await;
                tracing::error!("Lost track of analyzer process: {}", e);
                Err(ProcessError::NonZeroExit {
                    code: None,
                    stderr: format!("{}\n{}", run.stderr_text(), e),
                    classification: ExitClassification::Unclassified,
                })
            }
            Ok(Ok(status)) => {
                run.advance(RunState::Exited(status.code()));
                settle(readers).await;
                tracing::debug!("Analyzer stdout:\n{}", run.stdout_text());

                if status.success() {
                    let info = run.exit_info(0);
                    tracing::info!(
                        "Analyzer exited cleanly in {}ms ({} bytes stdout, {} bytes stderr)",
                        info.elapsed.as_millis(),
                        info.stdout_len,
                        info.stderr_len
                    );
                    return Ok(info);
                }

                let stderr = run.stderr_text();
                let classification = classify_stderr(&stderr);
                tracing::warn!(
                    "Analyzer exited with {:?} ({}): {}",
                    status.code(),
                    classification.as_str(),
                    stderr.trim()
                );
                Err(ProcessError::NonZeroExit {
                    code: status.code(),
                    stderr,
                    classification,
                })
            }
        }
    }
}

/// Kill the child and reap it
///
/// Returns whether the child is known to be gone.
async fn terminate(child: &mut Child) -> bool {
    if let Err(e) = child.start_kill() {
        // Already exited; `wait` below still reaps it.
        tracing::debug!("Kill signal not delivered: {}", e);
    }
    match child.wait().await {
        Ok(status) => {
            tracing::debug!("Analyzer reaped with {}", status);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to reap analyzer: {}", e);
            false
        }
    }
}

/// Let drain tasks finish, aborting any that outlive the grace period
async fn settle(readers: [Option<JoinHandle<()>>; 2]) {
    for mut reader in readers.into_iter().flatten() {
        if tokio::time::timeout(OUTPUT_GRACE, &mut reader).await.is_err() {
            reader.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_script_is_start_failure() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = ProcessOrchestrator::new(AnalyzerCommand::new(
            "python",
            dir.path().join("absent.py"),
        ));

        let err = orchestrator
            .run(Path::new("in.csv"), &dir.path().join("out.png"), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::StartFailure { .. }));
        assert!(err.to_string().contains("absent.py"));
    }

    #[tokio::test]
    async fn missing_interpreter_is_start_failure() {
        let script = tempfile::NamedTempFile::new().unwrap();
        let orchestrator = ProcessOrchestrator::new(AnalyzerCommand::new(
            "/definitely/not/an/interpreter",
            script.path(),
        ));

        let err = orchestrator
            .run(Path::new("in.csv"), Path::new("out.png"), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::StartFailure { .. }));
    }
}
