//! Statistical analyzer orchestration
//!
//! Launches one analyzer subprocess per call and supervises it:
//! - stdout/stderr drained concurrently into in-memory buffers
//! - hard wall-clock timeout with forced termination
//! - start failures kept apart from post-launch non-zero exits
//! - best-effort classification of stderr for user-facing messages
//!
//! Artifacts written by the analyzer are not read here; see `sba-artifact`.
//!
//! # Example
//!
//! ```rust,ignore
//! use sba_process::{AnalyzerCommand, ProcessOrchestrator, StatisticalRunner};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), sba_process::ProcessError> {
//! let orchestrator = ProcessOrchestrator::new(AnalyzerCommand::new("python", "analyzer.py"));
//! let exit = orchestrator
//!     .run("sales.csv".as_ref(), "out/matrix.png".as_ref(), Duration::from_secs(60))
//!     .await?;
//! println!("analyzer finished in {:?}", exit.elapsed);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod classify;
pub mod command;
pub mod error;
pub mod orchestrator;
pub mod run;

pub use classify::{classify_stderr, ExitClassification};
pub use command::AnalyzerCommand;
pub use error::ProcessError;
pub use orchestrator::{ProcessOrchestrator, StatisticalRunner, DEFAULT_TIMEOUT};
pub use run::{ExitInfo, RunState, SubprocessRun};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
