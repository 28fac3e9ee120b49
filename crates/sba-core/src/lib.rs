//! Small-business analysis pipeline
//!
//! Takes an uploaded dataset and an analysis label, routes it to either the
//! statistical analyzer subprocess or the generative model, and returns one
//! uniform envelope:
//! - `AnalysisRequest` / `AnalyzerRoute` - what to run and where
//! - `AnalysisPipeline` - validation, dispatch, normalization
//! - `AnalysisEnvelope` - `{ok, kind, payload}` or `{ok, errorKind, message}`
//! - `PipelineConfig` - policy constants, TOML + environment overrides
//!
//! # Example
//!
//! ```rust,ignore
//! use sba_core::{AnalysisPipeline, AnalysisRequest, PipelineConfig};
//! use sba_dataset::DatasetHandle;
//!
//! # async fn example() -> Result<(), sba_core::ConfigError> {
//! let mut config = PipelineConfig::default();
//! config.apply_env()?;
//! let pipeline = AnalysisPipeline::from_config(&config);
//!
//! let request = AnalysisRequest::new(DatasetHandle::new("sales.csv"), "positioning_matrix");
//! let envelope = pipeline.analyze(&request).await;
//! println!("{}", envelope.to_json());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod request;

pub use config::{AnalyzerConfig, ConfigError, DatasetConfig, ModelConfig, PipelineConfig};
pub use envelope::{AnalysisEnvelope, AnalysisOutcome, AnalysisPayload};
pub use error::{ErrorKind, PipelineError};
pub use pipeline::AnalysisPipeline;
pub use request::{AnalysisRequest, AnalyzerRoute};

pub use sba_narrative::AnalysisKind;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
