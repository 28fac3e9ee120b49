//! Narrative strategy generation
//!
//! Turns a bounded dataset sample into a strategy write-up by prompting a
//! generative model:
//! - `AnalysisKind` - the four supported analyses and their prompt templates
//! - `ModelClient` - seam over the model; `GeminiClient` is the HTTP backend
//! - `decode_reply` - tolerant extraction of JSON from free-form replies
//! - `NarrativeGenerator` - prompt, call, decode, degrade
//!
//! An unreadable reply is not an error: it becomes a degraded payload that
//! still carries the raw text.
//!
//! # Example
//!
//! ```rust,ignore
//! use sba_narrative::{AnalysisKind, GeminiClient, GeminiConfig, NarrativeGenerator};
//! use std::sync::Arc;
//!
//! # async fn example(sample: sba_dataset::DatasetSample) -> Result<(), sba_narrative::NarrativeError> {
//! let client = GeminiClient::new(GeminiConfig::default().with_api_key("..."));
//! let generator = NarrativeGenerator::new(Arc::new(client));
//! let result = generator.generate(&sample, AnalysisKind::NicheMarket).await?;
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod decode;
pub mod error;
pub mod generator;
pub mod kind;
pub mod params;
pub mod prompt;
pub mod result;

pub use client::{GeminiClient, GeminiConfig, ModelClient, DEFAULT_GEMINI_MODEL};
pub use decode::{decode_reply, DecodeOutcome};
pub use error::{ModelError, NarrativeError, ParseKindError};
pub use generator::{NarrativeGenerator, DEFAULT_SAMPLE_CAP};
pub use kind::AnalysisKind;
pub use params::GenerationParams;
pub use prompt::render_prompt;
pub use result::{NarrativeResult, DEGRADED_SUMMARY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
