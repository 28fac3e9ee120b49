//! Dataset handling for the analysis pipeline
//!
//! Everything the pipeline needs to know about an uploaded tabular file
//! before spending process-launch or model cost on it:
//! - `DatasetHandle` - read-only reference to the uploaded file
//! - `DatasetValidator` - cheap existence/size/delimiter checks
//! - `sample_rows` - bounded, header-keyed row sample for prompts
//!
//! # Example
//!
//! ```rust,ignore
//! use sba_dataset::{DatasetHandle, DatasetValidator};
//!
//! # async fn example() -> Result<(), sba_dataset::DatasetError> {
//! let handle = DatasetHandle::new("uploads/sales.csv");
//! let validated = DatasetValidator::default().validate(&handle).await?;
//! let sample = sba_dataset::sample_rows(&validated, 100).await?;
//! println!("{} rows sampled", sample.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod handle;
pub mod sample;
pub mod validator;

pub use error::DatasetError;
pub use handle::{DatasetHandle, ValidatedDataset, DEFAULT_DELIMITER};
pub use sample::{sample_rows, DatasetSample};
pub use validator::{DatasetValidator, DEFAULT_PROBE_BYTES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
