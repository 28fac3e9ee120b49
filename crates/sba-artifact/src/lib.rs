//! Statistical analyzer artifacts
//!
//! The analyzer writes two files per run: the rendered positioning matrix
//! and a JSON summary next to it. This crate locates both, checks the
//! summary carries its required fields, and turns the image into a data URI
//! so the pair can travel inside a JSON envelope.
//!
//! # Example
//!
//! ```rust,ignore
//! use sba_artifact::ArtifactReader;
//!
//! # async fn example() -> Result<(), sba_artifact::ArtifactError> {
//! let artifacts = ArtifactReader::new().read("out/positioning_matrix_01J.png".as_ref()).await?;
//! println!("stars: {:?}", artifacts.summary.count("star"));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod image;
pub mod reader;
pub mod summary;

pub use error::{ArtifactError, SummaryError};
pub use image::{mime_for, ImageArtifact};
pub use reader::{summary_path_for, ArtifactReader, MatrixArtifacts};
pub use summary::SummaryArtifact;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
