#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Correspondence configuration.
pub mod config;

/// Error types for batch runs.
pub mod error;

/// The per-file decode, transform and write pipeline.
pub mod pipeline;

/// Application of a rigid transform to decoded points.
pub mod transform;

/// Discovery of input files.
pub mod walker;

pub use config::CorrespondenceSet;
pub use error::{BatchError, FileError};
pub use pipeline::{run_batch, BatchPipeline, BatchReport, FileFailure, FileStage};
pub use transform::{apply_transform, transform_points, SpatialFields, TransformError};
pub use walker::{SourceWalker, WalkEntry, WalkdirWalker};
