use std::path::PathBuf;

use geopcd_io::PcdError;
use geopcd_linalg::RigidError;

use crate::transform::TransformError;

/// Errors that abort a whole batch run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BatchError {
    /// No valid transform could be estimated from the correspondences.
    #[error("Failed to estimate the rigid transform. {0}")]
    Rigid(#[from] RigidError),

    /// The input root does not exist or is not a directory.
    #[error("Input root is not a directory: {0}")]
    InputRootNotFound(PathBuf),

    /// Failed to read the correspondence configuration.
    #[error("Failed to read the correspondence configuration. {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The correspondence configuration is not valid JSON for a correspondence set.
    #[error("Invalid correspondence configuration. {0}")]
    Config(#[from] serde_json::Error),
}

/// The reason a single file failed; recorded in the report, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// Header, layout or data section error.
    #[error(transparent)]
    Pcd(#[from] PcdError),

    /// The records lack usable `x`, `y`, `z` fields.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Failed to read the input or write the output.
    #[error("I/O error. {0}")]
    Io(#[from] std::io::Error),
}
