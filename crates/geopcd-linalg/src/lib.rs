#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Rigid alignment of corresponding point sets (Kabsch).
pub mod rigid;

/// Module to calculate SVD of a 3x3 matrix
pub mod svd;

pub use rigid::{estimate_rigid_transform, RigidError, RigidTransform};
