#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Encoding and decoding of point records.
pub mod codec;

/// Error types for the PCD codec.
pub mod error;

/// PCD header parsing and serialization.
pub mod header;

/// Record layout resolution.
pub mod layout;

/// Typed scalar values.
pub mod scalar;

pub use codec::{decode_points, encode_points, PcdPoint};
pub use error::PcdError;
pub use header::{
    parse_header, read_header, serialize_header, FieldDescriptor, PcdEncoding, PcdHeader,
};
pub use layout::{LayoutField, RecordLayout};
pub use scalar::{Scalar, ScalarType};
