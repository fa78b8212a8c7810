use crate::header::PcdEncoding;

/// Error types for the PCD codec.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PcdError {
    /// Failed to read or write PCD data
    #[error("Failed to read PCD data. {0}")]
    Io(#[from] std::io::Error),

    /// Malformed PCD header
    #[error("Malformed PCD header: {0}")]
    MalformedHeader(String),

    /// The data section is not stored in the fixed-layout binary encoding
    #[error("Unsupported PCD data encoding: {0}")]
    UnsupportedEncoding(PcdEncoding),

    /// The `(TYPE, SIZE)` pair of a field has no scalar representation
    #[error("Unknown PCD type encoding: TYPE {type_tag} with SIZE {byte_size}")]
    UnknownTypeEncoding {
        /// The declared type tag.
        type_tag: char,
        /// The declared byte size.
        byte_size: usize,
    },

    /// The data section holds fewer bytes than the header declares
    #[error("Truncated PCD data section: expected {expected} bytes, got {actual}")]
    TruncatedData {
        /// Number of bytes required by the header.
        expected: usize,
        /// Number of bytes available.
        actual: usize,
    },

    /// A point does not match the record layout it is encoded with
    #[error("Point does not match the record layout: {0}")]
    RecordMismatch(String),
}
