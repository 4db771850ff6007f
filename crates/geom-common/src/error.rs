//! Error types for geom-common.

use thiserror::Error;

/// Common error type for geom reading operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Missing null terminator in string.
    #[error("string starting at {offset:#x} is missing its null terminator")]
    MissingNullTerminator { offset: usize },

    /// Invalid hashcode text.
    #[error("invalid hashcode: {0}")]
    InvalidHashCode(String),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
