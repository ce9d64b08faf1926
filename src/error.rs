//! Error handling for the sidecarrier library.
//!
//! The bit-level decoding path never fails: corrupted input shows up as
//! data-model flags, not errors. [`Error`] covers the capture-file
//! surfaces, where malformed lines and I/O problems are real errors.

use thiserror::Error;

/// A specialized Result type for sidecarrier operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading a capture.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A capture line that is not four hex words.
    #[error("malformed capture line: {0:?}")]
    MalformedLine(String),
}
