//! Location validation functions
//!
//! Reusable validators for on-disk transfer locations. Workers use them
//! before touching a file; the coordinator exposes them to the embedding
//! application through its filesystem passthrough operations.

mod full_location;
mod partial_location;

pub use full_location::validate_full_location;
pub use partial_location::validate_partial_location;

use thiserror::Error;

/// Validation error for local file locations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("not a regular file: {0}")]
    NotAFile(String),
    #[error("file is empty: {0}")]
    Empty(String),
    #[error("size mismatch for {path}: expected {expected}, found {actual}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },
    #[error("partial file {path} holds {actual} bytes, needs at least {ready}")]
    TooShort { path: String, ready: u64, actual: u64 },
}
