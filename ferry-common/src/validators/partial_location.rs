//! Partial local location validation
//!
//! A partial location claims that a prefix of a file has been written to
//! disk. Validation confirms the file holds at least that prefix, so a
//! resumed transfer never re-reads bytes that were never written.

use std::fs;

use crate::location::PartialLocalFileLocation;

use super::LocationError;

/// Validate a claimed partially-written local file
///
/// Checks:
/// - the path exists and is a regular file
/// - the file holds at least `ready_bytes` bytes
///
/// # Errors
///
/// Returns a `LocationError` variant describing the validation failure.
pub fn validate_partial_location(location: &PartialLocalFileLocation) -> Result<(), LocationError> {
    let display = location.path.display().to_string();

    let metadata = fs::metadata(&location.path).map_err(|_| LocationError::NotFound(display.clone()))?;

    if !metadata.is_file() {
        return Err(LocationError::NotAFile(display));
    }

    let actual = metadata.len();
    if actual < location.ready_bytes {
        return Err(LocationError::TooShort {
            path: display,
            ready: location.ready_bytes,
            actual,
        });
    }

    Ok(())
}
