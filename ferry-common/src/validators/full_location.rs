//! Full local location validation
//!
//! A full location claims a complete file exists on disk. Validation
//! confirms the claim against filesystem metadata and returns the location
//! with the actual on-disk size filled in, so callers can trust the size
//! field afterwards.

use std::fs;

use crate::location::FullLocalFileLocation;

use super::LocationError;

/// Validate a claimed complete local file
///
/// Checks:
/// - the path exists and is a regular file
/// - the file is not empty
/// - unless `skip_size_checks`, the on-disk size matches the recorded size
///
/// Returns the location with `size` set to the actual on-disk size.
///
/// # Errors
///
/// Returns a `LocationError` variant describing the validation failure.
pub fn validate_full_location(
    location: &FullLocalFileLocation,
    skip_size_checks: bool,
) -> Result<FullLocalFileLocation, LocationError> {
    let display = location.path.display().to_string();

    let metadata = fs::metadata(&location.path).map_err(|_| LocationError::NotFound(display.clone()))?;

    if !metadata.is_file() {
        return Err(LocationError::NotAFile(display));
    }

    let actual = metadata.len();
    if actual == 0 {
        return Err(LocationError::Empty(display));
    }

    if !skip_size_checks && location.size != 0 && location.size != actual {
        return Err(LocationError::SizeMismatch {
            path: display,
            expected: location.size,
            actual,
        });
    }

    Ok(FullLocalFileLocation {
        path: location.path.clone(),
        size: actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn location(path: PathBuf, size: u64) -> FullLocalFileLocation {
        FullLocalFileLocation { path, size }
    }

    #[test]
    fn test_valid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.bin");
        fs::write(&path, vec![0u8; 1024]).expect("write");

        let validated = validate_full_location(&location(path.clone(), 1024), false).expect("valid");
        assert_eq!(validated.size, 1024);
        assert_eq!(validated.path, path);
    }

    #[test]
    fn test_unknown_size_is_filled_in() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.bin");
        fs::write(&path, b"hello").expect("write");

        // A recorded size of 0 means "unknown" and is accepted
        let validated = validate_full_location(&location(path, 0), false).expect("valid");
        assert_eq!(validated.size, 5);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.bin");

        let result = validate_full_location(&location(path, 10), false);
        assert!(matches!(result, Err(LocationError::NotFound(_))));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");

        let result = validate_full_location(&location(dir.path().to_path_buf(), 0), false);
        assert!(matches!(result, Err(LocationError::NotAFile(_))));
    }

    #[test]
    fn test_empty_file_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").expect("write");

        let result = validate_full_location(&location(path, 0), false);
        assert!(matches!(result, Err(LocationError::Empty(_))));
    }

    #[test]
    fn test_size_mismatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.bin");
        fs::write(&path, vec![0u8; 100]).expect("write");

        let result = validate_full_location(&location(path.clone(), 200), false);
        assert_eq!(
            result,
            Err(LocationError::SizeMismatch {
                path: path.display().to_string(),
                expected: 200,
                actual: 100,
            })
        );

        // Same mismatch passes when size checks are skipped; actual size wins
        let validated = validate_full_location(&location(path, 200), true).expect("valid");
        assert_eq!(validated.size, 100);
    }
}
