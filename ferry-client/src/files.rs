//! Filesystem passthrough operations
//!
//! Plain wrappers the embedding application calls directly; none of them
//! touch coordinator state. Location checks delegate to the shared
//! validators so workers and callers agree on what a valid location is.

use std::io::{self, SeekFrom};
use std::path::Path;

use ferry_common::location::{FullLocalFileLocation, PartialLocalFileLocation};
use ferry_common::validators::{LocationError, validate_full_location, validate_partial_location};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Read an entire file into memory
pub async fn read_file_contents(path: &Path) -> io::Result<Vec<u8>> {
    tokio::fs::read(path).await
}

/// Read `count` bytes starting at `offset`
///
/// Returns fewer bytes if the range extends past the end of the file.
pub async fn read_file_range(path: &Path, offset: u64, count: u64) -> io::Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;

    let mut bytes = Vec::new();
    file.take(count).read_to_end(&mut bytes).await?;
    Ok(bytes)
}

/// Delete a file
pub async fn remove_file(path: &Path) -> io::Result<()> {
    tokio::fs::remove_file(path).await
}

/// Validate a claimed complete local file
///
/// Returns the location with the actual on-disk size filled in.
pub fn check_full_location(
    location: &FullLocalFileLocation,
    skip_size_checks: bool,
) -> Result<FullLocalFileLocation, LocationError> {
    validate_full_location(location, skip_size_checks)
}

/// Validate a claimed partially-written local file
pub fn check_partial_location(location: &PartialLocalFileLocation) -> Result<(), LocationError> {
    validate_partial_location(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_read_file_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.bin");
        tokio::fs::write(&path, b"hello world").await.expect("write");

        let bytes = read_file_contents(&path).await.expect("read");
        assert_eq!(bytes, b"hello world");
    }

    #[tokio::test]
    async fn test_read_file_contents_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = read_file_contents(&dir.path().join("missing")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_file_range() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.bin");
        tokio::fs::write(&path, b"0123456789").await.expect("write");

        let bytes = read_file_range(&path, 2, 5).await.expect("read");
        assert_eq!(bytes, b"23456");

        // Range past EOF returns the available suffix
        let bytes = read_file_range(&path, 8, 100).await.expect("read");
        assert_eq!(bytes, b"89");

        // Offset past EOF returns nothing
        let bytes = read_file_range(&path, 50, 10).await.expect("read");
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_remove_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doomed.bin");
        tokio::fs::write(&path, b"x").await.expect("write");

        remove_file(&path).await.expect("remove");
        assert!(!path.exists());

        // Removing again fails and reports it
        assert!(remove_file(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_check_full_location() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("file.bin");
        tokio::fs::write(&path, vec![1u8; 64]).await.expect("write");

        let checked = check_full_location(
            &FullLocalFileLocation {
                path: path.clone(),
                size: 64,
            },
            false,
        )
        .expect("valid");
        assert_eq!(checked.size, 64);

        let result = check_full_location(
            &FullLocalFileLocation { path, size: 65 },
            false,
        );
        assert!(matches!(result, Err(LocationError::SizeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_check_partial_location() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("file.part");
        tokio::fs::write(&path, vec![1u8; 32]).await.expect("write");

        assert!(
            check_partial_location(&PartialLocalFileLocation {
                path: path.clone(),
                ready_bytes: 32,
            })
            .is_ok()
        );
        assert!(
            check_partial_location(&PartialLocalFileLocation {
                path,
                ready_bytes: 33,
            })
            .is_err()
        );
        assert!(
            check_partial_location(&PartialLocalFileLocation {
                path: PathBuf::from("/nonexistent/file.part"),
                ready_bytes: 0,
            })
            .is_err()
        );
    }
}
