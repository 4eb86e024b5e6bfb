//! SHA-256 hashing utilities
//!
//! Provides file hashing using buffered I/O with hardware acceleration
//! where the platform offers it. The async entry points use
//! `spawn_blocking` so CPU-intensive hashing never blocks tokio's async
//! worker threads. Hash-upload workers use these to derive the content
//! reference a server can match against files it already holds.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::HASH_BUFFER_SIZE;

/// Compute SHA-256 hash of an entire file
///
/// Runs on a blocking thread pool to avoid blocking async workers.
pub async fn compute_sha256(path: &Path) -> io::Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || compute_sha256_sync(&path))
        .await
        .map_err(|e| io::Error::other(format!("hash task failed: {e}")))?
}

/// Compute SHA-256 hash of the first `max_bytes` of a file
///
/// Used for resume verification. If the file is smaller than `max_bytes`,
/// hashes the entire file.
///
/// Runs on a blocking thread pool to avoid blocking async workers.
pub async fn compute_partial_sha256(path: &Path, max_bytes: u64) -> io::Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || compute_partial_sha256_sync(&path, max_bytes))
        .await
        .map_err(|e| io::Error::other(format!("hash task failed: {e}")))?
}

/// Compute SHA-256 hash of a byte range of a file
///
/// Used by upload workers to hash a single part before sending it.
pub async fn compute_range_sha256(path: &Path, offset: u64, len: u64) -> io::Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut file = File::open(&path)?;
        file.seek(SeekFrom::Start(offset))?;
        hash_reader(&mut file.take(len))
    })
    .await
    .map_err(|e| io::Error::other(format!("hash task failed: {e}")))?
}

/// Synchronous whole-file hash
pub fn compute_sha256_sync(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    hash_reader(&mut file)
}

/// Synchronous prefix hash
pub fn compute_partial_sha256_sync(path: &Path, max_bytes: u64) -> io::Result<String> {
    let file = File::open(path)?;
    hash_reader(&mut file.take(max_bytes))
}

fn hash_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
