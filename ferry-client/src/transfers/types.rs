//! Identifiers, submission parameters and coordinator configuration

use ferry_common::SMALL_FILE_LIMIT;
use ferry_common::encryption::FileEncryptionKey;
use ferry_common::file_type::FileType;
use ferry_common::location::{
    DestinationId, FullLocalFileLocation, LocalFileLocation, PartialRemoteFileLocation,
    RemoteFileLocation,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Default per-process download byte-rate ceiling (2 MiB/s)
pub const DEFAULT_DOWNLOAD_RATE_CEILING: u64 = 1 << 21;

/// Fixed byte-rate ceiling shared by all uploads (4 MiB/s)
pub const UPLOAD_RATE_CEILING: u64 = 4 << 20;

/// Download ceiling multiplier for elevated-tier accounts
pub const ELEVATED_TIER_RATE_MULTIPLIER: u64 = 8;

// =============================================================================
// Identifiers
// =============================================================================

/// Caller-chosen identifier for a submitted transfer request
///
/// Must be unique among currently-open requests; reusing an id after its
/// request closed is allowed. All consumer notifications are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner id value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Coordinator-private stable identifier for a task
///
/// Issued by the task registry and copied into every event a worker sends
/// back, so the coordinator can correlate events without relying on worker
/// identity. Invalidated when the task is destroyed; a stale handle simply
/// fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling priority for a worker within its admission pool
///
/// Higher values run first; arbitration is the pool's concern.
pub type Priority = i8;

// =============================================================================
// Submission Parameters
// =============================================================================

/// Parameters for a download submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadParams {
    pub remote: RemoteFileLocation,
    pub local: LocalFileLocation,
    /// Expected size in bytes (0 if unknown); selects the size class
    pub size: u64,
    /// Display name for the downloaded file
    pub name: String,
    pub encryption_key: FileEncryptionKey,
    /// Search for an existing local copy before transferring
    pub search_file: bool,
    /// First byte the caller needs
    pub offset: u64,
    /// Number of bytes the caller needs (0 = to end of file)
    pub limit: u64,
    pub priority: Priority,
}

impl DownloadParams {
    /// Returns true if this download belongs to the small-file size class
    pub fn is_small(&self) -> bool {
        self.size < SMALL_FILE_LIMIT
    }
}

/// Parameters for an upload submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadParams {
    pub local: LocalFileLocation,
    /// Remote state from a previous attempt, for resume
    pub remote: Option<PartialRemoteFileLocation>,
    pub expected_size: u64,
    pub encryption_key: FileEncryptionKey,
    pub priority: Priority,
    /// Part indices that failed previously; the worker retries these first
    pub bad_parts: Vec<u32>,
}

/// Parameters for a hash-upload submission
///
/// Computes a content hash of a complete local file so the server can
/// resolve it against content it already holds, skipping the byte
/// transfer entirely when possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashUploadParams {
    pub local: FullLocalFileLocation,
    pub size: u64,
    pub priority: Priority,
}

/// Parameters for importing an in-memory buffer as a local file
///
/// No network transfer occurs, so byte imports bypass admission control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BytesImportParams {
    pub file_type: FileType,
    pub bytes: Vec<u8>,
    pub name: String,
}

// =============================================================================
// Configuration
// =============================================================================

/// Coordinator configuration, read once at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Base per-process download byte-rate ceiling
    pub download_rate_ceiling: u64,
    /// Elevated-tier accounts get the download ceiling permanently scaled
    pub elevated_tier: bool,
    /// Whether upload state persists across restarts; selects the upload
    /// pool fairness mode (persistent state shares bandwidth evenly,
    /// throwaway state drains as fast as possible)
    pub persistent_uploads: bool,
    /// Destination used for web resources, which carry no destination of
    /// their own
    pub web_destination: DestinationId,
}

impl TransferConfig {
    /// The download ceiling after the elevated-tier scaling is applied
    pub fn effective_download_ceiling(&self) -> u64 {
        if self.elevated_tier {
            self.download_rate_ceiling * ELEVATED_TIER_RATE_MULTIPLIER
        } else {
            self.download_rate_ceiling
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            download_rate_ceiling: DEFAULT_DOWNLOAD_RATE_CEILING,
            elevated_tier: false,
            persistent_uploads: true,
            web_destination: DestinationId::new(4),
        }
    }
}
