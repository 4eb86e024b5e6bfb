//! File location types for transfers
//!
//! Locations describe where file bytes live on either side of a transfer:
//! on the local disk (empty, partially written, or complete) and on the
//! remote side (a web resource or a file on a specific storage
//! destination). Workers mutate locations as a transfer progresses; the
//! coordinator only routes them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Destinations
// =============================================================================

/// Identifier of a remote storage destination (server cluster)
///
/// Download traffic is throttled per destination, so the destination id is
/// part of the admission-pool partition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DestinationId(u32);

impl DestinationId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner id value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DestinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Remote Locations
// =============================================================================

/// Location of a file on the remote side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteFileLocation {
    /// A plain web resource, fetched through the fixed web destination
    Web { url: String },
    /// A file stored on an explicit destination
    Server {
        destination: DestinationId,
        file_id: u64,
    },
}

impl RemoteFileLocation {
    /// Returns true if this is a web resource
    pub fn is_web(&self) -> bool {
        matches!(self, RemoteFileLocation::Web { .. })
    }

    /// The explicit destination, if the location carries one
    pub fn destination(&self) -> Option<DestinationId> {
        match self {
            RemoteFileLocation::Web { .. } => None,
            RemoteFileLocation::Server { destination, .. } => Some(*destination),
        }
    }
}

/// Fully-resolved remote reference for a completed upload
///
/// Produced by hash-uploads (the server already held the content) and by
/// uploads once the remote side has acknowledged every part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullRemoteFileLocation {
    pub location: RemoteFileLocation,
    pub size: u64,
}

/// Remote state of an in-flight upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRemoteFileLocation {
    /// Size of each uploaded part in bytes
    pub part_size: u32,
    /// Number of parts the remote side has acknowledged
    pub ready_parts: u32,
}

impl PartialRemoteFileLocation {
    /// Bytes the remote side has acknowledged so far
    pub fn ready_bytes(&self) -> u64 {
        u64::from(self.part_size) * u64::from(self.ready_parts)
    }
}

// =============================================================================
// Local Locations
// =============================================================================

/// A complete file on the local disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullLocalFileLocation {
    pub path: PathBuf,
    pub size: u64,
}

/// A partially-written file on the local disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialLocalFileLocation {
    pub path: PathBuf,
    /// Bytes written and verified so far
    pub ready_bytes: u64,
}

/// Local state of a file involved in a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalFileLocation {
    /// Nothing on disk yet
    Empty,
    /// Download in progress, prefix written
    Partial(PartialLocalFileLocation),
    /// Complete file
    Full(FullLocalFileLocation),
}

impl LocalFileLocation {
    /// Returns true if a complete local copy exists
    pub fn is_full(&self) -> bool {
        matches!(self, LocalFileLocation::Full(_))
    }

    /// The on-disk path, if any bytes exist yet
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            LocalFileLocation::Empty => None,
            LocalFileLocation::Partial(partial) => Some(&partial.path),
            LocalFileLocation::Full(full) => Some(&full.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_display() {
        let dest = DestinationId::new(4);
        assert_eq!(format!("{dest}"), "4");
        assert_eq!(dest.as_u32(), 4);
    }

    #[test]
    fn test_remote_location_web() {
        let loc = RemoteFileLocation::Web {
            url: "https://example.com/file.bin".to_string(),
        };
        assert!(loc.is_web());
        assert_eq!(loc.destination(), None);
    }

    #[test]
    fn test_remote_location_server() {
        let loc = RemoteFileLocation::Server {
            destination: DestinationId::new(2),
            file_id: 99,
        };
        assert!(!loc.is_web());
        assert_eq!(loc.destination(), Some(DestinationId::new(2)));
    }

    #[test]
    fn test_partial_remote_ready_bytes() {
        let partial = PartialRemoteFileLocation {
            part_size: 512 * 1024,
            ready_parts: 3,
        };
        assert_eq!(partial.ready_bytes(), 3 * 512 * 1024);

        // Large part counts must not overflow u32 math
        let big = PartialRemoteFileLocation {
            part_size: u32::MAX,
            ready_parts: u32::MAX,
        };
        assert_eq!(big.ready_bytes(), u64::from(u32::MAX) * u64::from(u32::MAX));
    }

    #[test]
    fn test_local_location_path() {
        assert_eq!(LocalFileLocation::Empty.path(), None);

        let partial = LocalFileLocation::Partial(PartialLocalFileLocation {
            path: PathBuf::from("/tmp/file.part"),
            ready_bytes: 100,
        });
        assert_eq!(partial.path(), Some(&PathBuf::from("/tmp/file.part")));
        assert!(!partial.is_full());

        let full = LocalFileLocation::Full(FullLocalFileLocation {
            path: PathBuf::from("/tmp/file"),
            size: 200,
        });
        assert_eq!(full.path(), Some(&PathBuf::from("/tmp/file")));
        assert!(full.is_full());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let loc = LocalFileLocation::Partial(PartialLocalFileLocation {
            path: PathBuf::from("/tmp/video.part"),
            ready_bytes: 4096,
        });

        let json = serde_json::to_string(&loc).expect("serialize");
        let deserialized: LocalFileLocation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(loc, deserialized);

        let remote = RemoteFileLocation::Server {
            destination: DestinationId::new(7),
            file_id: 12345,
        };
        let json = serde_json::to_string(&remote).expect("serialize");
        let deserialized: RemoteFileLocation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(remote, deserialized);
    }
}
