//! Machine-readable error kinds for transfer failures
//!
//! Workers report failures as a `WorkerError`, which is forwarded to the
//! outer consumer as the terminal notification for the affected request.
//! Kinds are serialized to strings so consumers can make decisions based on
//! the failure class (e.g. offering a retry only for network errors).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Failure classes a worker can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerErrorKind {
    /// Network failure (connection lost, timeout)
    Network,
    /// Local file I/O failure
    Io,
    /// Content hash did not match after transfer
    HashMismatch,
    /// Unexpected or malformed data from the remote side
    Protocol,
    /// Transfer was canceled before completion
    Canceled,
    /// Unclassified failure
    Unknown,
}

impl WorkerErrorKind {
    /// Convert to the string representation used in serialized messages
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Io => "io",
            Self::HashMismatch => "hash_mismatch",
            Self::Protocol => "protocol",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "network" => Some(Self::Network),
            "io" => Some(Self::Io),
            "hash_mismatch" => Some(Self::HashMismatch),
            "protocol" => Some(Self::Protocol),
            "canceled" => Some(Self::Canceled),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for WorkerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by a worker, or synthesized by the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerError {
    pub kind: WorkerErrorKind,
    pub message: String,
}

impl WorkerError {
    pub fn new(kind: WorkerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The status synthesized for canceled transfers and worker hang-ups
    pub fn canceled() -> Self {
        Self::new(WorkerErrorKind::Canceled, "Canceled")
    }

    /// Returns true if this failure is a cancellation
    pub fn is_canceled(&self) -> bool {
        self.kind == WorkerErrorKind::Canceled
    }
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
