//! The worker boundary
//!
//! Workers execute one transfer each and are external to the coordinator:
//! a [`WorkerSpawner`] constructs them, a [`WorkerHandle`] commands them,
//! and an [`EventSink`] carries their lifecycle events back. The sink is
//! bound to the task's handle at spawn time and stamps it on every event,
//! so the coordinator dispatches purely on that correlation value, never
//! on worker identity, which may outlive the task it belonged to.

use ferry_common::WorkerError;
use ferry_common::file_type::FileType;
use ferry_common::location::{
    FullLocalFileLocation, FullRemoteFileLocation, LocalFileLocation, PartialLocalFileLocation,
    PartialRemoteFileLocation,
};
use tokio::sync::mpsc;

use super::CoordinatorMessage;
use super::types::{
    BytesImportParams, DownloadParams, HashUploadParams, Priority, TaskHandle, UploadParams,
};

// =============================================================================
// Events (worker -> coordinator)
// =============================================================================

/// Lifecycle event emitted by a worker
///
/// A worker emits at most one terminal event and nothing after it.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Transfer has started moving bytes
    Start,
    /// Download progress: a prefix of the file is on disk
    PartialDownload {
        local: PartialLocalFileLocation,
        ready_bytes: u64,
        total_bytes: u64,
    },
    /// Hash-upload computed the content hash
    HashComputed { hash: String },
    /// Upload progress: the remote side acknowledged more parts
    PartialUpload {
        remote: PartialRemoteFileLocation,
        ready_bytes: u64,
    },
    /// Download finished; `is_new` is false when an existing local copy
    /// was found and reused
    DownloadOk {
        local: FullLocalFileLocation,
        size: u64,
        is_new: bool,
    },
    /// Upload finished; the remote reference is still partial and the
    /// server will assemble it
    UploadOk {
        file_type: FileType,
        remote: PartialRemoteFileLocation,
        size: u64,
    },
    /// Upload finished with a fully-resolved remote reference
    UploadOkFull { remote: FullRemoteFileLocation },
    /// Transfer failed
    Error { error: WorkerError },
    /// Worker observed a cancellation signal and stopped
    HungUp,
}

impl WorkerEvent {
    /// Returns true if the worker sends no further events after this one
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkerEvent::DownloadOk { .. }
                | WorkerEvent::UploadOk { .. }
                | WorkerEvent::UploadOkFull { .. }
                | WorkerEvent::Error { .. }
                | WorkerEvent::HungUp
        )
    }
}

/// Correlation-tagged event channel from one worker to the coordinator
///
/// Handed to the worker at spawn time. Every emitted event carries the
/// task handle the sink was bound to; events sent after the coordinator
/// has gone away are dropped silently.
#[derive(Debug, Clone)]
pub struct EventSink {
    handle: TaskHandle,
    tx: mpsc::UnboundedSender<CoordinatorMessage>,
}

impl EventSink {
    pub(crate) fn new(handle: TaskHandle, tx: mpsc::UnboundedSender<CoordinatorMessage>) -> Self {
        Self { handle, tx }
    }

    /// Deliver an event to the coordinator, tagged with this sink's task
    pub fn emit(&self, event: WorkerEvent) {
        let _ = self.tx.send(CoordinatorMessage::WorkerEvent {
            handle: self.handle,
            event,
        });
    }
}

// =============================================================================
// Commands (coordinator -> worker)
// =============================================================================

/// Control message delivered to a running worker
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    UpdatePriority(Priority),
    /// Download only: the caller moved the destination file
    UpdateLocalFileLocation(LocalFileLocation),
    /// Download only: the caller needs a different byte range; carries the
    /// current download rate ceiling
    UpdateDownloadedPart {
        offset: u64,
        limit: u64,
        rate_ceiling: u64,
    },
    /// Stop work and emit `HungUp`
    Shutdown,
}

/// Cloneable reference to a worker's command channel
///
/// This is what admission pools hold for the workers registered with them.
/// Sends to a worker that already finished are silent no-ops.
#[derive(Debug, Clone)]
pub struct WorkerRef {
    tx: mpsc::UnboundedSender<WorkerCommand>,
}

impl WorkerRef {
    pub fn new(tx: mpsc::UnboundedSender<WorkerCommand>) -> Self {
        Self { tx }
    }

    pub fn send(&self, command: WorkerCommand) {
        let _ = self.tx.send(command);
    }
}

/// Exclusively-owned handle to a worker
///
/// Owned by the worker's task for the task's entire lifetime and released
/// exactly once, when the task is destroyed.
#[derive(Debug)]
pub struct WorkerHandle {
    worker: WorkerRef,
}

impl WorkerHandle {
    pub fn new(tx: mpsc::UnboundedSender<WorkerCommand>) -> Self {
        Self {
            worker: WorkerRef::new(tx),
        }
    }

    /// A shareable reference for admission-pool registration
    pub fn pool_ref(&self) -> WorkerRef {
        self.worker.clone()
    }

    pub fn update_priority(&self, priority: Priority) {
        self.worker.send(WorkerCommand::UpdatePriority(priority));
    }

    pub fn update_local_file_location(&self, local: LocalFileLocation) {
        self.worker.send(WorkerCommand::UpdateLocalFileLocation(local));
    }

    pub fn update_downloaded_part(&self, offset: u64, limit: u64, rate_ceiling: u64) {
        self.worker.send(WorkerCommand::UpdateDownloadedPart {
            offset,
            limit,
            rate_ceiling,
        });
    }

    /// Ask the worker to stop; it responds by emitting `HungUp` through
    /// its sink once it observes the signal
    pub fn shutdown(&self) {
        self.worker.send(WorkerCommand::Shutdown);
    }
}

// =============================================================================
// Spawning
// =============================================================================

/// Factory for the transfer workers
///
/// Implementations construct a worker for each submission variant, wire it
/// to the given sink, and return the command handle. Worker internals
/// (wire protocol, chunked retries, verification) are outside the
/// coordinator's scope.
pub trait WorkerSpawner: Send {
    fn spawn_downloader(&self, params: DownloadParams, sink: EventSink) -> WorkerHandle;
    fn spawn_uploader(&self, params: UploadParams, sink: EventSink) -> WorkerHandle;
    fn spawn_hash_uploader(&self, params: HashUploadParams, sink: EventSink) -> WorkerHandle;
    fn spawn_bytes_importer(&self, params: BytesImportParams, sink: EventSink) -> WorkerHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        assert!(!WorkerEvent::Start.is_terminal());
        assert!(
            !WorkerEvent::HashComputed {
                hash: "abc".to_string()
            }
            .is_terminal()
        );
        assert!(
            !WorkerEvent::PartialUpload {
                remote: PartialRemoteFileLocation {
                    part_size: 1024,
                    ready_parts: 1,
                },
                ready_bytes: 1024,
            }
            .is_terminal()
        );

        assert!(
            WorkerEvent::Error {
                error: WorkerError::canceled()
            }
            .is_terminal()
        );
        assert!(WorkerEvent::HungUp.is_terminal());
        assert!(
            WorkerEvent::DownloadOk {
                local: FullLocalFileLocation {
                    path: "/tmp/f".into(),
                    size: 1,
                },
                size: 1,
                is_new: true,
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_sink_tags_events_with_handle() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(TaskHandle::new(3), tx);

        sink.emit(WorkerEvent::Start);

        match rx.try_recv().expect("event delivered") {
            CoordinatorMessage::WorkerEvent { handle, event } => {
                assert_eq!(handle, TaskHandle::new(3));
                assert!(matches!(event, WorkerEvent::Start));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_sink_survives_closed_mailbox() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(TaskHandle::new(1), tx);
        drop(rx);

        // Must not panic: coordinator teardown races in-flight events
        sink.emit(WorkerEvent::HungUp);
    }

    #[test]
    fn test_commands_to_finished_worker_are_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = WorkerHandle::new(tx);
        drop(rx);

        handle.update_priority(3);
        handle.shutdown();
    }

    #[test]
    fn test_handle_commands_arrive_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = WorkerHandle::new(tx);

        handle.update_priority(7);
        handle.update_downloaded_part(100, 200, 4096);
        handle.shutdown();

        assert!(matches!(
            rx.try_recv().unwrap(),
            WorkerCommand::UpdatePriority(7)
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            WorkerCommand::UpdateDownloadedPart {
                offset: 100,
                limit: 200,
                rate_ceiling: 4096,
            }
        ));
        assert!(matches!(rx.try_recv().unwrap(), WorkerCommand::Shutdown));
    }
}
