//! The transfer coordinator
//!
//! One spawned task owns all coordination state and drains a single
//! mailbox: submissions and control calls arrive from [`TransferManager`]
//! handles, lifecycle events arrive from workers through their sinks, and
//! every message is processed to completion before the next. Nothing here
//! blocks and nothing is locked. Workers and pools run concurrently on
//! their own tasks and interact with the coordinator only through the
//! mailbox.
//!
//! Shutdown is cooperative: the coordinator asks every live worker to
//! stop, keeps draining terminal events (forwarding suppressed), and
//! finalizes once the last task is destroyed.

use ferry_common::WorkerError;
use ferry_common::location::{DestinationId, LocalFileLocation};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::consumer::TransferConsumer;
use super::pool::{FairnessMode, PoolFactory, PoolKey, PoolSet};
use super::registry::{RequestIndex, Task, TaskRegistry};
use super::types::{
    BytesImportParams, DownloadParams, HashUploadParams, Priority, RequestId, TaskHandle,
    TransferConfig, UploadParams,
};
use super::worker::{EventSink, WorkerEvent, WorkerSpawner};

// =============================================================================
// Mailbox
// =============================================================================

/// Everything the coordinator can be asked to do
#[derive(Debug)]
pub(crate) enum CoordinatorMessage {
    Download {
        request_id: RequestId,
        params: DownloadParams,
    },
    Upload {
        request_id: RequestId,
        params: UploadParams,
    },
    UploadByHash {
        request_id: RequestId,
        params: HashUploadParams,
    },
    FromBytes {
        request_id: RequestId,
        params: BytesImportParams,
    },
    UpdatePriority {
        request_id: RequestId,
        priority: Priority,
    },
    UpdateLocalFileLocation {
        request_id: RequestId,
        local: LocalFileLocation,
    },
    UpdateDownloadedPart {
        request_id: RequestId,
        offset: u64,
        limit: u64,
    },
    Cancel {
        request_id: RequestId,
    },
    WorkerEvent {
        handle: TaskHandle,
        event: WorkerEvent,
    },
    ActiveCount {
        reply: oneshot::Sender<usize>,
    },
    ActiveRequests {
        reply: oneshot::Sender<Vec<RequestId>>,
    },
    Shutdown,
}

// =============================================================================
// Caller Handle
// =============================================================================

/// Cloneable caller-side handle to a running coordinator
///
/// Every method is a non-blocking mailbox send. Calls made after the
/// coordinator finalized are dropped silently.
#[derive(Debug, Clone)]
pub struct TransferManager {
    tx: mpsc::UnboundedSender<CoordinatorMessage>,
}

impl TransferManager {
    fn send(&self, message: CoordinatorMessage) {
        let _ = self.tx.send(message);
    }

    /// Submit a download; `request_id` must not collide with an open request
    pub fn download(&self, request_id: RequestId, params: DownloadParams) {
        self.send(CoordinatorMessage::Download { request_id, params });
    }

    /// Submit an upload
    pub fn upload(&self, request_id: RequestId, params: UploadParams) {
        self.send(CoordinatorMessage::Upload { request_id, params });
    }

    /// Submit a hash-upload
    pub fn upload_by_hash(&self, request_id: RequestId, params: HashUploadParams) {
        self.send(CoordinatorMessage::UploadByHash { request_id, params });
    }

    /// Import an in-memory buffer as a local file
    pub fn from_bytes(&self, request_id: RequestId, params: BytesImportParams) {
        self.send(CoordinatorMessage::FromBytes { request_id, params });
    }

    /// Change a running transfer's priority; unknown ids are ignored
    pub fn update_priority(&self, request_id: RequestId, priority: Priority) {
        self.send(CoordinatorMessage::UpdatePriority {
            request_id,
            priority,
        });
    }

    /// Move a download's destination file; unknown ids are ignored
    pub fn update_local_file_location(&self, request_id: RequestId, local: LocalFileLocation) {
        self.send(CoordinatorMessage::UpdateLocalFileLocation { request_id, local });
    }

    /// Narrow a download to a new byte range; unknown ids are ignored
    pub fn update_downloaded_part(&self, request_id: RequestId, offset: u64, limit: u64) {
        self.send(CoordinatorMessage::UpdateDownloadedPart {
            request_id,
            offset,
            limit,
        });
    }

    /// Cancel a transfer
    ///
    /// A known id gets exactly one terminal `on_error` with a canceled
    /// status, even if the worker completes concurrently. Unknown ids are
    /// ignored.
    pub fn cancel(&self, request_id: RequestId) {
        self.send(CoordinatorMessage::Cancel { request_id });
    }

    /// Number of currently-open transfers
    pub async fn active_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorMessage::ActiveCount { reply });
        rx.await.unwrap_or(0)
    }

    /// Request ids of currently-open transfers
    pub async fn active_requests(&self) -> Vec<RequestId> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorMessage::ActiveRequests { reply });
        rx.await.unwrap_or_default()
    }

    /// Begin shutdown
    ///
    /// New submissions are ignored from the moment the message is
    /// processed; every live worker is asked to stop, and the coordinator
    /// finalizes once all of them have reported a terminal event.
    pub fn shutdown(&self) {
        self.send(CoordinatorMessage::Shutdown);
    }
}

// =============================================================================
// Coordinator
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Stopping,
}

/// Coordination core for one transfer subsystem instance
pub struct TransferCoordinator {
    state: State,
    registry: TaskRegistry,
    index: RequestIndex,
    pools: PoolSet,
    spawner: Box<dyn WorkerSpawner>,
    consumer: Box<dyn TransferConsumer>,
    /// Download ceiling with elevated-tier scaling applied, fixed at start
    download_ceiling: u64,
    web_destination: DestinationId,
    /// Kept so sinks for new workers can be minted
    tx: mpsc::UnboundedSender<CoordinatorMessage>,
    rx: mpsc::UnboundedReceiver<CoordinatorMessage>,
}

impl TransferCoordinator {
    /// Start a coordinator on the current runtime
    ///
    /// Returns the caller handle and the join handle of the coordinator
    /// task, which completes when shutdown finishes draining.
    pub fn spawn(
        config: TransferConfig,
        consumer: Box<dyn TransferConsumer>,
        spawner: Box<dyn WorkerSpawner>,
        pool_factory: Box<dyn PoolFactory>,
    ) -> (TransferManager, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let download_ceiling = config.effective_download_ceiling();
        let upload_mode = if config.persistent_uploads {
            FairnessMode::Baseline
        } else {
            FairnessMode::Greedy
        };

        let coordinator = Self {
            state: State::Running,
            registry: TaskRegistry::new(),
            index: RequestIndex::new(),
            pools: PoolSet::new(pool_factory, download_ceiling, upload_mode),
            spawner,
            consumer,
            download_ceiling,
            web_destination: config.web_destination,
            tx: tx.clone(),
            rx,
        };

        let join = tokio::spawn(coordinator.run());
        (TransferManager { tx }, join)
    }

    async fn run(mut self) {
        while let Some(message) = self.rx.recv().await {
            self.handle(message);
            // Shutdown check: finalize once stopping and fully drained
            if self.state == State::Stopping && self.registry.is_empty() {
                break;
            }
        }
        debug!("transfer coordinator finalized");
    }

    fn handle(&mut self, message: CoordinatorMessage) {
        match message {
            CoordinatorMessage::Download { request_id, params } => {
                self.submit_download(request_id, params);
            }
            CoordinatorMessage::Upload { request_id, params } => {
                self.submit_upload(request_id, params);
            }
            CoordinatorMessage::UploadByHash { request_id, params } => {
                self.submit_upload_by_hash(request_id, params);
            }
            CoordinatorMessage::FromBytes { request_id, params } => {
                self.submit_from_bytes(request_id, params);
            }
            CoordinatorMessage::UpdatePriority {
                request_id,
                priority,
            } => self.update_priority(request_id, priority),
            CoordinatorMessage::UpdateLocalFileLocation { request_id, local } => {
                self.update_local_file_location(request_id, local);
            }
            CoordinatorMessage::UpdateDownloadedPart {
                request_id,
                offset,
                limit,
            } => self.update_downloaded_part(request_id, offset, limit),
            CoordinatorMessage::Cancel { request_id } => self.cancel(request_id),
            CoordinatorMessage::WorkerEvent { handle, event } => {
                self.on_worker_event(handle, event);
            }
            CoordinatorMessage::ActiveCount { reply } => {
                let _ = reply.send(self.registry.len());
            }
            CoordinatorMessage::ActiveRequests { reply } => {
                let _ = reply.send(self.index.request_ids());
            }
            CoordinatorMessage::Shutdown => self.on_shutdown(),
        }
    }

    fn stopping(&self) -> bool {
        self.state == State::Stopping
    }

    // -------------------------------------------------------------------------
    // Submissions
    // -------------------------------------------------------------------------

    fn submit_download(&mut self, request_id: RequestId, params: DownloadParams) {
        if self.stopping() {
            debug!(%request_id, "download ignored, coordinator stopping");
            return;
        }

        let small = params.is_small();
        let destination = params.remote.destination().unwrap_or(self.web_destination);
        let priority = params.priority;

        let handle = self.registry.create_with(|handle| {
            let sink = EventSink::new(handle, self.tx.clone());
            Task {
                request_id,
                worker: self.spawner.spawn_downloader(params, sink),
            }
        });

        let pool = self.pools.get_or_create(PoolKey::Download { small, destination });
        if let Some(task) = self.registry.get(handle) {
            pool.register_worker(task.worker.pool_ref(), priority);
        }

        self.index.insert(request_id, handle);
        debug!(%request_id, small, %destination, "download submitted");
    }

    fn submit_upload(&mut self, request_id: RequestId, params: UploadParams) {
        if self.stopping() {
            debug!(%request_id, "upload ignored, coordinator stopping");
            return;
        }

        let priority = params.priority;
        let handle = self.registry.create_with(|handle| {
            let sink = EventSink::new(handle, self.tx.clone());
            Task {
                request_id,
                worker: self.spawner.spawn_uploader(params, sink),
            }
        });

        let pool = self.pools.get_or_create(PoolKey::Upload);
        if let Some(task) = self.registry.get(handle) {
            pool.register_worker(task.worker.pool_ref(), priority);
        }

        self.index.insert(request_id, handle);
        debug!(%request_id, "upload submitted");
    }

    fn submit_upload_by_hash(&mut self, request_id: RequestId, params: HashUploadParams) {
        if self.stopping() {
            debug!(%request_id, "hash-upload ignored, coordinator stopping");
            return;
        }

        let priority = params.priority;
        let handle = self.registry.create_with(|handle| {
            let sink = EventSink::new(handle, self.tx.clone());
            Task {
                request_id,
                worker: self.spawner.spawn_hash_uploader(params, sink),
            }
        });

        let pool = self.pools.get_or_create(PoolKey::Upload);
        if let Some(task) = self.registry.get(handle) {
            pool.register_worker(task.worker.pool_ref(), priority);
        }

        self.index.insert(request_id, handle);
        debug!(%request_id, "hash-upload submitted");
    }

    fn submit_from_bytes(&mut self, request_id: RequestId, params: BytesImportParams) {
        if self.stopping() {
            debug!(%request_id, "byte import ignored, coordinator stopping");
            return;
        }

        // No admission control: nothing crosses the network
        let handle = self.registry.create_with(|handle| {
            let sink = EventSink::new(handle, self.tx.clone());
            Task {
                request_id,
                worker: self.spawner.spawn_bytes_importer(params, sink),
            }
        });

        self.index.insert(request_id, handle);
        debug!(%request_id, "byte import submitted");
    }

    // -------------------------------------------------------------------------
    // Control operations
    // -------------------------------------------------------------------------

    fn update_priority(&mut self, request_id: RequestId, priority: Priority) {
        if self.stopping() {
            return;
        }
        let Some(handle) = self.index.get(request_id) else {
            return;
        };
        let Some(task) = self.registry.get(handle) else {
            return;
        };
        task.worker.update_priority(priority);
    }

    fn update_local_file_location(&mut self, request_id: RequestId, local: LocalFileLocation) {
        if self.stopping() {
            return;
        }
        let Some(handle) = self.index.get(request_id) else {
            return;
        };
        let Some(task) = self.registry.get(handle) else {
            return;
        };
        task.worker.update_local_file_location(local);
    }

    fn update_downloaded_part(&mut self, request_id: RequestId, offset: u64, limit: u64) {
        if self.stopping() {
            return;
        }
        let Some(handle) = self.index.get(request_id) else {
            return;
        };
        let Some(task) = self.registry.get(handle) else {
            return;
        };
        task.worker
            .update_downloaded_part(offset, limit, self.download_ceiling);
    }

    fn cancel(&mut self, request_id: RequestId) {
        if self.stopping() {
            return;
        }
        let Some(handle) = self.index.get(request_id) else {
            debug!(%request_id, "cancel for unknown request ignored");
            return;
        };
        // Routed through the same terminal path as a genuine failure, so
        // the caller sees exactly one terminal notification even when a
        // worker event races this cancel
        self.finish_with_error(handle, WorkerError::canceled());
    }

    // -------------------------------------------------------------------------
    // Event relay
    // -------------------------------------------------------------------------

    fn on_worker_event(&mut self, handle: TaskHandle, event: WorkerEvent) {
        let Some(task) = self.registry.get(handle) else {
            // The task was closed by cancellation or shutdown while this
            // event was in flight; expected, not an error
            debug!(%handle, "event for closed task dropped");
            return;
        };
        let request_id = task.request_id;
        let forward = self.state == State::Running;
        let terminal = event.is_terminal();

        match event {
            WorkerEvent::Start => {
                if forward {
                    self.consumer.on_start_download(request_id);
                }
            }
            WorkerEvent::PartialDownload {
                local,
                ready_bytes,
                total_bytes,
            } => {
                if forward {
                    self.consumer
                        .on_partial_download(request_id, local, ready_bytes, total_bytes);
                }
            }
            WorkerEvent::HashComputed { hash } => {
                if forward {
                    self.consumer.on_hash(request_id, hash);
                }
            }
            WorkerEvent::PartialUpload { remote, ready_bytes } => {
                if forward {
                    self.consumer
                        .on_partial_upload(request_id, remote, ready_bytes);
                }
            }
            WorkerEvent::DownloadOk { local, size, is_new } => {
                if forward {
                    self.consumer.on_download_ok(request_id, local, size, is_new);
                }
            }
            WorkerEvent::UploadOk {
                file_type,
                remote,
                size,
            } => {
                if forward {
                    self.consumer.on_upload_ok(request_id, file_type, remote, size);
                }
            }
            WorkerEvent::UploadOkFull { remote } => {
                if forward {
                    self.consumer.on_upload_full_ok(request_id, remote);
                }
            }
            WorkerEvent::Error { error } => {
                if forward {
                    self.consumer.on_error(request_id, error);
                }
            }
            // A worker that observed cancellation reports like a canceled
            // failure
            WorkerEvent::HungUp => {
                if forward {
                    self.consumer.on_error(request_id, WorkerError::canceled());
                }
            }
        }

        if terminal {
            self.close_task(handle);
        }
    }

    /// Terminal-failure path shared by worker errors, hang-ups and
    /// synthesized cancellations
    fn finish_with_error(&mut self, handle: TaskHandle, error: WorkerError) {
        let Some(task) = self.registry.get(handle) else {
            return;
        };
        let request_id = task.request_id;
        if self.state == State::Running {
            self.consumer.on_error(request_id, error);
        }
        self.close_task(handle);
    }

    /// Destroy a task: request-index entry and registry entry go together,
    /// and the worker handle is released exactly once
    fn close_task(&mut self, handle: TaskHandle) {
        if let Some(task) = self.registry.erase(handle) {
            self.index.remove(task.request_id);
        }
    }

    // -------------------------------------------------------------------------
    // Shutdown
    // -------------------------------------------------------------------------

    fn on_shutdown(&mut self) {
        if self.stopping() {
            return;
        }
        self.state = State::Stopping;
        debug!(open = self.registry.len(), "shutdown requested");

        // Ask every live worker to stop. Each responds with HungUp through
        // its sink, which drives its task's destruction; the run loop
        // finalizes once the registry drains. An already-empty registry
        // finalizes immediately via the post-message check.
        self.registry.for_each(|_, task| task.worker.shutdown());
    }
}
