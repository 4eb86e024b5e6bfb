//! Transfer coordination
//!
//! This module turns submission calls into independently-running workers
//! and relays their lifecycle events back to the embedding application.
//!
//! **Submission flow:**
//! 1. Caller: `TransferManager::download/upload/upload_by_hash/from_bytes`
//! 2. Coordinator: allocate a task, spawn the worker with an [`EventSink`]
//!    bound to the task's handle
//! 3. Coordinator: resolve the admission pool for the partition key
//!    (downloads: size class + destination; uploads: one shared pool) and
//!    register the worker at the caller's priority
//!
//! **Event flow:**
//! 1. Worker: emits progress/terminal events through its sink, each tagged
//!    with the task handle
//! 2. Coordinator: resolves the handle (stale handles drop the event
//!    silently) and forwards to the [`TransferConsumer`] keyed by the
//!    original request id
//! 3. Coordinator: on a terminal event, destroys the task; once shutdown
//!    has been requested and the last task drains, the coordinator
//!    finalizes

mod consumer;
mod coordinator;
mod pool;
mod registry;
mod types;
mod worker;

pub use consumer::TransferConsumer;
pub use coordinator::{TransferCoordinator, TransferManager};
pub use pool::{AdmissionPool, FairnessMode, PoolFactory, PoolKey};
pub use types::{
    BytesImportParams, DEFAULT_DOWNLOAD_RATE_CEILING, DownloadParams, ELEVATED_TIER_RATE_MULTIPLIER,
    HashUploadParams, Priority, RequestId, TaskHandle, TransferConfig, UPLOAD_RATE_CEILING,
    UploadParams,
};
pub use worker::{EventSink, WorkerCommand, WorkerEvent, WorkerHandle, WorkerRef, WorkerSpawner};

pub(crate) use coordinator::CoordinatorMessage;
