//! Ferry Client Library
//!
//! Coordination layer of the client-side file transfer subsystem. The
//! [`transfers::TransferCoordinator`] accepts download, upload, hash-upload
//! and byte-import requests, runs one independent worker per request under
//! admission control, and relays each worker's lifecycle events back to a
//! single [`transfers::TransferConsumer`] keyed by the caller's request id.
//!
//! Plain filesystem operations that need no coordination live in [`files`].

pub mod files;
pub mod transfers;

pub use transfers::{
    AdmissionPool, BytesImportParams, DownloadParams, EventSink, FairnessMode, HashUploadParams,
    PoolFactory, PoolKey, Priority, RequestId, TaskHandle, TransferConfig, TransferConsumer,
    TransferCoordinator, TransferManager, UploadParams, WorkerCommand, WorkerEvent, WorkerHandle,
    WorkerRef, WorkerSpawner,
};
