//! The outer consumer interface
//!
//! The embedding application implements [`TransferConsumer`] to receive
//! relayed worker lifecycle notifications, each keyed by the request id
//! the caller chose at submission. The coordinator guarantees exactly one
//! terminal notification (`on_download_ok`/`on_upload_ok`/
//! `on_upload_full_ok`/`on_error`) per successfully submitted request,
//! unless shutdown suppresses forwarding.

use ferry_common::WorkerError;
use ferry_common::file_type::FileType;
use ferry_common::location::{
    FullLocalFileLocation, FullRemoteFileLocation, PartialLocalFileLocation,
    PartialRemoteFileLocation,
};

use super::types::RequestId;

/// Receiver of relayed transfer lifecycle notifications
///
/// Methods are invoked from the coordinator's own task, one at a time, in
/// the order events were processed. Implementations should hand work off
/// rather than block.
pub trait TransferConsumer: Send {
    /// A download started moving bytes
    fn on_start_download(&mut self, request_id: RequestId);

    /// A download wrote more bytes to disk
    fn on_partial_download(
        &mut self,
        request_id: RequestId,
        local: PartialLocalFileLocation,
        ready_bytes: u64,
        total_bytes: u64,
    );

    /// A hash-upload computed its content hash
    fn on_hash(&mut self, request_id: RequestId, hash: String);

    /// An upload got more parts acknowledged
    fn on_partial_upload(
        &mut self,
        request_id: RequestId,
        remote: PartialRemoteFileLocation,
        ready_bytes: u64,
    );

    /// Terminal: download finished
    fn on_download_ok(
        &mut self,
        request_id: RequestId,
        local: FullLocalFileLocation,
        size: u64,
        is_new: bool,
    );

    /// Terminal: upload finished with a partial remote reference
    fn on_upload_ok(
        &mut self,
        request_id: RequestId,
        file_type: FileType,
        remote: PartialRemoteFileLocation,
        size: u64,
    );

    /// Terminal: upload finished with a fully-resolved remote reference
    fn on_upload_full_ok(&mut self, request_id: RequestId, remote: FullRemoteFileLocation);

    /// Terminal: the transfer failed or was canceled
    fn on_error(&mut self, request_id: RequestId, error: WorkerError);
}
