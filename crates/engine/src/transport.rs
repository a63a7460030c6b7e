//! Transport seam.
//!
//! The engine does not implement the network primitives itself; it
//! configures and drives a [`Transport`]. For each dispatched task the
//! transport produces a finite event sequence — zero or more progress
//! events followed by exactly one of all-chunks-accepted, a server
//! response, or an error — delivered over an mpsc channel in the
//! order the transport observes them.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use uplift_protocol::{FinishChunksRequest, UploadResponse};
use uuid::Uuid;

use crate::EngineError;
use crate::intake::FileSource;

/// Everything the transport needs to send one file.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Local task identifier (not the transfer identifier the
    /// transport assigns to a chunked upload).
    pub task_id: Uuid,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub source: FileSource,
    /// Bearer token, attached as a `token` header when present.
    pub token: Option<String>,
    /// Album captured at dispatch. Attached as an `albumid` header for
    /// whole-file sends only; chunked sends carry it in the finish
    /// request instead.
    pub album: Option<i64>,
    /// Whether to split the file into chunks.
    pub chunked: bool,
    /// Chunk size in bytes.
    pub chunk_size: u64,
}

/// One event of a task's transfer sequence.
#[derive(Debug, Clone)]
pub enum TransferEvent {
    /// Raw byte-progress, as a percentage of the file.
    Progress { percent: f64 },
    /// Every chunk of a chunked task has been accepted by the server.
    AllChunksAccepted {
        transfer_id: String,
        chunk_count: u32,
    },
    /// Terminal server response of a whole-file send.
    Response(UploadResponse),
    /// Transport-level failure.
    Error(String),
}

/// Abstract upload transport.
///
/// `uplift-client` implements this over HTTPS; tests use scripted
/// mocks. Using a trait keeps the orchestration logic decoupled from
/// the wire and testable without a server.
pub trait Transport: Send + Sync {
    /// Begins sending a file. Events arrive on the returned channel in
    /// transport order; the channel closes after the terminal event.
    fn send_file(&self, request: DispatchRequest) -> mpsc::Receiver<TransferEvent>;

    /// Issues the chunk-completion handshake.
    fn finish_chunks(
        &self,
        request: &FinishChunksRequest,
    ) -> Pin<Box<dyn Future<Output = Result<UploadResponse, EngineError>> + Send + '_>>;
}
