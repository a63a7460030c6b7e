//! Chunked completion coordinator.
//!
//! Once the transport reports every chunk accepted, the task enters
//! `AwaitingFinish` and exactly one completion handshake is issued —
//! the `chunks_accepted` transition fires at most once per task, so
//! the handshake cannot be repeated no matter how many progress events
//! preceded it.

use tracing::debug;
use uplift_protocol::{ChunkedFileDescriptor, FinishChunksRequest};

use crate::task::FileTask;
use crate::transport::Transport;

/// Issues the completion handshake for a task in `AwaitingFinish` and
/// resolves the task into a terminal state.
pub async fn finish_chunked(transport: &dyn Transport, task: &FileTask) {
    let Some(transfer_id) = task.transfer_id() else {
        // Unreachable via the orchestrator; guards direct misuse.
        task.fail("missing transfer identifier");
        return;
    };

    // The request batches a descriptor list; the steady-state case is
    // a single element.
    let request = FinishChunksRequest {
        files: vec![ChunkedFileDescriptor {
            uuid: transfer_id.clone(),
            original: task.name().to_string(),
            size: task.size(),
            content_type: task.content_type().to_string(),
            count: task.accepted_chunks(),
            albumid: task.album(),
        }],
    };

    debug!(task = %task.id(), transfer = %transfer_id, "issuing completion handshake");
    match transport.finish_chunks(&request).await {
        Ok(response) => task.resolve_response(&response),
        Err(e) => task.fail(e.to_string()),
    }
}
