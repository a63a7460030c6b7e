//! Upload orchestration engine.
//!
//! This crate implements the **core** of the uploader: it accepts
//! files from the intake paths (selection, drop, clipboard paste),
//! decides whether each file is sent whole or in chunks, tracks the
//! per-file lifecycle state machine, drives the chunk-completion
//! handshake, reports progress, and binds results (or errors) to each
//! file's presentation slot.
//!
//! It is a library crate with no HTTP or UI dependencies: the network
//! side is behind the [`Transport`] trait and the rendering surface is
//! behind [`PresentationSlot`]/[`Presenter`]. The `uplift-client`
//! crate provides the HTTP implementation.

pub mod binder;
pub mod config;
pub mod finish;
pub mod intake;
pub mod session;
pub mod slot;
pub mod task;
pub mod transport;
pub mod uploader;

pub use config::TransportConfig;
pub use intake::{ClipboardItem, ClipboardItemKind, FileSource, IncomingFile};
pub use session::UploadSession;
pub use slot::{PresentationSlot, Presenter};
pub use task::{FileTask, TaskOutcome, TaskState};
pub use transport::{DispatchRequest, TransferEvent, Transport};
pub use uploader::Uploader;

/// Errors produced by the upload engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upload failed: {0}")]
    Upload(String),
}
