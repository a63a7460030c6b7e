//! Wire types for the upload service API.
//!
//! JSON shapes match the service exactly: the capability check and
//! token endpoints use camelCase keys, while upload and
//! chunk-completion payloads use the lowercase keys the service
//! expects (`uuid`, `original`, `albumid`, ...).

pub mod messages;

pub use messages::{
    Album, AlbumsResponse, CheckResponse, ChunkedFileDescriptor, ChunkedUploadsConfig,
    FinishChunksRequest, TokenVerifyRequest, TokenVerifyResponse, UploadResponse, UploadedFile,
};
