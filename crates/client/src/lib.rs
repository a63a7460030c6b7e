//! HTTP implementation of the upload engine's seams.
//!
//! - [`ApiClient`] — the simple request/response collaborators around
//!   the core: capability check, token verification, album listing.
//! - [`HttpTransport`] — the engine's [`Transport`](uplift_engine::Transport)
//!   over HTTPS multipart uploads, whole-file and chunked.
//! - [`sharex`] — renders the downloadable uploader-profile artifact.

pub mod api;
pub mod error;
pub mod sharex;
pub mod transport;

pub use api::ApiClient;
pub use error::ClientError;
pub use transport::HttpTransport;
