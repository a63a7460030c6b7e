//! Transport configuration derived from server capabilities.

use uplift_protocol::CheckResponse;

/// At most this many whole-file tasks are in flight at once.
pub const PARALLEL_UPLOADS: usize = 2;

/// At most this many chunks of a single task are in flight at once.
///
/// Kept at 1: with hundreds of queued tasks, parallel chunk streams
/// tend to overload the server side.
pub const PARALLEL_CHUNK_UPLOADS: usize = 1;

/// The service reports sizes in decimal megabytes.
pub const MEGABYTE: u64 = 1_000_000;

/// Immutable upload transport configuration.
///
/// Built once per page load from the capability check and consumed by
/// every task enqueued afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Whether chunked uploads are enabled server-side.
    pub chunking: bool,
    /// Chunk size in bytes.
    pub chunk_size: u64,
    /// Whole-file size ceiling in bytes.
    pub max_file_size: u64,
    pub parallel_uploads: usize,
    pub parallel_chunk_uploads: usize,
}

impl TransportConfig {
    /// Derives the configuration from server-reported capabilities.
    pub fn from_capabilities(caps: &CheckResponse) -> Self {
        Self {
            chunking: caps.chunked_uploads.enabled,
            chunk_size: caps.chunked_uploads.chunk_size * MEGABYTE,
            max_file_size: parse_max_size(&caps.max_file_size) * MEGABYTE,
            parallel_uploads: PARALLEL_UPLOADS,
            parallel_chunk_uploads: PARALLEL_CHUNK_UPLOADS,
        }
    }

    /// Returns `true` if a file of `size` bytes is sent in chunks.
    pub fn is_chunked(&self, size: u64) -> bool {
        self.chunking && size > self.chunk_size
    }

    /// Total chunk count for a file of `size` bytes.
    pub fn chunk_count(&self, size: u64) -> u32 {
        if self.chunk_size == 0 {
            return 1;
        }
        size.div_ceil(self.chunk_size).max(1) as u32
    }
}

/// Parses the leading integer of a display string such as `"512MB"`.
fn parse_max_size(display: &str) -> u64 {
    let digits: String = display.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
