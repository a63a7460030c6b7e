use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Capability check
// ---------------------------------------------------------------------------

/// Server capability flags returned by `GET api/check`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub private: bool,
    pub enable_user_accounts: bool,
    /// Display string such as `"512MB"`; the leading integer is megabytes.
    pub max_file_size: String,
    pub chunked_uploads: ChunkedUploadsConfig,
}

/// Chunked upload capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkedUploadsConfig {
    pub enabled: bool,
    /// Chunk size in megabytes.
    pub chunk_size: u64,
}

// ---------------------------------------------------------------------------
// Token verification
// ---------------------------------------------------------------------------

/// Body of `POST api/tokens/verify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenVerifyRequest {
    pub token: String,
}

/// Response to a token verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenVerifyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// ---------------------------------------------------------------------------
// Albums
// ---------------------------------------------------------------------------

/// Response to `GET api/albums`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumsResponse {
    #[serde(default)]
    pub albums: Vec<Album>,
}

/// A destination album the user may attach uploads to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Upload responses
// ---------------------------------------------------------------------------

/// Response shared by whole-file uploads and the chunk-completion
/// handshake: `{ success, description?, files? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<UploadedFile>>,
}

impl UploadResponse {
    /// Builds the synthetic failure the client substitutes for a
    /// request-level (network) error.
    pub fn synthetic_failure(description: impl Into<String>) -> Self {
        Self {
            success: false,
            description: Some(description.into()),
            files: None,
        }
    }

    /// Returns the first file result, if any.
    pub fn first_file(&self) -> Option<&UploadedFile> {
        self.files.as_deref().and_then(|files| files.first())
    }
}

/// One stored file in an upload response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Chunk-completion handshake
// ---------------------------------------------------------------------------

/// Body of `POST api/upload/finishchunks`.
///
/// The service accepts a batch of descriptors; the steady-state case
/// sends exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishChunksRequest {
    pub files: Vec<ChunkedFileDescriptor>,
}

/// Descriptor finalizing one chunked transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkedFileDescriptor {
    /// Transport-assigned transfer identifier.
    pub uuid: String,
    /// Original filename.
    pub original: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Declared content type.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Total chunk count.
    pub count: u32,
    /// Destination album; `null` when no album is selected.
    pub albumid: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_response_camel_case() {
        let json = r#"{
            "private": true,
            "enableUserAccounts": false,
            "maxFileSize": "512MB",
            "chunkedUploads": { "enabled": true, "chunkSize": 10 }
        }"#;
        let parsed: CheckResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.private);
        assert!(!parsed.enable_user_accounts);
        assert_eq!(parsed.max_file_size, "512MB");
        assert!(parsed.chunked_uploads.enabled);
        assert_eq!(parsed.chunked_uploads.chunk_size, 10);
    }

    #[test]
    fn upload_response_roundtrip() {
        let resp = UploadResponse {
            success: true,
            description: None,
            files: Some(vec![UploadedFile {
                url: "https://x/y.jpg".into(),
                name: Some("y.jpg".into()),
            }]),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("description"));
        let parsed: UploadResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp, parsed);
        assert_eq!(parsed.first_file().unwrap().url, "https://x/y.jpg");
    }

    #[test]
    fn upload_response_failure_keeps_description() {
        let json = r#"{ "success": false, "description": "too large" }"#;
        let parsed: UploadResponse = serde_json::from_str(json).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.description.as_deref(), Some("too large"));
        assert!(parsed.first_file().is_none());
    }

    #[test]
    fn synthetic_failure_shape() {
        let resp = UploadResponse::synthetic_failure("connection reset");
        assert!(!resp.success);
        assert_eq!(resp.description.as_deref(), Some("connection reset"));
        assert!(resp.files.is_none());
    }

    #[test]
    fn finish_chunks_wire_keys() {
        let req = FinishChunksRequest {
            files: vec![ChunkedFileDescriptor {
                uuid: "u-1".into(),
                original: "video.mkv".into(),
                size: 123_456,
                content_type: "video/x-matroska".into(),
                count: 13,
                albumid: None,
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        let file = &json["files"][0];
        assert_eq!(file["uuid"], "u-1");
        assert_eq!(file["original"], "video.mkv");
        assert_eq!(file["type"], "video/x-matroska");
        assert_eq!(file["count"], 13);
        // The service expects an explicit null when no album is selected.
        assert!(file["albumid"].is_null());
    }

    #[test]
    fn finish_chunks_with_album() {
        let req = FinishChunksRequest {
            files: vec![ChunkedFileDescriptor {
                uuid: "u-2".into(),
                original: "a.png".into(),
                size: 10,
                content_type: "image/png".into(),
                count: 1,
                albumid: Some(7),
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["files"][0]["albumid"], 7);
    }

    #[test]
    fn albums_response_default_empty() {
        let parsed: AlbumsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.albums.is_empty());
    }
}
