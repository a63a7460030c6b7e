//! HTTPS implementation of the engine's `Transport` seam.
//!
//! Whole files go up as a single multipart POST; chunked files as a
//! strictly sequential series of chunk POSTs (parallel chunk uploads
//! are disabled) followed by the completion handshake the engine
//! issues through [`Transport::finish_chunks`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uplift_engine::{DispatchRequest, EngineError, FileSource, TransferEvent, Transport};
use uplift_protocol::{FinishChunksRequest, UploadResponse};
use uuid::Uuid;

use crate::error::ClientError;

/// Frame size used to stream whole-file bodies, so byte-progress
/// events have a useful granularity.
const STREAM_FRAME: usize = 64 * 1024;

/// Event channel depth per task.
const EVENT_BUFFER: usize = 64;

/// `Transport` over a lolisafe-style HTTP upload API.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Creates a transport for the service at `base_url`.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, base_url, token))
    }

    /// Creates a transport reusing an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/api/upload", self.base_url)
    }
}

impl Transport for HttpTransport {
    fn send_file(&self, request: DispatchRequest) -> mpsc::Receiver<TransferEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let http = self.http.clone();
        let url = self.upload_url();

        tokio::spawn(async move {
            if request.chunked {
                send_chunked(http, url, request, tx).await;
            } else {
                send_whole(http, url, request, tx).await;
            }
        });
        rx
    }

    fn finish_chunks(
        &self,
        request: &FinishChunksRequest,
    ) -> Pin<Box<dyn Future<Output = Result<UploadResponse, EngineError>> + Send + '_>> {
        let http = self.http.clone();
        let url = format!("{}/api/upload/finishchunks", self.base_url);
        let token = self.token.clone();
        let body = request.clone();

        Box::pin(async move {
            let mut builder = http.post(&url).json(&body);
            if let Some(token) = &token {
                builder = builder.header("token", token);
            }

            // Request-level failures become a synthetic failed
            // response; the engine renders the description into the
            // task's slot like any other handshake failure.
            match builder.send().await {
                Ok(resp) => match read_upload_response(resp).await {
                    Ok(parsed) => Ok(parsed),
                    Err(e) => Ok(UploadResponse::synthetic_failure(e.to_string())),
                },
                Err(e) => {
                    warn!(error = %e, "completion handshake request failed");
                    Ok(UploadResponse::synthetic_failure(e.to_string()))
                }
            }
        })
    }
}

/// Loads the file's bytes from its source.
async fn load_bytes(source: &FileSource) -> Result<Vec<u8>, ClientError> {
    match source {
        FileSource::Memory(bytes) => Ok(bytes.clone()),
        FileSource::Path(path) => Ok(tokio::fs::read(path).await?),
    }
}

/// Sends a file as one multipart POST, emitting byte progress while
/// the body streams out.
async fn send_whole(
    http: reqwest::Client,
    url: String,
    request: DispatchRequest,
    tx: mpsc::Sender<TransferEvent>,
) {
    let outcome = async {
        let bytes = load_bytes(&request.source).await?;
        let total = bytes.len() as u64;
        let part = streaming_part(bytes, &request, tx.clone())?;
        let form = Form::new().part("files[]", part);

        let mut builder = http.post(&url).multipart(form);
        if let Some(token) = &request.token {
            builder = builder.header("token", token);
        }
        if let Some(album) = request.album {
            builder = builder.header("albumid", album.to_string());
        }

        debug!(task = %request.task_id, bytes = total, "sending whole file");
        let resp = builder.send().await?;
        read_upload_response(resp).await
    }
    .await;

    let event = match outcome {
        Ok(response) => TransferEvent::Response(response),
        Err(e) => TransferEvent::Error(e.to_string()),
    };
    let _ = tx.send(event).await;
}

/// Builds the `files[]` part, wrapping the bytes in a stream that
/// reports cumulative progress per frame.
fn streaming_part(
    bytes: Vec<u8>,
    request: &DispatchRequest,
    tx: mpsc::Sender<TransferEvent>,
) -> Result<Part, ClientError> {
    let total = bytes.len() as u64;
    let frames: Vec<Vec<u8>> = bytes.chunks(STREAM_FRAME).map(<[u8]>::to_vec).collect();
    let sent = Arc::new(AtomicU64::new(0));

    let stream = futures_util::stream::iter(frames.into_iter().map(move |frame| {
        let done = sent.fetch_add(frame.len() as u64, Ordering::Relaxed) + frame.len() as u64;
        let percent = if total == 0 {
            100.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        // Dropping an event on a full channel only coarsens progress.
        let _ = tx.try_send(TransferEvent::Progress { percent });
        Ok::<Vec<u8>, std::io::Error>(frame)
    }));

    let mut part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
        .file_name(request.name.clone());
    if !request.content_type.is_empty() {
        part = part.mime_str(&request.content_type)?;
    }
    Ok(part)
}

/// Sends a file as sequential chunk POSTs and reports when every chunk
/// has been accepted. The destination album travels in the finish
/// request, never as a chunk header.
async fn send_chunked(
    http: reqwest::Client,
    url: String,
    request: DispatchRequest,
    tx: mpsc::Sender<TransferEvent>,
) {
    let transfer_id = Uuid::new_v4().to_string();

    let bytes = match load_bytes(&request.source).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tx.send(TransferEvent::Error(e.to_string())).await;
            return;
        }
    };

    let total = bytes.len() as u64;
    let chunk_size = request.chunk_size.max(1) as usize;
    let chunks: Vec<&[u8]> = bytes.chunks(chunk_size).collect();
    let chunk_count = chunks.len().max(1) as u32;
    debug!(
        task = %request.task_id,
        transfer = %transfer_id,
        chunks = chunk_count,
        "sending chunked file"
    );

    let mut sent: u64 = 0;
    for (index, chunk) in chunks.into_iter().enumerate() {
        let part = match chunk_part(chunk, &request) {
            Ok(part) => part,
            Err(e) => {
                let _ = tx.send(TransferEvent::Error(e.to_string())).await;
                return;
            }
        };
        let form = Form::new()
            .text("dzuuid", transfer_id.clone())
            .text("dzchunkindex", index.to_string())
            .text("dztotalfilesize", total.to_string())
            .text("dzchunksize", chunk_size.to_string())
            .text("dztotalchunkcount", chunk_count.to_string())
            .text("dzchunkbyteoffset", (index * chunk_size).to_string())
            .part("files[]", part);

        let mut builder = http.post(&url).multipart(form);
        if let Some(token) = &request.token {
            builder = builder.header("token", token);
        }

        let parsed = match builder.send().await {
            Ok(resp) => read_upload_response(resp).await,
            Err(e) => Err(ClientError::Http(e)),
        };
        match parsed {
            Ok(resp) if !resp.success => {
                let description = resp
                    .description
                    .unwrap_or_else(|| "chunk rejected".to_string());
                let _ = tx.send(TransferEvent::Error(description)).await;
                return;
            }
            Ok(_) => {}
            Err(e) => {
                let _ = tx.send(TransferEvent::Error(e.to_string())).await;
                return;
            }
        }

        sent += chunk.len() as u64;
        let percent = if total == 0 {
            100.0
        } else {
            sent as f64 / total as f64 * 100.0
        };
        let _ = tx.send(TransferEvent::Progress { percent }).await;
    }

    let _ = tx
        .send(TransferEvent::AllChunksAccepted {
            transfer_id,
            chunk_count,
        })
        .await;
}

/// Builds one chunk's `files[]` part.
fn chunk_part(chunk: &[u8], request: &DispatchRequest) -> Result<Part, ClientError> {
    let mut part = Part::bytes(chunk.to_vec()).file_name(request.name.clone());
    if !request.content_type.is_empty() {
        part = part.mime_str(&request.content_type)?;
    }
    Ok(part)
}

/// Decodes an upload response body.
///
/// The service answers JSON (with an explicit `success` flag) even on
/// error statuses; an unparsable body on a non-success status maps to
/// an API error instead.
async fn read_upload_response(resp: reqwest::Response) -> Result<UploadResponse, ClientError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    classify_body(status, &body)
}

fn classify_body(status: StatusCode, body: &[u8]) -> Result<UploadResponse, ClientError> {
    match serde_json::from_slice::<UploadResponse>(body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !status.is_success() => Err(ClientError::Api {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplift_protocol::ChunkedFileDescriptor;

    fn request(chunked: bool, bytes: Vec<u8>) -> DispatchRequest {
        DispatchRequest {
            task_id: Uuid::new_v4(),
            name: "a.png".into(),
            size: bytes.len() as u64,
            content_type: "image/png".into(),
            source: FileSource::Memory(bytes),
            token: None,
            album: None,
            chunked,
            chunk_size: 4,
        }
    }

    #[test]
    fn classify_parses_json_regardless_of_status() {
        let body = br#"{ "success": false, "description": "too large" }"#;
        let parsed = classify_body(StatusCode::PAYLOAD_TOO_LARGE, body).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.description.as_deref(), Some("too large"));
    }

    #[test]
    fn classify_maps_non_json_error_bodies() {
        let result = classify_body(StatusCode::BAD_GATEWAY, b"<html>nope</html>");
        assert!(matches!(
            result,
            Err(ClientError::Api { status: 502, .. })
        ));
    }

    #[test]
    fn classify_rejects_non_json_success_bodies() {
        let result = classify_body(StatusCode::OK, b"not json");
        assert!(matches!(result, Err(ClientError::Json(_))));
    }

    #[tokio::test]
    async fn whole_file_against_unreachable_host_emits_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), [0u8; 16]).unwrap();

        let transport = HttpTransport::new("http://127.0.0.1:9", None).unwrap();
        let mut req = request(false, Vec::new());
        req.size = 16;
        req.source = FileSource::Path(file.path().to_path_buf());
        let mut events = transport.send_file(req);

        let mut saw_error = false;
        while let Some(event) = events.recv().await {
            if let TransferEvent::Error(_) = event {
                saw_error = true;
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn chunked_against_unreachable_host_emits_error() {
        let transport = HttpTransport::new("http://127.0.0.1:9", None).unwrap();
        let mut events = transport.send_file(request(true, vec![0u8; 16]));

        let mut saw_error = false;
        let mut saw_accepted = false;
        while let Some(event) = events.recv().await {
            match event {
                TransferEvent::Error(_) => saw_error = true,
                TransferEvent::AllChunksAccepted { .. } => saw_accepted = true,
                _ => {}
            }
        }
        assert!(saw_error);
        assert!(!saw_accepted);
    }

    #[tokio::test]
    async fn finish_chunks_converts_request_errors_to_synthetic_failure() {
        let transport = HttpTransport::new("http://127.0.0.1:9", None).unwrap();
        let request = FinishChunksRequest {
            files: vec![ChunkedFileDescriptor {
                uuid: "t-1".into(),
                original: "a.bin".into(),
                size: 8,
                content_type: "application/octet-stream".into(),
                count: 2,
                albumid: None,
            }],
        };

        let response = transport.finish_chunks(&request).await.unwrap();
        assert!(!response.success);
        assert!(!response.description.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn missing_file_emits_error() {
        let transport = HttpTransport::new("http://127.0.0.1:9", None).unwrap();
        let mut req = request(false, Vec::new());
        req.source = FileSource::Path("/nonexistent/uplift-test-file".into());
        let mut events = transport.send_file(req);

        let mut saw_error = false;
        while let Some(event) = events.recv().await {
            if let TransferEvent::Error(text) = event {
                saw_error = true;
                assert!(text.contains("I/O error"));
            }
        }
        assert!(saw_error);
    }
}
