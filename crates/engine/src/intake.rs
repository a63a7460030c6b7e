//! File intake: normalizes drop, selection, and clipboard paste into
//! enqueue calls.

use std::path::PathBuf;

/// Where a file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A file on disk, read at dispatch time.
    Path(PathBuf),
    /// In-memory bytes (clipboard paste).
    Memory(Vec<u8>),
}

/// A file accepted for upload, before it becomes a task.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub source: FileSource,
}

impl IncomingFile {
    /// A file from the selection or drop path, passed through unmodified.
    pub fn from_path(
        name: impl Into<String>,
        content_type: impl Into<String>,
        path: PathBuf,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: content_type.into(),
            source: FileSource::Path(path),
        }
    }

    /// An in-memory file.
    pub fn from_memory(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content_type: content_type.into(),
            source: FileSource::Memory(bytes),
        }
    }
}

/// Kind of a clipboard data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardItemKind {
    File,
    Text,
}

/// One item of a clipboard paste event.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub kind: ClipboardItemKind,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Extracts uploadable files from a paste event.
///
/// Each file item yields one `IncomingFile` named
/// `pasted-image.<subtype>`, carrying the item's original MIME type.
/// Non-file items are ignored; multiple file items are processed
/// independently.
pub fn paste_files(items: Vec<ClipboardItem>) -> Vec<IncomingFile> {
    items
        .into_iter()
        .filter(|item| item.kind == ClipboardItemKind::File)
        .map(|item| {
            let name = pasted_name(&item.content_type);
            IncomingFile::from_memory(name, item.content_type, item.data)
        })
        .collect()
}

/// Synthesizes a filename from a MIME type: `image/png` → `pasted-image.png`.
fn pasted_name(content_type: &str) -> String {
    let subtype = content_type
        .split('/')
        .nth(1)
        .unwrap_or("bin")
        .split(';')
        .next()
        .unwrap_or("bin");
    format!("pasted-image.{subtype}")
}
