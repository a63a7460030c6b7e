//! Per-file lifecycle state tracker.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};
use uplift_protocol::{UploadResponse, UploadedFile};
use uuid::Uuid;

use crate::binder;
use crate::slot::PresentationSlot;

/// Lifecycle state of a file task.
///
/// `AwaitingFinish` is entered only by chunked tasks, between the last
/// chunk's acceptance and the completion handshake resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Queued,
    Sending,
    AwaitingFinish,
    Completed,
    Failed,
}

impl TaskState {
    /// Returns `true` for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

/// Terminal result of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed {
        url: String,
        display_name: Option<String>,
    },
    Failed {
        description: String,
    },
}

/// One file's end-to-end upload unit of work.
///
/// Identity (id, name, size, content type) is immutable after
/// creation; the mutable lifecycle state lives behind a lock so
/// transitions are atomic with respect to concurrent readers.
pub struct FileTask {
    id: Uuid,
    name: String,
    size: u64,
    content_type: String,
    slot: Arc<dyn PresentationSlot>,
    inner: RwLock<TaskInner>,
}

struct TaskInner {
    state: TaskState,
    album: Option<i64>,
    chunked: bool,
    accepted_chunks: u32,
    transfer_id: Option<String>,
    outcome: Option<TaskOutcome>,
}

impl FileTask {
    /// Creates a queued task bound to its presentation slot.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        slot: Arc<dyn PresentationSlot>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            size,
            content_type: content_type.into(),
            slot,
            inner: RwLock::new(TaskInner {
                state: TaskState::Queued,
                album: None,
                chunked: false,
                accepted_chunks: 0,
                transfer_id: None,
                outcome: None,
            }),
        }
    }

    /// Locally generated upload identifier, stable for the task's lifetime.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Original filename.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Declared content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The task's presentation slot.
    pub fn slot(&self) -> &Arc<dyn PresentationSlot> {
        &self.slot
    }

    pub fn state(&self) -> TaskState {
        self.inner.read().unwrap().state
    }

    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.inner.read().unwrap().outcome.clone()
    }

    /// Album id captured when the task was dispatched.
    pub fn album(&self) -> Option<i64> {
        self.inner.read().unwrap().album
    }

    /// Whether the transport is sending this task in chunks.
    pub fn is_chunked(&self) -> bool {
        self.inner.read().unwrap().chunked
    }

    pub fn accepted_chunks(&self) -> u32 {
        self.inner.read().unwrap().accepted_chunks
    }

    /// Transport-assigned transfer identifier (chunked tasks only).
    pub fn transfer_id(&self) -> Option<String> {
        self.inner.read().unwrap().transfer_id.clone()
    }

    /// `Queued → Sending`. Captures the album id and the chunked/whole
    /// decision for the task's lifetime.
    pub fn begin_sending(&self, album: Option<i64>, chunked: bool) -> bool {
        let mut inner = self.inner.write().unwrap();
        if inner.state != TaskState::Queued {
            warn!(task = %self.id, state = ?inner.state, "begin_sending on non-queued task");
            return false;
        }
        inner.state = TaskState::Sending;
        inner.album = album;
        inner.chunked = chunked;
        debug!(task = %self.id, name = %self.name, chunked, album = ?album, "task sending");
        true
    }

    /// Applies a raw byte-progress event.
    ///
    /// Values are clamped to [0, 100]. For chunked tasks an event
    /// reporting exactly 100 is ignored: that milestone is driven by
    /// the completion coordinator, so the bar never reads 100% before
    /// all chunks are accepted.
    pub fn report_progress(&self, percent: f64) {
        let inner = self.inner.read().unwrap();
        if inner.state != TaskState::Sending {
            return;
        }
        let percent = percent.clamp(0.0, 100.0);
        if inner.chunked && percent >= 100.0 {
            return;
        }
        self.slot.set_progress(percent);
    }

    /// `Sending → AwaitingFinish`: the transport reported every chunk
    /// accepted. Sets the progress indicator to 100.
    ///
    /// The accepted-chunk count is monotone non-decreasing.
    pub fn chunks_accepted(&self, transfer_id: &str, chunk_count: u32) -> bool {
        let mut inner = self.inner.write().unwrap();
        if inner.state != TaskState::Sending || !inner.chunked {
            warn!(task = %self.id, state = ?inner.state, "unexpected chunks-accepted event");
            return false;
        }
        inner.state = TaskState::AwaitingFinish;
        inner.accepted_chunks = inner.accepted_chunks.max(chunk_count);
        inner.transfer_id = Some(transfer_id.to_string());
        drop(inner);
        self.slot.set_progress(100.0);
        debug!(task = %self.id, transfer = %transfer_id, chunks = chunk_count, "awaiting finish");
        true
    }

    /// Transitions into `Failed` and renders the description.
    ///
    /// No-op once a terminal state has been reached.
    pub fn fail(&self, description: impl Into<String>) {
        let description = description.into();
        {
            let mut inner = self.inner.write().unwrap();
            if inner.state.is_terminal() {
                return;
            }
            inner.state = TaskState::Failed;
            inner.outcome = Some(TaskOutcome::Failed {
                description: description.clone(),
            });
        }
        self.slot.hide_progress();
        self.slot.set_error(&description);
        debug!(task = %self.id, error = %description, "task failed");
    }

    /// Transitions into `Completed` and binds the result to the slot.
    pub fn complete(&self, file: &UploadedFile) {
        {
            let mut inner = self.inner.write().unwrap();
            if inner.state.is_terminal() {
                return;
            }
            inner.state = TaskState::Completed;
            inner.outcome = Some(TaskOutcome::Completed {
                url: file.url.clone(),
                display_name: file.name.clone(),
            });
        }
        self.slot.hide_progress();
        binder::bind_result(self.slot.as_ref(), &self.name, file);
        debug!(task = %self.id, url = %file.url, "task completed");
    }

    /// Resolves a server response into a terminal state.
    ///
    /// Shared by the whole-file path and the completion handshake:
    /// a false success indicator fails the task with the server's
    /// description verbatim; a usable file result completes it; a
    /// nominally successful response with no usable result is treated
    /// as a failure rather than left non-terminal.
    pub fn resolve_response(&self, response: &UploadResponse) {
        if !response.success {
            let description = response
                .description
                .clone()
                .unwrap_or_else(|| "upload failed".to_string());
            self.fail(description);
            return;
        }
        match response.first_file() {
            Some(file) if !file.url.is_empty() => self.complete(file),
            _ => self.fail("server returned no file result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::testing::{RecordingSlot, SlotOp};

    fn task_with_slot(chunked: bool) -> (Arc<RecordingSlot>, FileTask) {
        let slot = Arc::new(RecordingSlot::default());
        let task = FileTask::new("photo.png", 42, "image/png", slot.clone());
        task.begin_sending(None, chunked);
        (slot, task)
    }

    #[test]
    fn identity_is_stable() {
        let slot = Arc::new(RecordingSlot::default());
        let task = FileTask::new("a.bin", 7, "application/octet-stream", slot);
        let id = task.id();
        task.begin_sending(Some(1), false);
        task.fail("boom");
        assert_eq!(task.id(), id);
        assert_eq!(task.name(), "a.bin");
        assert_eq!(task.size(), 7);
    }

    #[test]
    fn begin_sending_only_from_queued() {
        let (_slot, task) = task_with_slot(false);
        assert_eq!(task.state(), TaskState::Sending);
        assert!(!task.begin_sending(None, false));
    }

    #[test]
    fn whole_file_success_completes() {
        let (slot, task) = task_with_slot(false);
        task.resolve_response(&UploadResponse {
            success: true,
            description: None,
            files: Some(vec![UploadedFile {
                url: "https://x/y.jpg".into(),
                name: Some("y.jpg".into()),
            }]),
        });
        assert_eq!(task.state(), TaskState::Completed);
        assert!(matches!(
            task.outcome(),
            Some(TaskOutcome::Completed { url, .. }) if url == "https://x/y.jpg"
        ));
        assert!(slot.ops().contains(&SlotOp::HideProgress));
    }

    #[test]
    fn failure_description_is_verbatim() {
        let (slot, task) = task_with_slot(false);
        task.resolve_response(&UploadResponse {
            success: false,
            description: Some("too large".into()),
            files: None,
        });
        assert_eq!(task.state(), TaskState::Failed);
        assert_eq!(slot.error_text().as_deref(), Some("too large"));
    }

    #[test]
    fn success_without_result_is_a_failure() {
        let (_slot, task) = task_with_slot(false);
        task.resolve_response(&UploadResponse {
            success: true,
            description: None,
            files: None,
        });
        assert_eq!(task.state(), TaskState::Failed);
        assert!(matches!(
            task.outcome(),
            Some(TaskOutcome::Failed { description }) if description == "server returned no file result"
        ));
    }

    #[test]
    fn empty_url_is_not_usable() {
        let (_slot, task) = task_with_slot(false);
        task.resolve_response(&UploadResponse {
            success: true,
            description: None,
            files: Some(vec![UploadedFile {
                url: String::new(),
                name: None,
            }]),
        });
        assert_eq!(task.state(), TaskState::Failed);
    }

    #[test]
    fn terminal_state_is_sticky() {
        let (_slot, task) = task_with_slot(false);
        task.fail("first");
        task.complete(&UploadedFile {
            url: "https://x/late.png".into(),
            name: None,
        });
        task.fail("second");
        assert_eq!(task.state(), TaskState::Failed);
        assert!(matches!(
            task.outcome(),
            Some(TaskOutcome::Failed { description }) if description == "first"
        ));
    }

    #[test]
    fn progress_is_clamped() {
        let (slot, task) = task_with_slot(false);
        task.report_progress(150.0);
        task.report_progress(-3.0);
        let percents: Vec<f64> = slot
            .ops()
            .iter()
            .filter_map(|op| match op {
                SlotOp::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![100.0, 0.0]);
    }

    #[test]
    fn chunked_hundred_percent_event_is_ignored() {
        let (slot, task) = task_with_slot(true);
        task.report_progress(40.0);
        task.report_progress(100.0);
        assert_eq!(slot.last_progress(), Some(40.0));
    }

    #[test]
    fn chunks_accepted_enters_awaiting_finish() {
        let (slot, task) = task_with_slot(true);
        assert!(task.chunks_accepted("t-1", 3));
        assert_eq!(task.state(), TaskState::AwaitingFinish);
        assert_eq!(task.transfer_id().as_deref(), Some("t-1"));
        assert_eq!(task.accepted_chunks(), 3);
        // The coordinator owns the 100% milestone.
        assert_eq!(slot.last_progress(), Some(100.0));
    }

    #[test]
    fn chunks_accepted_count_is_monotone() {
        let (_slot, task) = task_with_slot(true);
        task.chunks_accepted("t-1", 5);
        // A stale event can never lower the count.
        assert!(!task.chunks_accepted("t-1", 2));
        assert_eq!(task.accepted_chunks(), 5);
    }

    #[test]
    fn progress_ignored_after_awaiting_finish() {
        let (slot, task) = task_with_slot(true);
        task.chunks_accepted("t-1", 2);
        task.report_progress(55.0);
        assert_eq!(slot.last_progress(), Some(100.0));
    }

    #[test]
    fn chunks_accepted_on_whole_file_is_rejected() {
        let (_slot, task) = task_with_slot(false);
        assert!(!task.chunks_accepted("t-1", 1));
        assert_eq!(task.state(), TaskState::Sending);
    }
}
