//! Upload orchestrator.
//!
//! Owns the pending-task queue, enforces the parallel-upload window,
//! and drives each dispatched task's transfer event sequence to a
//! terminal state. Tasks are independent: one task's failure never
//! aborts or delays another, and there is no cancellation — a
//! dispatched task runs until `Completed` or `Failed`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::finish;
use crate::intake::{ClipboardItem, FileSource, IncomingFile, paste_files};
use crate::session::UploadSession;
use crate::slot::Presenter;
use crate::task::FileTask;
use crate::transport::{DispatchRequest, TransferEvent, Transport};

/// The upload orchestration engine.
pub struct Uploader {
    session: Arc<UploadSession>,
    transport: Arc<dyn Transport>,
    presenter: Arc<dyn Presenter>,
    inner: Mutex<QueueInner>,
}

struct QueueInner {
    pending: VecDeque<(Arc<FileTask>, FileSource)>,
    /// Tasks currently in `Sending` or `AwaitingFinish`.
    active: usize,
    /// Every task ever enqueued; slots persist for the page lifetime.
    tasks: Vec<Arc<FileTask>>,
}

impl Uploader {
    /// Creates the orchestrator around a session, a transport, and a
    /// presentation surface.
    pub fn new(
        session: Arc<UploadSession>,
        transport: Arc<dyn Transport>,
        presenter: Arc<dyn Presenter>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session,
            transport,
            presenter,
            inner: Mutex::new(QueueInner {
                pending: VecDeque::new(),
                active: 0,
                tasks: Vec::new(),
            }),
        })
    }

    /// The session context tasks read at dispatch time.
    pub fn session(&self) -> &Arc<UploadSession> {
        &self.session
    }

    /// Every task enqueued so far, in enqueue order.
    pub fn tasks(&self) -> Vec<Arc<FileTask>> {
        self.inner.lock().unwrap().tasks.clone()
    }

    /// Enqueues one accepted file.
    ///
    /// Creates the task's presentation slot, reveals the results area,
    /// and dispatches immediately if a parallel-upload slot is free.
    pub fn enqueue(self: &Arc<Self>, file: IncomingFile) -> Arc<FileTask> {
        let slot = self.presenter.create_slot();
        self.presenter.reveal_results();

        let task = Arc::new(FileTask::new(file.name, file.size, file.content_type, slot));
        info!(task = %task.id(), name = %task.name(), size = task.size(), "file enqueued");

        {
            let mut inner = self.inner.lock().unwrap();
            inner.tasks.push(Arc::clone(&task));
            inner.pending.push_back((Arc::clone(&task), file.source));
        }
        self.pump();
        task
    }

    /// Enqueues every file item of a clipboard paste event.
    pub fn paste(self: &Arc<Self>, items: Vec<ClipboardItem>) -> Vec<Arc<FileTask>> {
        paste_files(items)
            .into_iter()
            .map(|file| self.enqueue(file))
            .collect()
    }

    /// Dispatches queued tasks while the parallel window has room.
    fn pump(self: &Arc<Self>) {
        loop {
            let (task, source) = {
                let mut inner = self.inner.lock().unwrap();
                if inner.active >= self.session.config().parallel_uploads {
                    return;
                }
                let Some(entry) = inner.pending.pop_front() else {
                    return;
                };
                inner.active += 1;
                entry
            };

            let this = Arc::clone(self);
            tokio::spawn(async move {
                this.drive(task, source).await;
            });
        }
    }

    /// Drives one task from dispatch to a terminal state.
    async fn drive(self: Arc<Self>, task: Arc<FileTask>, source: FileSource) {
        // The album selection is read exactly once, here; later changes
        // affect only tasks dispatched afterwards.
        let album = self.session.selected_album();
        let chunked = self.session.config().is_chunked(task.size());
        task.begin_sending(album, chunked);

        let request = DispatchRequest {
            task_id: task.id(),
            name: task.name().to_string(),
            size: task.size(),
            content_type: task.content_type().to_string(),
            source,
            token: self.session.token().map(String::from),
            album,
            chunked,
            chunk_size: self.session.config().chunk_size,
        };

        let mut events = self.transport.send_file(request);
        while let Some(event) = events.recv().await {
            match event {
                TransferEvent::Progress { percent } => task.report_progress(percent),
                TransferEvent::AllChunksAccepted {
                    transfer_id,
                    chunk_count,
                } => {
                    if task.chunks_accepted(&transfer_id, chunk_count) {
                        finish::finish_chunked(self.transport.as_ref(), &task).await;
                    }
                }
                TransferEvent::Response(response) => task.resolve_response(&response),
                TransferEvent::Error(error) => task.fail(error),
            }
        }

        // Liveness: the event sequence ended, so the task must be
        // terminal even if the transport misbehaved.
        if !task.state().is_terminal() {
            warn!(task = %task.id(), "transport closed without a terminal event");
            task.fail("transport closed without a response");
        }

        {
            let mut inner = self.inner.lock().unwrap();
            inner.active -= 1;
        }
        debug!(task = %task.id(), state = ?task.state(), "dispatch slot freed");
        self.pump();
    }
}
