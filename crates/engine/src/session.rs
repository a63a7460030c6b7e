//! Process-wide upload session context.

use std::sync::RwLock;

use crate::config::TransportConfig;

/// Session context created once per page load.
///
/// The transport configuration and authentication token are immutable
/// after construction. The selected destination album is the one
/// mutable field: the selection control writes it, and each task reads
/// it exactly once at dispatch time — later changes affect only tasks
/// enqueued afterwards.
pub struct UploadSession {
    config: TransportConfig,
    token: Option<String>,
    album: RwLock<Option<i64>>,
}

impl UploadSession {
    /// Creates a session. `token` is `None` on a public service.
    pub fn new(config: TransportConfig, token: Option<String>) -> Self {
        Self {
            config,
            token,
            album: RwLock::new(None),
        }
    }

    /// Returns the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Returns the bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Updates the selected destination album. `None` means the
    /// default destination.
    pub fn select_album(&self, album: Option<i64>) {
        let mut selected = self.album.write().unwrap();
        *selected = album;
    }

    /// Returns the currently selected album id.
    pub fn selected_album(&self) -> Option<i64> {
        *self.album.read().unwrap()
    }
}
