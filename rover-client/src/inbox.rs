//! Inbox state owned by the UI thread.

use rover_api::Message;
use tracing::{info, warn};

use crate::error::ClientError;

/// Messages shown in the inbox plus refresh bookkeeping.
///
/// Fetches happen elsewhere; results are handed to [`Inbox::apply`] on the
/// thread that owns this value.
#[derive(Debug, Default)]
pub struct Inbox {
    messages: Vec<Message>,
    refreshing: bool,
    last_error: Option<String>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a refresh as started. Returns `false` if one is already running.
    pub fn begin_refresh(&mut self) -> bool {
        if self.refreshing {
            return false;
        }
        self.refreshing = true;
        true
    }

    /// Apply the outcome of a refresh.
    ///
    /// Failures keep the current messages and only stop the refresh.
    pub fn apply(&mut self, result: Result<Vec<Message>, ClientError>) {
        self.refreshing = false;
        match result {
            Ok(mut messages) => {
                messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                info!(count = messages.len(), "inbox refreshed");
                self.messages = messages;
                self.last_error = None;
            }
            Err(err) => {
                warn!(error = %err, "inbox refresh failed");
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Newest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.read).count()
    }

    /// Local read flag update, before the server call completes.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) if !message.read => {
                message.read = true;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages.remove(index))
    }
}
