//! The mutable selected-chat cell.
//!
//! Inbound-event handlers and timer callbacks are installed once per session
//! but must act on the chat that is selected *when they fire*. They hold a
//! clone of this cell and read through it at dispatch time; the session
//! updates it synchronously on every chat switch.

use std::sync::{Arc, Mutex};

/// Shared cell holding the id of the currently selected chat, if any
#[derive(Debug, Clone, Default)]
pub struct SelectedChat {
    inner: Arc<Mutex<Option<String>>>,
}

impl SelectedChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. `None` means no chat is open.
    pub fn set(&self, chat_id: Option<String>) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = chat_id;
    }

    /// Snapshot of the current selection
    pub fn get(&self) -> Option<String> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Whether `chat_id` is the chat selected right now
    pub fn is_current(&self, chat_id: &str) -> bool {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_deref() == Some(chat_id)
    }
}
