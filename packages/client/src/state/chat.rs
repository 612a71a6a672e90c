//! Per-open-chat state machine.
//!
//! Tracks the message list, the loading phase, and the peer's typing flag
//! for the one chat the user currently has open. Optimistic sends are
//! appended immediately and later replaced by the confirmed record, matched
//! by the local correlation id the store echoes back.

use crate::model::ChatMessage;

/// Loading phase of the open chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    /// Opened, history fetch not yet issued
    Idle,
    /// History fetch in flight
    LoadingHistory,
    /// History loaded; the list is live
    Ready,
}

/// State of the currently open chat
#[derive(Debug)]
pub struct ChatView {
    pub chat_id: String,
    pub peer_id: String,
    pub phase: ChatPhase,
    pub messages: Vec<ChatMessage>,
    /// Whether the peer is currently typing in this chat
    pub peer_typing: bool,
}

impl ChatView {
    pub fn new(chat_id: String, peer_id: String) -> Self {
        Self {
            chat_id,
            peer_id,
            phase: ChatPhase::Idle,
            messages: Vec::new(),
            peer_typing: false,
        }
    }

    pub fn begin_loading(&mut self) {
        self.phase = ChatPhase::LoadingHistory;
    }

    /// Install the fetched history as the baseline and go live
    pub fn history_loaded(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.phase = ChatPhase::Ready;
    }

    /// Append an optimistic send before any network call settles
    pub fn push_optimistic(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replace the optimistic entry whose `local_id` the confirmed record
    /// echoes. A confirmation with no matching entry (chat was switched and
    /// reopened, or the entry was never ours) is ignored.
    pub fn confirm_persisted(&mut self, confirmed: ChatMessage) {
        let Some(local_id) = confirmed.local_id.as_deref() else {
            return;
        };
        if let Some(entry) = self
            .messages
            .iter_mut()
            .find(|m| m.local_id.as_deref() == Some(local_id) && m.is_pending())
        {
            *entry = confirmed;
        }
    }

    /// Apply an inbound realtime message. Appended only if it belongs to
    /// this chat; receiving a message implicitly clears the typing flag.
    /// Returns whether the message was accepted.
    pub fn apply_incoming(&mut self, message: ChatMessage) -> bool {
        if message.chat_id != self.chat_id {
            return false;
        }
        self.peer_typing = false;
        self.messages.push(message);
        true
    }

    pub fn set_peer_typing(&mut self) {
        self.peer_typing = true;
    }

    pub fn clear_peer_typing(&mut self) {
        self.peer_typing = false;
    }
}
