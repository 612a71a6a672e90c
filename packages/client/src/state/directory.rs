//! Chat-directory state.
//!
//! Holds the chat roster with denormalized summaries, the unread counters,
//! and the online-user set, reacting to local actions and inbound events.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{Chat, ChatMessage, LastMessage};

/// The client's view of its chats, known users, and who is online
#[derive(Debug, Default)]
pub struct Directory {
    /// Known users (chat peers plus anyone seen coming online)
    users: Vec<String>,
    /// Chats ordered most-recent-activity-first
    chats: Vec<Chat>,
    online_users: HashSet<String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the user roster
    pub fn set_users(&mut self, mut users: Vec<String>) {
        users.sort();
        users.dedup();
        self.users = users;
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Add a user to the roster if unseen
    pub fn add_user(&mut self, user_id: &str) {
        if !self.users.iter().any(|u| u == user_id) {
            self.users.push(user_id.to_string());
            self.users.sort();
        }
    }

    /// Install the fetched chat roster, sorted by recency. Chats with no
    /// messages sort last.
    pub fn set_chats(&mut self, mut chats: Vec<Chat>) {
        chats.sort_by_key(|c| std::cmp::Reverse(c.last_activity()));
        self.chats = chats;
    }

    /// Chats in display order
    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    /// Add a newly created chat to the roster (no messages yet, sorts last)
    pub fn add_chat(&mut self, chat: Chat) {
        self.chats.push(chat);
    }

    /// React to an inbound message: bump the unread counter unless the chat
    /// is currently selected, replace the lastMessage summary, and move the
    /// chat to the front. A chat id not in the roster is ignored; the
    /// directory never creates chats from inbound events.
    pub fn apply_incoming_message(&mut self, message: &ChatMessage, selected: Option<&str>) {
        let Some(position) = self.chats.iter().position(|c| c.id == message.chat_id) else {
            debug!(chat_id = %message.chat_id, "inbound message for unknown chat ignored");
            return;
        };

        let mut chat = self.chats.remove(position);
        if selected != Some(chat.id.as_str()) {
            chat.unread_message_count += 1;
        }
        chat.last_message = Some(LastMessage {
            text: message.text.clone(),
            sender: message.sender.clone(),
            created_at: message.created_at,
        });
        self.chats.insert(0, chat);
    }

    /// Reset the unread counter locally, ahead of the store call
    pub fn mark_read_local(&mut self, chat_id: &str) {
        if let Some(chat) = self.chats.iter_mut().find(|c| c.id == chat_id) {
            chat.unread_message_count = 0;
        }
    }

    /// Replace a chat record with what the store returned; the store wins
    /// over the local guess. Position in the ordering is kept.
    pub fn reconcile_chat(&mut self, confirmed: Chat) {
        if let Some(chat) = self.chats.iter_mut().find(|c| c.id == confirmed.id) {
            *chat = confirmed;
        }
    }

    /// Install the presence snapshot, replacing the set outright
    pub fn set_online_users(&mut self, user_ids: Vec<String>) {
        self.online_users = user_ids.into_iter().collect();
    }

    /// Idempotent single-user presence transitions
    pub fn user_online(&mut self, user_id: &str) {
        self.add_user(user_id);
        self.online_users.insert(user_id.to_string());
    }

    pub fn user_offline(&mut self, user_id: &str) {
        self.online_users.remove(user_id);
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online_users.contains(user_id)
    }

    /// Online user ids, sorted for stable display
    pub fn online_user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.online_users.iter().cloned().collect();
        ids.sort();
        ids
    }
}
