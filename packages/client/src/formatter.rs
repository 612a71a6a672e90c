//! Message formatting utilities for client display.

use fumi_shared::time::{format_elapsed, format_message_timestamp};

use crate::model::{Chat, ChatMessage};

/// Preview text is truncated to this many characters in the chat list
const PREVIEW_MAX_CHARS: usize = 25;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a message line for the open-chat view
    ///
    /// # Arguments
    ///
    /// * `message` - The message to render
    /// * `own_user_id` - The viewing user's ID (to mark own messages)
    /// * `now_millis` - Current time, for the relative timestamp label
    ///
    /// # Returns
    ///
    /// A formatted line; pending optimistic sends carry a trailing marker
    pub fn format_message(message: &ChatMessage, own_user_id: &str, now_millis: i64) -> String {
        let label = format_message_timestamp(message.created_at, now_millis);
        let sender = if message.sender == own_user_id {
            "You"
        } else {
            message.sender.as_str()
        };
        let pending = if message.is_pending() { " (sending...)" } else { "" };
        format!("[{}] {}: {}{}", label, sender, message.text, pending)
    }

    /// Format a chat-list row: peer name with online dot, last-message
    /// preview, elapsed-time label, and unread badge
    pub fn format_chat_row(
        chat: &Chat,
        own_user_id: &str,
        peer_online: bool,
        now_millis: i64,
    ) -> String {
        let peer = chat.peer_of(own_user_id).unwrap_or("(unknown)");
        let dot = if peer_online { "●" } else { "○" };

        let (preview, elapsed) = match &chat.last_message {
            Some(last) => {
                let prefix = if last.sender == own_user_id { "You: " } else { "" };
                let preview = Self::truncate_preview(&format!("{}{}", prefix, last.text));
                (preview, format_elapsed(last.created_at, now_millis))
            }
            None => ("(no messages yet)".to_string(), String::new()),
        };

        let badge = if chat.unread_message_count > 0 {
            format!(" [{}]", chat.unread_message_count)
        } else {
            String::new()
        };

        if elapsed.is_empty() {
            format!("{} {}{} - {}", dot, peer, badge, preview)
        } else {
            format!("{} {}{} - {} ({})", dot, peer, badge, preview, elapsed)
        }
    }

    /// Format the peer-is-typing indicator line
    pub fn format_typing_indicator(peer_id: &str) -> String {
        format!("{} is typing...", peer_id)
    }

    /// Format a presence-transition notice
    pub fn format_presence(user_id: &str, online: bool) -> String {
        if online {
            format!("* {} is now online", user_id)
        } else {
            format!("* {} went offline", user_id)
        }
    }

    fn truncate_preview(text: &str) -> String {
        let mut chars = text.chars();
        let head: String = chars.by_ref().take(PREVIEW_MAX_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}
