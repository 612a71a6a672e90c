//! Client-side domain models.
//!
//! These are the denormalized records the client state machines operate on.
//! The wire shapes live in `fumi_server::infrastructure::dto::websocket`;
//! conversions between the two are defined here.

use fumi_server::infrastructure::dto::websocket::MessagePayload;
use uuid::Uuid;

/// A chat message as the client sees it.
///
/// `id` is the server-assigned identity, immutable once set. `local_id` is
/// the client-side correlation id of an optimistic send; the persistence
/// collaborator echoes it back so the optimistic entry can be replaced by
/// the confirmed record. Messages arriving over the realtime wire carry
/// neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Option<String>,
    pub local_id: Option<String>,
    pub chat_id: String,
    pub sender: String,
    pub text: String,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
    pub read: bool,
}

impl ChatMessage {
    /// Build an optimistic message with a fresh local correlation id and a
    /// client-side timestamp. Pending until the store confirms it.
    pub fn optimistic(chat_id: String, sender: String, text: String, now_millis: i64) -> Self {
        Self {
            id: None,
            local_id: Some(format!("temp-{}", Uuid::new_v4())),
            chat_id,
            sender,
            text,
            created_at: now_millis,
            read: false,
        }
    }

    /// Whether this entry is an optimistic send awaiting confirmation
    pub fn is_pending(&self) -> bool {
        self.id.is_none() && self.local_id.is_some()
    }

    /// Build a client model from an inbound realtime payload
    pub fn from_payload(payload: &MessagePayload) -> Self {
        Self {
            id: None,
            local_id: None,
            chat_id: payload.chat_id.clone(),
            sender: payload.sender.clone(),
            text: payload.text.clone(),
            created_at: payload.created_at,
            read: payload.read,
        }
    }

    /// Build the outbound relay payload, carrying the chat's member pair so
    /// the server can address the recipient.
    pub fn to_payload(&self, members: [String; 2]) -> MessagePayload {
        MessagePayload {
            chat_id: self.chat_id.clone(),
            sender: self.sender.clone(),
            members: members.to_vec(),
            text: self.text.clone(),
            read: self.read,
            created_at: self.created_at,
        }
    }
}

/// Denormalized summary of the most recent message in a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastMessage {
    pub text: String,
    pub sender: String,
    pub created_at: i64,
}

/// A durable two-party conversation as the directory sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: String,
    /// Exactly two distinct user ids; order is stable for display
    pub members: [String; 2],
    pub last_message: Option<LastMessage>,
    /// Unread counter scoped to the viewing user
    pub unread_message_count: u32,
}

impl Chat {
    /// The other participant, from `user_id`'s point of view
    pub fn peer_of(&self, user_id: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.as_str() != user_id)
            .map(String::as_str)
    }

    /// Ordering key for the chat list: most recent activity, or 0 for chats
    /// with no messages yet (sorts last).
    pub fn last_activity(&self) -> i64 {
        self.last_message.as_ref().map(|m| m.created_at).unwrap_or(0)
    }
}
