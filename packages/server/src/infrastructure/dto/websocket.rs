//! Realtime event vocabulary carried over the WebSocket.
//!
//! Events are JSON objects tagged by a `type` field with dash-separated
//! names; payload keys are camelCase. Both directions are defined here and
//! the client crate reuses these types, so the wire format has a single
//! source of truth.

use serde::{Deserialize, Serialize};

/// Message relay payload.
///
/// Carries the full denormalized message plus the chat's member pair so the
/// server can address the recipient without knowing anything about chats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub chat_id: String,
    pub sender: String,
    /// The two participant ids of the chat (order-insensitive)
    pub members: Vec<String>,
    pub text: String,
    pub read: bool,
    /// Unix timestamp in milliseconds, assigned at send time
    pub created_at: i64,
}

impl MessagePayload {
    /// Resolve the recipient: `members` minus `sender`.
    ///
    /// Returns `None` for malformed payloads (members not a distinct pair,
    /// or sender not among them); such payloads are dropped by the router.
    pub fn recipient(&self) -> Option<&str> {
        if self.members.len() != 2 || self.members[0] == self.members[1] {
            return None;
        }
        if !self.members.iter().any(|m| m == &self.sender) {
            return None;
        }
        self.members
            .iter()
            .find(|m| *m != &self.sender)
            .map(String::as_str)
    }
}

/// Transient typing signal payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub sender_id: String,
    pub receiver_id: String,
    pub chat_id: String,
}

/// Events sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Announce identity; registers the session under the user id
    #[serde(rename = "join-room")]
    JoinRoom {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Relay request; re-emitted verbatim to the recipient as `receive-message`
    #[serde(rename = "send-message")]
    SendMessage(MessagePayload),
    #[serde(rename = "typing")]
    Typing(TypingPayload),
    #[serde(rename = "stop-typing")]
    StopTyping(TypingPayload),
}

/// Events sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Presence snapshot, unicast to a session right after it joins
    #[serde(rename = "online-users")]
    OnlineUsers {
        #[serde(rename = "userIds")]
        user_ids: Vec<String>,
    },
    /// Presence transition, broadcast to all connected sessions
    #[serde(rename = "user-online")]
    UserOnline {
        #[serde(rename = "userId")]
        user_id: String,
    },
    #[serde(rename = "user-offline")]
    UserOffline {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Message delivery to the recipient's session(s)
    #[serde(rename = "receive-message")]
    ReceiveMessage(MessagePayload),
    #[serde(rename = "typing")]
    Typing(TypingPayload),
    #[serde(rename = "stop-typing")]
    StopTyping(TypingPayload),
}
