//! Persistence collaborator traits.
//!
//! The realtime core does not own message persistence; it consumes these
//! interfaces. `persist_message` echoes the client-side correlation id so
//! the caller can reconcile an optimistic entry with the confirmed record.

pub mod inmemory;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Chat, ChatMessage};

pub use inmemory::InMemoryStore;

/// Errors from the persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("store request failed: {0}")]
    RequestFailed(String),
}

/// Persisted-message store API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fetch the persisted history of a chat, oldest first
    async fn fetch_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, StoreError>;

    /// Persist a message; the returned record carries the server-assigned id
    /// and echoes the message's `local_id`.
    async fn persist_message(&self, message: &ChatMessage) -> Result<ChatMessage, StoreError>;
}

/// Chat-directory store API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatDirectoryStore: Send + Sync {
    /// All chats the user participates in
    async fn fetch_chats(&self, user_id: &str) -> Result<Vec<Chat>, StoreError>;

    /// Create a two-party chat
    async fn create_chat(&self, members: [String; 2]) -> Result<Chat, StoreError>;

    /// Persist an unread-counter reset; returns the updated chat record
    /// (source of truth wins over the local guess).
    async fn clear_unread(&self, chat_id: &str) -> Result<Chat, StoreError>;
}
