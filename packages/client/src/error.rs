//! Error types for the chat client.

use thiserror::Error;

use crate::store::StoreError;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An operation required an open chat
    #[error("No chat is currently open")]
    ChatNotOpen,

    /// The chat is not present in the local directory
    #[error("Unknown chat '{0}'")]
    UnknownChat(String),

    /// Persistence collaborator failure
    #[error(transparent)]
    Store(#[from] StoreError),
}
