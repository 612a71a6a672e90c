//! メッセージ送信（通知）の trait 定義
//!
//! ## 概要
//!
//! UseCase 層がクライアントへイベントを届けるためのインターフェース。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します。
//!
//! 配送はセッション単位です。ユーザー ID からセッションへの解決は
//! `ConnectionRegistry` の責務であり、この trait は関与しません。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::SessionId;

/// Channel used to push serialized events to one session's send task
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Errors raised when pushing messages to sessions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// MessagePusher trait
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a session's outbound channel
    async fn register_session(&self, session_id: SessionId, sender: PusherChannel);

    /// Remove a session's outbound channel (no-op if unknown)
    async fn unregister_session(&self, session_id: &SessionId);

    /// Push a serialized event to a single session
    async fn push_to(&self, session_id: &SessionId, content: &str)
    -> Result<(), MessagePushError>;

    /// Push a serialized event to each of the given sessions.
    /// Individual failures are tolerated and logged.
    async fn push_to_sessions(
        &self,
        targets: Vec<SessionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
