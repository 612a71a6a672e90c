//! UseCase: メッセージ中継処理
//!
//! ## 概要
//!
//! `send-message` を受信者の全セッションへ `receive-message` として
//! そのまま中継します。中継はベストエフォートです：受信者のセッションが
//! 1 つもなければ何も配送せず、正常終了します（永続化層が真実の源であり、
//! 受信者は次回のフェッチで追いつきます）。キューイングや再送は行いません。

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, MessagePusher, UserId};

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    /// ConnectionRegistry（接続状態の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayMessageUseCase {
    /// 新しい RelayMessageUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// メッセージ中継を実行
    ///
    /// # Arguments
    ///
    /// * `recipient` - 受信者のユーザー ID（`members` から `sender` を
    ///   除いたもの。解決は DTO 層で行われる）
    /// * `message` - 中継する JSON メッセージ（`receive-message` イベント）
    ///
    /// # Returns
    ///
    /// 配送対象となったセッション数。0 は「受信者が今オフライン」を意味し、
    /// エラーではない。
    pub async fn execute(&self, recipient: &UserId, message: &str) -> usize {
        let targets = self.registry.sessions_for(recipient).await;
        let delivered = targets.len();

        if delivered == 0 {
            tracing::debug!(
                "Recipient '{}' has no live session, message not delivered live",
                recipient
            );
            return 0;
        }

        if let Err(e) = self.message_pusher.push_to_sessions(targets, message).await {
            tracing::warn!("Failed to relay message to '{}': {}", recipient, e);
        }
        delivered
    }
}
