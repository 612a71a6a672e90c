//! UseCase: タイピングシグナル中継処理
//!
//! ## 概要
//!
//! `typing` / `stop-typing` を受信者のセッションだけに転送します。
//! ブロードキャストは行いません。シグナルは一時的なもので、配送漏れは
//! 後続のシグナルか実メッセージの受信で解消されます（サーバー側での
//! タイムアウト強制は行わない）。

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, MessagePusher, UserId};

/// タイピングシグナル中継のユースケース
pub struct RelayTypingUseCase {
    /// ConnectionRegistry（接続状態の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayTypingUseCase {
    /// 新しい RelayTypingUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// シグナル中継を実行
    ///
    /// # Arguments
    ///
    /// * `receiver` - シグナルの宛先ユーザー ID
    /// * `message` - 転送する JSON イベント（typing / stop-typing）
    pub async fn execute(&self, receiver: &UserId, message: &str) {
        let targets = self.registry.sessions_for(receiver).await;
        if targets.is_empty() {
            tracing::debug!("Receiver '{}' offline, typing signal dropped", receiver);
            return;
        }
        if let Err(e) = self.message_pusher.push_to_sessions(targets, message).await {
            tracing::warn!("Failed to relay typing signal to '{}': {}", receiver, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionId;
    use crate::infrastructure::{InMemoryConnectionRegistry, WebSocketMessagePusher};
    use crate::usecase::JoinRoomUseCase;
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_typing_forwarded_only_to_receiver() {
        // テスト項目: typing シグナルが宛先のセッションだけに転送される
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let join = JoinRoomUseCase::new(registry.clone(), pusher.clone());
        let relay = RelayTypingUseCase::new(registry, pusher);

        let (tx_alice, mut rx_alice) = mpsc::unbounded_channel();
        let (tx_bob, mut rx_bob) = mpsc::unbounded_channel();
        let (tx_carol, mut rx_carol) = mpsc::unbounded_channel();
        join.execute(user("alice"), SessionId::generate(), tx_alice)
            .await;
        join.execute(user("bob"), SessionId::generate(), tx_bob)
            .await;
        join.execute(user("carol"), SessionId::generate(), tx_carol)
            .await;

        // when (操作): alice → bob の typing を中継する
        relay.execute(&user("bob"), r#"{"type":"typing"}"#).await;

        // then (期待する結果): bob だけに届く
        assert!(rx_bob.recv().await.unwrap().contains("typing"));
        assert!(rx_alice.try_recv().is_err());
        assert!(rx_carol.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_typing_to_offline_receiver_is_dropped() {
        // テスト項目: 宛先がオフラインならシグナルは黙って破棄される
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let relay = RelayTypingUseCase::new(registry, pusher);

        // when (操作) / then (期待する結果): パニックもエラーも起きない
        relay.execute(&user("bob"), r#"{"type":"typing"}"#).await;
    }
}
