//! UseCase: セッション参加処理
//!
//! ## 概要
//!
//! `join-room` イベントを受けて、セッションをユーザー ID 配下に登録します。
//! 最初のセッションであればオンライン遷移が発生し、呼び出し側（UI 層）が
//! `user-online` を全セッションへブロードキャストします。
//! スナップショット（`online-users`）は登録直後の Registry 状態を反映します。

use std::sync::Arc;

use crate::domain::{
    ConnectionRegistry, MessagePushError, MessagePusher, PresenceTransition, PusherChannel,
    SessionId, UserId,
};

/// セッション参加のユースケース
pub struct JoinRoomUseCase {
    /// ConnectionRegistry（接続状態の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// セッション参加を実行
    ///
    /// # Arguments
    ///
    /// * `user_id` - 参加するユーザーの ID（Domain Model）
    /// * `session_id` - このトランスポート接続のセッション ID
    /// * `sender` - セッションへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// オンライン遷移の有無。再接続時の再アナウンスも同じ経路で処理され、
    /// 登録は冪等です。
    pub async fn execute(
        &self,
        user_id: UserId,
        session_id: SessionId,
        sender: PusherChannel,
    ) -> PresenceTransition {
        self.message_pusher
            .register_session(session_id.clone(), sender)
            .await;
        self.registry.register(user_id, session_id).await
    }

    /// 現在オンラインのユーザー一覧を取得（スナップショット）
    pub async fn online_snapshot(&self) -> Vec<UserId> {
        self.registry.online_user_ids().await
    }

    /// 参加したセッションへスナップショットをユニキャスト
    pub async fn send_snapshot(
        &self,
        session_id: &SessionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(session_id, message).await
    }

    /// オンライン遷移を全セッションへブロードキャスト
    ///
    /// 新規参加者自身のセッションも対象に含まれます（どのビューアの
    /// ディレクトリでもオンラインバッジの更新が必要になるため）。
    pub async fn broadcast_user_online(&self, message: &str) -> Result<(), String> {
        let targets = self.registry.all_session_ids().await;
        self.message_pusher
            .push_to_sessions(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{InMemoryConnectionRegistry, WebSocketMessagePusher};
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn create_usecase() -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            Arc::new(InMemoryConnectionRegistry::new()),
            Arc::new(WebSocketMessagePusher::new()),
        )
    }

    #[tokio::test]
    async fn test_first_session_triggers_online_transition() {
        // テスト項目: 最初のセッション参加でオンライン遷移が返される
        // given (前提条件):
        let usecase = create_usecase();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let transition = usecase
            .execute(user("alice"), SessionId::generate(), tx)
            .await;

        // then (期待する結果):
        assert_eq!(transition, PresenceTransition::CameOnline);
        assert_eq!(usecase.online_snapshot().await, vec![user("alice")]);
    }

    #[tokio::test]
    async fn test_second_session_does_not_retrigger_transition() {
        // テスト項目: マルチタブ相当の 2 本目のセッションでは遷移しない
        // given (前提条件):
        let usecase = create_usecase();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        usecase
            .execute(user("alice"), SessionId::generate(), tx1)
            .await;

        // when (操作):
        let transition = usecase
            .execute(user("alice"), SessionId::generate(), tx2)
            .await;

        // then (期待する結果):
        assert_eq!(transition, PresenceTransition::AlreadyOnline);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_state_at_registration() {
        // テスト項目: スナップショットが登録直後の状態を反映する
        //             （新規参加者自身も含まれる）
        // given (前提条件):
        let usecase = create_usecase();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        usecase
            .execute(user("bob"), SessionId::generate(), tx1)
            .await;

        // when (操作):
        usecase
            .execute(user("alice"), SessionId::generate(), tx2)
            .await;
        let snapshot = usecase.online_snapshot().await;

        // then (期待する結果): ソート済みで両者が含まれる
        assert_eq!(snapshot, vec![user("alice"), user("bob")]);
    }

    #[tokio::test]
    async fn test_send_snapshot_unicasts_to_joining_session() {
        // テスト項目: スナップショットが参加したセッションだけに届く
        // given (前提条件):
        let usecase = create_usecase();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let existing = SessionId::generate();
        let joining = SessionId::generate();
        usecase.execute(user("bob"), existing, tx1).await;
        usecase.execute(user("alice"), joining.clone(), tx2).await;

        // when (操作):
        usecase
            .send_snapshot(&joining, r#"{"type":"online-users"}"#)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            rx2.recv().await,
            Some(r#"{"type":"online-users"}"#.to_string())
        );
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_user_online_reaches_all_sessions() {
        // テスト項目: user-online が全セッション（本人含む）に届く
        // given (前提条件):
        let usecase = create_usecase();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        usecase
            .execute(user("bob"), SessionId::generate(), tx1)
            .await;
        usecase
            .execute(user("alice"), SessionId::generate(), tx2)
            .await;

        // when (操作):
        usecase
            .broadcast_user_online(r#"{"type":"user-online","userId":"alice"}"#)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(rx1.recv().await.unwrap().contains("user-online"));
        assert!(rx2.recv().await.unwrap().contains("user-online"));
    }
}
