//! UseCase: セッション切断処理
//!
//! ## 概要
//!
//! トランスポート切断を受けて、セッションを Registry と Pusher の両方から
//! 取り除きます。最後のセッションが消えた場合だけ `user-offline` を
//! ブロードキャストします。切断処理は冪等であり、他のクリーンアップの後に
//! 再度呼ばれても安全です。

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, Disconnection, MessagePusher, SessionId};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    /// ConnectionRegistry（接続状態の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// セッション切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(Disconnection)` - セッションが登録されていた場合。
    ///   `went_offline` が真ならユーザーの最後のセッションだった。
    /// * `None` - 未知のセッション（既にクリーンアップ済み）。エラーではない。
    pub async fn execute(&self, session_id: &SessionId) -> Option<Disconnection> {
        self.message_pusher.unregister_session(session_id).await;
        self.registry.unregister(session_id).await
    }

    /// オフライン遷移を残りの全セッションへブロードキャスト
    pub async fn broadcast_user_offline(&self, message: &str) -> Result<(), String> {
        let targets = self.registry.all_session_ids().await;
        self.message_pusher
            .push_to_sessions(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
