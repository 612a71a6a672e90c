//! InMemory Connection Registry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! HashMap をインメモリの登録簿として使用します。
//!
//! ユーザーごとのセッション集合 (`sessions_by_user`) と、セッションから
//! 所有ユーザーへの逆引き (`owner_by_session`) を同一の Mutex 配下で
//! 更新するため、両者が食い違うことはありません。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionRegistry, Disconnection, PresenceTransition, SessionId, UserId};

#[derive(Default)]
struct RegistryInner {
    /// user_id → 稼働中のセッション集合（空になったエントリは削除される）
    sessions_by_user: HashMap<UserId, HashSet<SessionId>>,
    /// session_id → 所有ユーザーの逆引き
    owner_by_session: HashMap<SessionId, UserId>,
}

/// インメモリ Connection Registry 実装
///
/// プロセス開始時に `AppState` の中で構築され、シャットダウンとともに
/// 破棄されます。グローバル変数としては公開されません。
pub struct InMemoryConnectionRegistry {
    inner: Mutex<RegistryInner>,
}

impl InMemoryConnectionRegistry {
    /// 新しい空の InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }
}

impl Default for InMemoryConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, user_id: UserId, session_id: SessionId) -> PresenceTransition {
        let mut inner = self.inner.lock().await;

        if let Some(owner) = inner.owner_by_session.get(&session_id) {
            if owner != &user_id {
                // A session announces its identity once; later announcements
                // under a different identity are ignored.
                tracing::warn!(
                    "Session '{}' already bound to '{}', ignoring re-bind to '{}'",
                    session_id,
                    owner,
                    user_id
                );
            }
            return PresenceTransition::AlreadyOnline;
        }

        inner
            .owner_by_session
            .insert(session_id.clone(), user_id.clone());
        let sessions = inner.sessions_by_user.entry(user_id).or_default();
        let was_empty = sessions.is_empty();
        sessions.insert(session_id);

        if was_empty {
            PresenceTransition::CameOnline
        } else {
            PresenceTransition::AlreadyOnline
        }
    }

    async fn unregister(&self, session_id: &SessionId) -> Option<Disconnection> {
        let mut inner = self.inner.lock().await;

        let user_id = inner.owner_by_session.remove(session_id)?;

        let went_offline = match inner.sessions_by_user.get_mut(&user_id) {
            Some(sessions) => {
                sessions.remove(session_id);
                sessions.is_empty()
            }
            None => true,
        };
        if went_offline {
            inner.sessions_by_user.remove(&user_id);
        }

        Some(Disconnection {
            user_id,
            went_offline,
        })
    }

    async fn sessions_for(&self, user_id: &UserId) -> Vec<SessionId> {
        let inner = self.inner.lock().await;
        inner
            .sessions_by_user
            .get(user_id)
            .map(|sessions| sessions.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn online_user_ids(&self) -> Vec<UserId> {
        let inner = self.inner.lock().await;
        let mut user_ids: Vec<UserId> = inner.sessions_by_user.keys().cloned().collect();
        // Sort for consistent ordering
        user_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        user_ids
    }

    async fn all_session_ids(&self) -> Vec<SessionId> {
        let inner = self.inner.lock().await;
        inner.owner_by_session.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_register_first_session_comes_online() {
        // テスト項目: 最初のセッション登録でユーザーがオンラインになる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let session = SessionId::generate();

        // when (操作):
        let transition = registry.register(user("alice"), session.clone()).await;

        // then (期待する結果):
        assert_eq!(transition, PresenceTransition::CameOnline);
        assert_eq!(registry.sessions_for(&user("alice")).await, vec![session]);
        assert_eq!(registry.online_user_ids().await, vec![user("alice")]);
    }

    #[tokio::test]
    async fn test_register_second_session_already_online() {
        // テスト項目: 2 つ目のセッション登録ではオンライン遷移が発生しない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        registry
            .register(user("alice"), SessionId::generate())
            .await;

        // when (操作):
        let transition = registry
            .register(user("alice"), SessionId::generate())
            .await;

        // then (期待する結果):
        assert_eq!(transition, PresenceTransition::AlreadyOnline);
        assert_eq!(registry.sessions_for(&user("alice")).await.len(), 2);
        // 複数セッションでもオンラインユーザーとしては 1 人
        assert_eq!(registry.online_user_ids().await, vec![user("alice")]);
    }

    #[tokio::test]
    async fn test_register_same_session_is_idempotent() {
        // テスト項目: 同一セッションの再登録が冪等である
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let session = SessionId::generate();
        registry.register(user("alice"), session.clone()).await;

        // when (操作): 再接続時の再アナウンスを想定して同じ登録を繰り返す
        let transition = registry.register(user("alice"), session.clone()).await;

        // then (期待する結果):
        assert_eq!(transition, PresenceTransition::AlreadyOnline);
        assert_eq!(registry.sessions_for(&user("alice")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unregister_last_session_goes_offline() {
        // テスト項目: 最後のセッション解除でユーザーがオフラインになる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let session = SessionId::generate();
        registry.register(user("alice"), session.clone()).await;

        // when (操作):
        let result = registry.unregister(&session).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Some(Disconnection {
                user_id: user("alice"),
                went_offline: true,
            })
        );
        assert!(registry.sessions_for(&user("alice")).await.is_empty());
        assert!(registry.online_user_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_keeps_user_online_while_sessions_remain() {
        // テスト項目: 他のセッションが残っている間はオフライン遷移が発生しない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let session1 = SessionId::generate();
        let session2 = SessionId::generate();
        registry.register(user("alice"), session1.clone()).await;
        registry.register(user("alice"), session2).await;

        // when (操作):
        let result = registry.unregister(&session1).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Some(Disconnection {
                user_id: user("alice"),
                went_offline: false,
            })
        );
        assert_eq!(registry.online_user_ids().await, vec![user("alice")]);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // テスト項目: 同じセッションを 2 回解除しても 1 回と同じ状態になる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let session = SessionId::generate();
        registry.register(user("alice"), session.clone()).await;
        registry.unregister(&session).await;

        // when (操作):
        let result = registry.unregister(&session).await;

        // then (期待する結果): 未知のセッションとして no-op になる
        assert_eq!(result, None);
        assert!(registry.online_user_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_unknown_session_is_noop() {
        // テスト項目: 登録されたことのないセッションの解除が no-op になる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        registry
            .register(user("alice"), SessionId::generate())
            .await;

        // when (操作):
        let result = registry.unregister(&SessionId::generate()).await;

        // then (期待する結果):
        assert_eq!(result, None);
        assert_eq!(registry.online_user_ids().await, vec![user("alice")]);
    }

    #[tokio::test]
    async fn test_online_iff_session_count_positive() {
        // テスト項目: register/unregister をどう並べても
        //             「オンライン ⟺ セッション数 > 0」が崩れない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let s1 = SessionId::generate();
        let s2 = SessionId::generate();

        // when (操作) / then (期待する結果): 各ステップで不変条件を確認する
        registry.register(user("alice"), s1.clone()).await;
        assert!(!registry.sessions_for(&user("alice")).await.is_empty());
        assert!(registry.online_user_ids().await.contains(&user("alice")));

        registry.register(user("alice"), s2.clone()).await;
        registry.unregister(&s1).await;
        assert!(!registry.sessions_for(&user("alice")).await.is_empty());
        assert!(registry.online_user_ids().await.contains(&user("alice")));

        registry.unregister(&s2).await;
        assert!(registry.sessions_for(&user("alice")).await.is_empty());
        assert!(!registry.online_user_ids().await.contains(&user("alice")));
    }

    #[tokio::test]
    async fn test_all_session_ids_spans_users() {
        // テスト項目: 全セッション一覧が全ユーザーのセッションを含む
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let s1 = SessionId::generate();
        let s2 = SessionId::generate();
        let s3 = SessionId::generate();
        registry.register(user("alice"), s1.clone()).await;
        registry.register(user("alice"), s2.clone()).await;
        registry.register(user("bob"), s3.clone()).await;

        // when (操作):
        let sessions = registry.all_session_ids().await;

        // then (期待する結果):
        assert_eq!(sessions.len(), 3);
        assert!(sessions.contains(&s1));
        assert!(sessions.contains(&s2));
        assert!(sessions.contains(&s3));
    }
}
