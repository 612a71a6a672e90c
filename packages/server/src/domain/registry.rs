//! Connection Registry trait 定義
//!
//! ユーザー ID と稼働中のセッション集合の対応を管理するインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 不変条件: ユーザーが「オンライン」であることと、そのセッション集合が
//! 空でないことは常に一致します。集合が空になったエントリは完全に削除されます。

use async_trait::async_trait;

use super::{SessionId, UserId};

/// Result of registering a session for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// This was the user's first live session; the user just came online
    CameOnline,
    /// The user already had at least one live session
    AlreadyOnline,
}

/// Result of unregistering a known session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnection {
    /// The user who owned the removed session
    pub user_id: UserId,
    /// Whether the user's session set became empty
    pub went_offline: bool,
}

/// Connection Registry trait
///
/// 登録・解除はすべて Registry 自身のロックで直列化されるため、呼び出し側での
/// 追加のロックは不要です。`unregister` は未知のセッションに対して no-op
/// （冪等）であることが要求されます。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Register a session under a user identity (idempotent add).
    async fn register(&self, user_id: UserId, session_id: SessionId) -> PresenceTransition;

    /// Remove a session from whichever user owns it. Returns `None` if the
    /// session is unknown (already cleaned up) — safe to call repeatedly.
    async fn unregister(&self, session_id: &SessionId) -> Option<Disconnection>;

    /// All live sessions for a user. Empty means "unreachable right now",
    /// not an error.
    async fn sessions_for(&self, user_id: &UserId) -> Vec<SessionId>;

    /// Snapshot of currently online users, used for the join-time unicast.
    async fn online_user_ids(&self) -> Vec<UserId>;

    /// All live sessions across all users (broadcast targets).
    async fn all_session_ids(&self) -> Vec<SessionId>;
}
