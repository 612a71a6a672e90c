//! Client-local typing-expiry timer.
//!
//! Each keystroke reschedules the stop-typing emission; switching chats
//! cancels it outright. A timer that leaks past a chat switch is a no-op:
//! the callback re-checks the selected-chat cell at fire time, not at
//! schedule time.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

use crate::state::SelectedChat;

pub const TYPING_EXPIRY: Duration = Duration::from_millis(2000);

/// One pending stop-typing emission at most
#[derive(Debug)]
pub struct TypingTimer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl TypingTimer {
    pub fn new() -> Self {
        Self::with_delay(TYPING_EXPIRY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Cancel the previous schedule and arm a new one. When the delay
    /// elapses, `on_expire` runs only if `chat_id` is still the selected
    /// chat.
    pub fn reschedule<F>(&mut self, selected: SelectedChat, chat_id: String, on_expire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if selected.is_current(&chat_id) {
                on_expire();
            } else {
                trace!(%chat_id, "typing timer fired after chat switch, dropped");
            }
        }));
    }

    /// Cancel the pending emission, if any. Synchronous; safe to call on a
    /// timer that has already fired.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Default for TypingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TypingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_timer_fires_when_chat_still_selected() {
        // テスト項目: 選択中のチャットに対してタイマーが発火する
        // given (前提条件):
        let selected = SelectedChat::new();
        selected.set(Some("C1".to_string()));
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = TypingTimer::with_delay(Duration::from_millis(25));

        // when (操作):
        let counter = Arc::clone(&fired);
        timer.reschedule(selected.clone(), "C1".to_string(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        // then (期待する結果):
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_leaked_timer_is_noop_after_chat_switch() {
        // テスト項目: チャット切り替え後に発火したタイマーは no-op になる
        // given (前提条件):
        let selected = SelectedChat::new();
        selected.set(Some("C1".to_string()));
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = TypingTimer::with_delay(Duration::from_millis(25));

        let counter = Arc::clone(&fired);
        timer.reschedule(selected.clone(), "C1".to_string(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // when (操作): タイマー発火前に別チャットへ切り替え
        selected.set(Some("C2".to_string()));
        tokio::time::sleep(Duration::from_millis(100)).await;

        // then (期待する結果):
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reschedule_cancels_previous_emission() {
        // テスト項目: 再スケジュールで前のタイマーが打ち消される
        // given (前提条件):
        let selected = SelectedChat::new();
        selected.set(Some("C1".to_string()));
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = TypingTimer::with_delay(Duration::from_millis(50));

        // when (操作): 2 回連続でスケジュール
        for _ in 0..2 {
            let counter = Arc::clone(&fired);
            timer.reschedule(selected.clone(), "C1".to_string(), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(150)).await;

        // then (期待する結果): 発火は 1 回だけ
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_prevents_firing() {
        // テスト項目: cancel 後はタイマーが発火しない
        // given (前提条件):
        let selected = SelectedChat::new();
        selected.set(Some("C1".to_string()));
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = TypingTimer::with_delay(Duration::from_millis(25));

        let counter = Arc::clone(&fired);
        timer.reschedule(selected.clone(), "C1".to_string(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // when (操作):
        timer.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // then (期待する結果):
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
