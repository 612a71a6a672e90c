//! インメモリの永続化コラボレータ実装
//!
//! CLI バイナリとテストで使用します。耐久性は本システムのスコープ外の
//! ため、プロセスローカルの HashMap で十分です。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::model::{Chat, ChatMessage, LastMessage};

use super::{ChatDirectoryStore, MessageStore, StoreError};

/// In-memory implementation of both collaborator traits
pub struct InMemoryStore {
    /// chat_id → 永続化済みメッセージ（古い順）
    messages: Mutex<HashMap<String, Vec<ChatMessage>>>,
    /// 全チャットのレコード
    chats: Mutex<Vec<Chat>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            chats: Mutex::new(Vec::new()),
        }
    }

    /// Create a store pre-seeded with chat records (for tests and demos)
    pub fn with_chats(chats: Vec<Chat>) -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            chats: Mutex::new(chats),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn fetch_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let messages = self.messages.lock().await;
        Ok(messages.get(chat_id).cloned().unwrap_or_default())
    }

    async fn persist_message(&self, message: &ChatMessage) -> Result<ChatMessage, StoreError> {
        // Assign the durable id; the local correlation id is echoed back
        let confirmed = ChatMessage {
            id: Some(Uuid::new_v4().to_string()),
            ..message.clone()
        };

        {
            let mut messages = self.messages.lock().await;
            messages
                .entry(confirmed.chat_id.clone())
                .or_default()
                .push(confirmed.clone());
        }

        // Keep the denormalized chat summary in sync
        let mut chats = self.chats.lock().await;
        if let Some(chat) = chats.iter_mut().find(|c| c.id == confirmed.chat_id) {
            chat.last_message = Some(LastMessage {
                text: confirmed.text.clone(),
                sender: confirmed.sender.clone(),
                created_at: confirmed.created_at,
            });
        }

        Ok(confirmed)
    }
}

#[async_trait]
impl ChatDirectoryStore for InMemoryStore {
    async fn fetch_chats(&self, user_id: &str) -> Result<Vec<Chat>, StoreError> {
        let chats = self.chats.lock().await;
        Ok(chats
            .iter()
            .filter(|c| c.members.iter().any(|m| m == user_id))
            .cloned()
            .collect())
    }

    async fn create_chat(&self, members: [String; 2]) -> Result<Chat, StoreError> {
        let chat = Chat {
            id: Uuid::new_v4().to_string(),
            members,
            last_message: None,
            unread_message_count: 0,
        };
        let mut chats = self.chats.lock().await;
        chats.push(chat.clone());
        Ok(chat)
    }

    async fn clear_unread(&self, chat_id: &str) -> Result<Chat, StoreError> {
        let mut chats = self.chats.lock().await;
        let chat = chats
            .iter_mut()
            .find(|c| c.id == chat_id)
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.to_string()))?;
        chat.unread_message_count = 0;
        Ok(chat.clone())
    }
}
