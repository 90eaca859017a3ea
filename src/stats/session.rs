//! Per-chat stats session state

use crate::stats::category::StatsCategory;
use crate::types::ChatId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Which stats category each chat currently shows
#[derive(Debug, Default)]
pub struct StatsSessions {
    current: RwLock<HashMap<ChatId, StatsCategory>>,
}

impl StatsSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self, chat_id: ChatId) -> Option<StatsCategory> {
        self.current.read().await.get(&chat_id).copied()
    }

    pub async fn set(&self, chat_id: ChatId, category: StatsCategory) {
        self.current.write().await.insert(chat_id, category);
    }

    /// Forget the chat's category, as when the overview is reopened
    pub async fn reset(&self, chat_id: ChatId) {
        self.current.write().await.remove(&chat_id);
    }
}
