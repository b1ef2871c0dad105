use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::conversation;
use crate::conversation::model::ConversationView;
use crate::message::model::Message;
use crate::user;

/// Exact composite key for a cached message page. A query for a different
/// offset or limit is always a miss, even when the data overlaps.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct PageKey {
    pub conversation_id: conversation::Id,
    pub limit: usize,
    pub offset: usize,
}

impl PageKey {
    pub fn new(conversation_id: conversation::Id, limit: usize, offset: usize) -> Self {
        Self {
            conversation_id,
            limit,
            offset,
        }
    }
}

/// Process-lifetime page cache. No TTL; invalidated explicitly, never on a timer.
#[derive(Clone, Default)]
pub struct MessageCache {
    pages: Arc<RwLock<HashMap<PageKey, Vec<Message>>>>,
}

impl MessageCache {
    pub async fn get(&self, key: &PageKey) -> Option<Vec<Message>> {
        self.pages.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: PageKey, page: Vec<Message>) {
        self.pages.write().await.insert(key, page);
    }

    /// Coarse invalidation: drops every cached page of the conversation,
    /// not just the affected one.
    pub async fn invalidate(&self, conversation_id: &conversation::Id) {
        self.pages
            .write()
            .await
            .retain(|key, _| key.conversation_id != *conversation_id);
    }

    pub async fn contains(&self, key: &PageKey) -> bool {
        self.pages.read().await.contains_key(key)
    }

    pub async fn clear(&self) {
        self.pages.write().await.clear();
    }
}

/// Per-user conversation list cache with the same explicit invalidation policy.
#[derive(Clone, Default)]
pub struct ConversationCache {
    lists: Arc<RwLock<HashMap<user::Id, Vec<ConversationView>>>>,
}

impl ConversationCache {
    pub async fn get(&self, user_id: &user::Id) -> Option<Vec<ConversationView>> {
        self.lists.read().await.get(user_id).cloned()
    }

    pub async fn insert(&self, user_id: user::Id, conversations: Vec<ConversationView>) {
        self.lists.write().await.insert(user_id, conversations);
    }

    pub async fn invalidate(&self, user_id: &user::Id) {
        self.lists.write().await.remove(user_id);
    }

    pub async fn clear(&self) {
        self.lists.write().await.clear();
    }
}
