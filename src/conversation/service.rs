use std::collections::HashMap;

use log::error;

use crate::cache::ConversationCache;
use crate::message::model::Message;
use crate::{conversation, message, user};

use super::model::{ConversationView, Member};

#[derive(Clone)]
pub struct ConversationService {
    repository: conversation::Repository,
    message_repository: message::Repository,
    cache: ConversationCache,
}

impl ConversationService {
    pub fn new(
        repository: conversation::Repository,
        message_repository: message::Repository,
        cache: ConversationCache,
    ) -> Self {
        Self {
            repository,
            message_repository,
            cache,
        }
    }
}

impl ConversationService {
    /// Two-step read: resolve the user's conversation ids, then batch fetch
    /// conversations, membership profiles and unread counts for exactly
    /// those ids. The enriched result is cached per user.
    pub async fn find_all(
        &self,
        user_id: &user::Id,
        use_cache: bool,
    ) -> super::Result<Vec<ConversationView>> {
        if use_cache {
            if let Some(cached) = self.cache.get(user_id).await {
                return Ok(cached);
            }
        }

        let ids = self
            .repository
            .find_ids_by_member(user_id)
            .await
            .inspect_err(|e| error!("failed to resolve conversation ids for {user_id}: {e:?}"))?;

        let conversations = self.repository.find_by_ids(&ids).await?;
        let members = self.repository.find_members(&ids).await?;
        let unread = self
            .message_repository
            .unread_counts(&ids, user_id)
            .await
            .inspect_err(|e| error!("failed to count unread messages for {user_id}: {e:?}"))
            .map_err(Box::new)?;

        let mut members_by_conversation: HashMap<conversation::Id, Vec<Member>> = HashMap::new();
        for member in members {
            members_by_conversation
                .entry(member.conversation_id.clone())
                .or_default()
                .push(member);
        }

        let views = conversations
            .into_iter()
            .map(|conversation| {
                let members = members_by_conversation
                    .remove(&conversation.id)
                    .unwrap_or_default();

                let other_user = if conversation.is_group {
                    None
                } else {
                    members
                        .iter()
                        .find(|m| m.user_id != *user_id)
                        .map(|m| m.profile.clone())
                };

                let unread_count = unread.get(&conversation.id).copied().unwrap_or(0);

                ConversationView::new(conversation, members, other_user, unread_count)
            })
            .collect::<Vec<_>>();

        self.cache.insert(user_id.clone(), views.clone()).await;

        Ok(views)
    }

    /// Returns the direct conversation between the two users, creating it
    /// when absent. Lookup is order-independent; creation invalidates both
    /// users' cached lists.
    pub async fn get_or_create_direct(
        &self,
        one: &user::Id,
        two: &user::Id,
    ) -> super::Result<conversation::Id> {
        if let Some(id) = self.repository.find_direct(one, two).await? {
            return Ok(id);
        }

        let id = self
            .repository
            .create_direct(one, two)
            .await
            .inspect_err(|e| error!("failed to create direct conversation: {e:?}"))?;

        self.cache.invalidate(one).await;
        self.cache.invalidate(two).await;

        Ok(id)
    }

    /// Advisory bump of the conversation's last-message time after a send.
    pub async fn update_last_message(&self, message: &Message) -> super::Result<()> {
        self.repository
            .touch_last_message(message.conversation_id(), message.created_at())
            .await
    }

    pub async fn invalidate_for(&self, user_id: &user::Id) {
        self.cache.invalidate(user_id).await;
    }
}
