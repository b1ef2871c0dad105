use chrono::Utc;
use log::error;

use crate::cache::{MessageCache, PageKey};
use crate::conversation::service::ConversationService;
use crate::event::service::EventService;
use crate::{conversation, message, user};

use super::model::{Message, NewMessage};

#[derive(Clone)]
pub struct MessageService {
    repository: message::Repository,
    conversation_service: ConversationService,
    event_service: EventService,
    cache: MessageCache,
}

impl MessageService {
    pub fn new(
        repository: message::Repository,
        conversation_service: ConversationService,
        event_service: EventService,
        cache: MessageCache,
    ) -> Self {
        Self {
            repository,
            conversation_service,
            event_service,
            cache,
        }
    }
}

impl MessageService {
    /// A page of messages ordered by creation time ascending. Cache hits are
    /// exact-key only; a different offset or limit always refetches.
    pub async fn find_page(
        &self,
        conversation_id: &conversation::Id,
        limit: usize,
        offset: usize,
        use_cache: bool,
    ) -> super::Result<Vec<Message>> {
        let key = PageKey::new(conversation_id.clone(), limit, offset);

        if use_cache {
            if let Some(page) = self.cache.get(&key).await {
                return Ok(page);
            }
        }

        let page = self
            .repository
            .find_page(conversation_id, limit, offset)
            .await
            .inspect_err(|e| error!("failed to load messages for {conversation_id}: {e:?}"))?;

        self.cache.insert(key, page.clone()).await;

        Ok(page)
    }

    /// Persists the message, drops every cached page of the conversation,
    /// bumps the conversation's last-message time and fans the insert out on
    /// the conversation's channel. Nothing optimistic is written to the
    /// cache, so a failed send leaves no state to roll back.
    pub async fn create(&self, new_message: &NewMessage) -> super::Result<Message> {
        let message = self
            .repository
            .insert(new_message)
            .await
            .inspect_err(|e| error!("failed to persist message: {e:?}"))?;

        self.cache.invalidate(message.conversation_id()).await;

        self.conversation_service.update_last_message(&message).await?;

        self.event_service.publish_new_message(&message).await?;

        Ok(message)
    }

    /// Sets `read_at` for all messages in the conversation not sent by
    /// `reader` and not already read. Reapplying has no additional effect.
    pub async fn mark_read(
        &self,
        conversation_id: &conversation::Id,
        reader: &user::Id,
    ) -> super::Result<()> {
        self.repository
            .mark_read(conversation_id, reader, Utc::now())
            .await
            .inspect_err(|e| error!("failed to mark messages read in {conversation_id}: {e:?}"))?;

        self.cache.invalidate(conversation_id).await;
        self.conversation_service.invalidate_for(reader).await;

        Ok(())
    }
}
