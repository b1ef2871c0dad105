use std::sync::Arc;

use crate::attachment::model::Attachment;
use crate::attachment::service::AttachmentService;
use crate::cache::{ConversationCache, MessageCache};
use crate::conversation::model::ConversationView;
use crate::conversation::repository::RestConversationRepository;
use crate::conversation::service::ConversationService;
use crate::event::service::{EventService, Subscription};
use crate::integration;
use crate::integration::storage::ProgressFn;
use crate::message::model::{Message, NewMessage};
use crate::message::repository::RestMessageRepository;
use crate::message::service::MessageService;
use crate::{attachment, conversation, event, message, user};

/// Composition root for the messaging layer. Explicitly constructed with its
/// injected collaborators and owns both caches; `cleanup` is the correct call
/// on logout, since leaked subscriptions would keep delivering events against
/// a destroyed session.
#[derive(Clone)]
pub struct MessagingService {
    message_service: MessageService,
    conversation_service: ConversationService,
    attachment_service: AttachmentService,
    event_service: EventService,
    message_cache: MessageCache,
    conversation_cache: ConversationCache,
}

impl MessagingService {
    pub fn new(
        message_repository: message::Repository,
        conversation_repository: conversation::Repository,
        pubsub: event::PubSub,
        storage: attachment::Storage,
    ) -> Self {
        let message_cache = MessageCache::default();
        let conversation_cache = ConversationCache::default();

        let event_service = EventService::new(pubsub, message_cache.clone());
        let conversation_service = ConversationService::new(
            conversation_repository,
            message_repository.clone(),
            conversation_cache.clone(),
        );
        let message_service = MessageService::new(
            message_repository,
            conversation_service.clone(),
            event_service.clone(),
            message_cache.clone(),
        );
        let attachment_service = AttachmentService::new(storage);

        Self {
            message_service,
            conversation_service,
            attachment_service,
            event_service,
            message_cache,
            conversation_cache,
        }
    }

    /// Wires the whole stack from environment configuration.
    pub async fn init(config: &integration::Config) -> anyhow::Result<Self> {
        let http = integration::init_http_client();

        let backend = config.backend.connect(http.clone())?;
        let storage = config.storage.connect(http)?;

        let pubsub = match &config.pubsub {
            Some(pubsub) => pubsub.connect().await,
            None => anyhow::bail!("realtime transport is not configured"),
        };

        Ok(Self::new(
            Arc::new(RestMessageRepository::new(backend.clone())),
            Arc::new(RestConversationRepository::new(backend)),
            Arc::new(pubsub),
            Arc::new(storage),
        ))
    }
}

impl MessagingService {
    pub async fn load_messages(
        &self,
        conversation_id: &conversation::Id,
        limit: usize,
        offset: usize,
        use_cache: bool,
    ) -> message::Result<Vec<Message>> {
        self.message_service
            .find_page(conversation_id, limit, offset, use_cache)
            .await
    }

    pub async fn send_message(
        &self,
        conversation_id: &conversation::Id,
        sender_id: &user::Id,
        text: Option<&str>,
        media_urls: Vec<String>,
    ) -> message::Result<Message> {
        let new_message = NewMessage::new(
            conversation_id.clone(),
            sender_id.clone(),
            text,
            media_urls,
        );

        self.message_service.create(&new_message).await
    }

    pub async fn upload_attachment(
        &self,
        attachment: &Attachment,
        conversation_id: &conversation::Id,
        on_progress: Option<ProgressFn>,
    ) -> attachment::Result<String> {
        self.attachment_service
            .upload(attachment, conversation_id, on_progress)
            .await
    }

    pub async fn load_conversations(
        &self,
        user_id: &user::Id,
        use_cache: bool,
    ) -> conversation::Result<Vec<ConversationView>> {
        self.conversation_service.find_all(user_id, use_cache).await
    }

    pub async fn mark_messages_as_read(
        &self,
        conversation_id: &conversation::Id,
        user_id: &user::Id,
    ) -> message::Result<()> {
        self.message_service
            .mark_read(conversation_id, user_id)
            .await
    }

    pub async fn subscribe_to_messages(
        &self,
        conversation_id: &conversation::Id,
        on_message: impl Fn(Message) + Send + Sync + 'static,
        on_error: impl Fn(event::Error) + Send + Sync + 'static,
    ) -> event::Result<Subscription> {
        self.event_service
            .subscribe_to_messages(conversation_id, on_message, on_error)
            .await
    }

    pub async fn subscribe_to_typing(
        &self,
        conversation_id: &conversation::Id,
        user_id: &user::Id,
        on_change: impl Fn(Vec<user::Id>) + Send + Sync + 'static,
    ) -> event::Result<Subscription> {
        self.event_service
            .subscribe_to_typing(conversation_id, user_id, on_change)
            .await
    }

    pub async fn send_typing_indicator(
        &self,
        conversation_id: &conversation::Id,
        user_id: &user::Id,
        is_typing: bool,
    ) -> event::Result<()> {
        self.event_service
            .send_typing_indicator(conversation_id, user_id, is_typing)
            .await
    }

    pub async fn get_or_create_direct_conversation(
        &self,
        one: &user::Id,
        two: &user::Id,
    ) -> conversation::Result<conversation::Id> {
        self.conversation_service.get_or_create_direct(one, two).await
    }

    pub async fn clear_all_caches(&self) {
        self.message_cache.clear().await;
        self.conversation_cache.clear().await;
    }

    /// Tears down every open subscription, then clears both caches.
    pub async fn cleanup(&self) {
        self.event_service.shutdown().await;
        self.clear_all_caches().await;
    }

    pub const fn events(&self) -> &EventService {
        &self.event_service
    }
}
