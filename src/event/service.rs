use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use log::{debug, error};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::cache::MessageCache;
use crate::message::model::Message;
use crate::{conversation, event, user};

use super::Subject;
use super::model::{Notification, TypingStatus};

type Subscriptions = Arc<RwLock<HashMap<Subject, JoinHandle<()>>>>;
type TypingState = Arc<RwLock<HashMap<conversation::Id, HashMap<user::Id, TypingStatus>>>>;

/// Handle for one live subscription. Consuming `unsubscribe` releases the
/// underlying channel and removes the registry entry, exactly once.
pub struct Subscription {
    subject: Subject,
    subscriptions: Subscriptions,
}

impl Subscription {
    pub async fn unsubscribe(self) {
        if let Some(handle) = self.subscriptions.write().await.remove(&self.subject) {
            handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct EventService {
    pubsub: event::PubSub,
    message_cache: MessageCache,
    subscriptions: Subscriptions,
    typing: TypingState,
}

impl EventService {
    pub fn new(pubsub: event::PubSub, message_cache: MessageCache) -> Self {
        Self {
            pubsub,
            message_cache,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            typing: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl EventService {
    /// Opens a subscription for inserts in the conversation. Any subscription
    /// already held under the same key is torn down first, so a single backend
    /// event is never delivered twice.
    pub async fn subscribe_to_messages(
        &self,
        conversation_id: &conversation::Id,
        on_message: impl Fn(Message) + Send + Sync + 'static,
        on_error: impl Fn(event::Error) + Send + Sync + 'static,
    ) -> super::Result<Subscription> {
        let subject = Subject::Messages(conversation_id.clone());
        self.release(&subject).await;

        let mut stream = self.pubsub.subscribe(&subject).await?;

        let cache = self.message_cache.clone();
        let conversation_id = conversation_id.clone();

        let handle = tokio::spawn(async move {
            while let Some(payload) = stream.next().await {
                match serde_json::from_slice::<Notification>(&payload) {
                    Ok(Notification::NewMessage { message }) => {
                        cache.invalidate(&conversation_id).await;
                        on_message(message);
                    }
                    Err(e) => {
                        error!("failed to deserialize message event: {e:?}");
                        on_error(e.into());
                    }
                }
            }
        });

        self.register(subject.clone(), handle).await;

        Ok(Subscription {
            subject,
            subscriptions: self.subscriptions.clone(),
        })
    }

    /// Tracks per-user typing state for the conversation and reports the set
    /// of other users currently typing on every change. Announces the local
    /// user as not typing right after subscribing.
    pub async fn subscribe_to_typing(
        &self,
        conversation_id: &conversation::Id,
        user_id: &user::Id,
        on_change: impl Fn(Vec<user::Id>) + Send + Sync + 'static,
    ) -> super::Result<Subscription> {
        let subject = Subject::Typing(conversation_id.clone());
        self.release(&subject).await;

        let mut stream = self.pubsub.subscribe(&subject).await?;

        let typing = self.typing.clone();
        let me = user_id.clone();
        let conversation_id = conversation_id.clone();

        let handle = tokio::spawn(async move {
            while let Some(payload) = stream.next().await {
                let status = match serde_json::from_slice::<TypingStatus>(&payload) {
                    Ok(status) => status,
                    Err(e) => {
                        error!("failed to deserialize typing event: {e:?}");
                        continue;
                    }
                };

                let mut state = typing.write().await;
                let conversation_state = state.entry(conversation_id.clone()).or_default();
                conversation_state.insert(status.user_id.clone(), status);

                let others = conversation_state
                    .values()
                    .filter(|s| s.typing && s.user_id != me)
                    .map(|s| s.user_id.clone())
                    .collect::<Vec<_>>();
                drop(state);

                on_change(others);
            }
        });

        self.register(subject.clone(), handle).await;

        let announce = TypingStatus::now(user_id.clone(), false);
        self.publish_typing(&subject, &announce).await?;

        Ok(Subscription {
            subject,
            subscriptions: self.subscriptions.clone(),
        })
    }

    /// Publishes the local user's typing state on the already-open channel.
    /// Silently no-ops when no typing channel is open for the conversation.
    pub async fn send_typing_indicator(
        &self,
        conversation_id: &conversation::Id,
        user_id: &user::Id,
        is_typing: bool,
    ) -> super::Result<()> {
        let subject = Subject::Typing(conversation_id.clone());

        if !self.subscriptions.read().await.contains_key(&subject) {
            debug!("no open typing channel for conversation {conversation_id}, dropping indicator");
            return Ok(());
        }

        let status = TypingStatus::now(user_id.clone(), is_typing);
        self.publish_typing(&subject, &status).await
    }

    pub async fn publish_new_message(&self, message: &Message) -> super::Result<()> {
        let subject = Subject::Messages(message.conversation_id().clone());
        let payload = serde_json::to_vec(&Notification::NewMessage {
            message: message.clone(),
        })?;

        self.pubsub.publish(&subject, payload.into()).await?;
        Ok(())
    }

    pub async fn is_subscribed(&self, subject: &Subject) -> bool {
        self.subscriptions.read().await.contains_key(subject)
    }

    /// Tears down every open subscription and forgets all typing state.
    pub async fn shutdown(&self) {
        let mut subscriptions = self.subscriptions.write().await;
        for (_, handle) in subscriptions.drain() {
            handle.abort();
        }
        drop(subscriptions);

        self.typing.write().await.clear();
    }
}

impl EventService {
    async fn publish_typing(&self, subject: &Subject, status: &TypingStatus) -> super::Result<()> {
        let payload = serde_json::to_vec(status)?;
        self.pubsub.publish(subject, payload.into()).await?;
        Ok(())
    }

    async fn register(&self, subject: Subject, handle: JoinHandle<()>) {
        if let Some(previous) = self.subscriptions.write().await.insert(subject, handle) {
            previous.abort();
        }
    }

    async fn release(&self, subject: &Subject) {
        if let Some(previous) = self.subscriptions.write().await.remove(subject) {
            previous.abort();
        }
    }
}
