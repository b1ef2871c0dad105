use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, broadcast};

use alumni_messaging::conversation::model::{Conversation, Member};
use alumni_messaging::conversation::repository::ConversationRepository;
use alumni_messaging::event::{EventStream, PubSubClient, Subject};
use alumni_messaging::integration;
use alumni_messaging::integration::storage::{ProgressFn, StorageClient};
use alumni_messaging::message::model::{Message, NewMessage};
use alumni_messaging::message::repository::MessageRepository;
use alumni_messaging::user::model::Profile;
use alumni_messaging::{MessagingService, conversation, message, user};

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
    pub fetches: AtomicUsize,
    pub fail_unread_counts: AtomicBool,
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn find_page(
        &self,
        conversation_id: &conversation::Id,
        limit: usize,
        offset: usize,
    ) -> message::Result<Vec<Message>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let mut page = self
            .messages
            .lock()
            .await
            .iter()
            .filter(|m| m.conversation_id() == conversation_id)
            .cloned()
            .collect::<Vec<_>>();
        page.sort_by_key(Message::created_at);

        Ok(page.into_iter().skip(offset).take(limit).collect())
    }

    async fn insert(&self, new_message: &NewMessage) -> message::Result<Message> {
        let message = Message::new(
            message::Id::random(),
            new_message.conversation_id().clone(),
            new_message.sender_id().clone(),
            new_message.text().map(String::from),
            new_message.media_urls().to_vec(),
            Utc::now(),
            new_message.reply_to().cloned(),
        );

        self.messages.lock().await.push(message.clone());

        Ok(message)
    }

    async fn mark_read(
        &self,
        conversation_id: &conversation::Id,
        reader: &user::Id,
        at: DateTime<Utc>,
    ) -> message::Result<()> {
        for message in self.messages.lock().await.iter_mut() {
            if message.conversation_id() == conversation_id && message.sender_id() != reader {
                message.mark_read(at);
            }
        }

        Ok(())
    }

    async fn unread_counts(
        &self,
        conversation_ids: &[conversation::Id],
        reader: &user::Id,
    ) -> message::Result<HashMap<conversation::Id, i64>> {
        if self.fail_unread_counts.load(Ordering::SeqCst) {
            return Err(integration::Error::Unexpected("unread counts unavailable".into()).into());
        }

        let mut counts = HashMap::new();

        for message in self.messages.lock().await.iter() {
            if conversation_ids.contains(message.conversation_id())
                && message.sender_id() != reader
                && message.read_at().is_none()
            {
                *counts.entry(message.conversation_id().clone()).or_insert(0) += 1;
            }
        }

        Ok(counts)
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: Mutex<Vec<Conversation>>,
    members: Mutex<Vec<Member>>,
    profiles: Mutex<HashMap<user::Id, Profile>>,
    pub fetches: AtomicUsize,
}

impl InMemoryConversationRepository {
    pub async fn add_profile(&self, profile: Profile) {
        self.profiles
            .lock()
            .await
            .insert(profile.id.clone(), profile);
    }

    pub async fn count(&self) -> usize {
        self.conversations.lock().await.len()
    }

    async fn profile_for(&self, user_id: &user::Id) -> Profile {
        self.profiles
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Profile {
                id: user_id.clone(),
                first_name: "Test".into(),
                last_name: "User".into(),
                avatar_url: None,
            })
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_ids_by_member(
        &self,
        user_id: &user::Id,
    ) -> conversation::Result<Vec<conversation::Id>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .members
            .lock()
            .await
            .iter()
            .filter(|m| m.user_id == *user_id)
            .map(|m| m.conversation_id.clone())
            .collect())
    }

    async fn find_by_ids(
        &self,
        ids: &[conversation::Id],
    ) -> conversation::Result<Vec<Conversation>> {
        let mut conversations = self
            .conversations
            .lock()
            .await
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect::<Vec<_>>();

        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));

        Ok(conversations)
    }

    async fn find_members(&self, ids: &[conversation::Id]) -> conversation::Result<Vec<Member>> {
        Ok(self
            .members
            .lock()
            .await
            .iter()
            .filter(|m| ids.contains(&m.conversation_id))
            .cloned()
            .collect())
    }

    async fn find_direct(
        &self,
        one: &user::Id,
        two: &user::Id,
    ) -> conversation::Result<Option<conversation::Id>> {
        Ok(self
            .conversations
            .lock()
            .await
            .iter()
            .find(|c| {
                !c.is_group
                    && ((c.participant_one.as_ref() == Some(one)
                        && c.participant_two.as_ref() == Some(two))
                        || (c.participant_one.as_ref() == Some(two)
                            && c.participant_two.as_ref() == Some(one)))
            })
            .map(|c| c.id.clone()))
    }

    async fn create_direct(
        &self,
        one: &user::Id,
        two: &user::Id,
    ) -> conversation::Result<conversation::Id> {
        let conversation = Conversation {
            id: conversation::Id::random(),
            is_group: false,
            title: None,
            participant_one: Some(one.clone()),
            participant_two: Some(two.clone()),
            last_message_at: None,
        };
        let id = conversation.id.clone();

        self.conversations.lock().await.push(conversation);

        let mut members = self.members.lock().await;
        for user_id in [one, two] {
            members.push(Member {
                conversation_id: id.clone(),
                user_id: user_id.clone(),
                joined_at: Utc::now(),
                role: None,
                profile: self.profile_for(user_id).await,
            });
        }

        Ok(id)
    }

    async fn touch_last_message(
        &self,
        id: &conversation::Id,
        at: DateTime<Utc>,
    ) -> conversation::Result<()> {
        for conversation in self.conversations.lock().await.iter_mut() {
            if conversation.id == *id {
                conversation.last_message_at = Some(at);
            }
        }

        Ok(())
    }
}

pub struct FakePubSub {
    channels: Mutex<HashMap<String, broadcast::Sender<Bytes>>>,
    pub published: AtomicUsize,
}

impl Default for FakePubSub {
    fn default() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            published: AtomicUsize::new(0),
        }
    }
}

impl FakePubSub {
    async fn sender(&self, subject: &Subject) -> broadcast::Sender<Bytes> {
        self.channels
            .lock()
            .await
            .entry(subject.to_string())
            .or_insert_with(|| broadcast::channel(16).0)
            .clone()
    }
}

#[async_trait]
impl PubSubClient for FakePubSub {
    async fn subscribe(&self, subject: &Subject) -> integration::Result<EventStream> {
        let mut rx = self.sender(subject).await.subscribe();

        let stream = async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(payload) => yield payload,
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn publish(&self, subject: &Subject, payload: Bytes) -> integration::Result<()> {
        self.published.fetch_add(1, Ordering::SeqCst);

        // delivery to zero subscribers is not an error
        let _ = self.sender(subject).await.send(payload);

        Ok(())
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub uploads: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl StorageClient for FakeStorage {
    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        _content_type: &str,
        on_progress: Option<ProgressFn>,
    ) -> integration::Result<String> {
        if let Some(report) = &on_progress {
            report(0);
            report(100);
        }

        self.uploads.lock().await.push((path.to_string(), data.len()));

        Ok(format!("https://cdn.example.com/{path}"))
    }
}

pub struct TestBed {
    pub service: MessagingService,
    pub messages: Arc<InMemoryMessageRepository>,
    pub conversations: Arc<InMemoryConversationRepository>,
    pub pubsub: Arc<FakePubSub>,
    pub storage: Arc<FakeStorage>,
}

pub fn messaging_service() -> TestBed {
    let messages = Arc::new(InMemoryMessageRepository::default());
    let conversations = Arc::new(InMemoryConversationRepository::default());
    let pubsub = Arc::new(FakePubSub::default());
    let storage = Arc::new(FakeStorage::default());

    let service = MessagingService::new(
        messages.clone(),
        conversations.clone(),
        pubsub.clone(),
        storage.clone(),
    );

    TestBed {
        service,
        messages,
        conversations,
        pubsub,
        storage,
    }
}
