use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::integration::backend::{Backend, in_filter};
use crate::{conversation, user};

use super::model::{Message, NewMessage};

const MESSAGES_TABLE: &str = "messages";

#[async_trait]
pub trait MessageRepository {
    /// One page of a conversation, ordered by creation time ascending.
    async fn find_page(
        &self,
        conversation_id: &conversation::Id,
        limit: usize,
        offset: usize,
    ) -> super::Result<Vec<Message>>;

    async fn insert(&self, new_message: &NewMessage) -> super::Result<Message>;

    /// Marks all messages in the conversation not sent by `reader` and not
    /// already read. Idempotent.
    async fn mark_read(
        &self,
        conversation_id: &conversation::Id,
        reader: &user::Id,
        at: DateTime<Utc>,
    ) -> super::Result<()>;

    /// Unread counts for all given conversations in a single batched query.
    async fn unread_counts(
        &self,
        conversation_ids: &[conversation::Id],
        reader: &user::Id,
    ) -> super::Result<HashMap<conversation::Id, i64>>;
}

#[derive(Deserialize)]
struct UnreadRow {
    conversation_id: conversation::Id,
}

#[derive(Clone)]
pub struct RestMessageRepository {
    backend: Backend,
}

impl RestMessageRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl MessageRepository for RestMessageRepository {
    async fn find_page(
        &self,
        conversation_id: &conversation::Id,
        limit: usize,
        offset: usize,
    ) -> super::Result<Vec<Message>> {
        let messages = self
            .backend
            .select::<Message>(
                MESSAGES_TABLE,
                &[
                    ("conversation_id", format!("eq.{conversation_id}")),
                    ("order", "created_at.asc".into()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        Ok(messages)
    }

    async fn insert(&self, new_message: &NewMessage) -> super::Result<Message> {
        let message = self
            .backend
            .insert::<NewMessage, Message>(MESSAGES_TABLE, new_message)
            .await?;

        Ok(message)
    }

    async fn mark_read(
        &self,
        conversation_id: &conversation::Id,
        reader: &user::Id,
        at: DateTime<Utc>,
    ) -> super::Result<()> {
        self.backend
            .update(
                MESSAGES_TABLE,
                &[
                    ("conversation_id", format!("eq.{conversation_id}")),
                    ("sender_id", format!("neq.{reader}")),
                    ("read_at", "is.null".into()),
                ],
                &serde_json::json!({ "read_at": at }),
            )
            .await?;

        Ok(())
    }

    async fn unread_counts(
        &self,
        conversation_ids: &[conversation::Id],
        reader: &user::Id,
    ) -> super::Result<HashMap<conversation::Id, i64>> {
        if conversation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self
            .backend
            .select::<UnreadRow>(
                MESSAGES_TABLE,
                &[
                    ("select", "conversation_id".into()),
                    ("conversation_id", in_filter(conversation_ids)),
                    ("sender_id", format!("neq.{reader}")),
                    ("read_at", "is.null".into()),
                ],
            )
            .await?;

        let mut counts = HashMap::new();
        for row in rows {
            *counts.entry(row.conversation_id).or_insert(0) += 1;
        }

        Ok(counts)
    }
}
