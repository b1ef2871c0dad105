use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::integration::backend::{Backend, in_filter};
use crate::{conversation, user};

use super::model::{Conversation, Member, NewConversation, NewMember};

const CONVERSATIONS_TABLE: &str = "conversations";
const MEMBERS_TABLE: &str = "conversation_members";

const MEMBER_SELECT: &str =
    "conversation_id,user_id,joined_at,role,profile:profiles(id,first_name,last_name,avatar_url)";

#[async_trait]
pub trait ConversationRepository {
    async fn find_ids_by_member(&self, user_id: &user::Id) -> super::Result<Vec<conversation::Id>>;

    /// Batch fetch, ordered by last-message time descending.
    async fn find_by_ids(&self, ids: &[conversation::Id]) -> super::Result<Vec<Conversation>>;

    /// Membership rows with embedded profiles for all given conversations at once.
    async fn find_members(&self, ids: &[conversation::Id]) -> super::Result<Vec<Member>>;

    /// Order-independent lookup of the direct conversation between two users.
    async fn find_direct(
        &self,
        one: &user::Id,
        two: &user::Id,
    ) -> super::Result<Option<conversation::Id>>;

    async fn create_direct(
        &self,
        one: &user::Id,
        two: &user::Id,
    ) -> super::Result<conversation::Id>;

    async fn touch_last_message(
        &self,
        id: &conversation::Id,
        at: DateTime<Utc>,
    ) -> super::Result<()>;
}

#[derive(Deserialize)]
struct ConversationIdRow {
    conversation_id: conversation::Id,
}

#[derive(Deserialize)]
struct IdRow {
    id: conversation::Id,
}

#[derive(Clone)]
pub struct RestConversationRepository {
    backend: Backend,
}

impl RestConversationRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ConversationRepository for RestConversationRepository {
    async fn find_ids_by_member(&self, user_id: &user::Id) -> super::Result<Vec<conversation::Id>> {
        let rows = self
            .backend
            .select::<ConversationIdRow>(
                MEMBERS_TABLE,
                &[
                    ("select", "conversation_id".into()),
                    ("user_id", format!("eq.{user_id}")),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(|row| row.conversation_id).collect())
    }

    async fn find_by_ids(&self, ids: &[conversation::Id]) -> super::Result<Vec<Conversation>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conversations = self
            .backend
            .select::<Conversation>(
                CONVERSATIONS_TABLE,
                &[
                    ("id", in_filter(ids)),
                    ("order", "last_message_at.desc.nullslast".into()),
                ],
            )
            .await?;

        Ok(conversations)
    }

    async fn find_members(&self, ids: &[conversation::Id]) -> super::Result<Vec<Member>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let members = self
            .backend
            .select::<Member>(
                MEMBERS_TABLE,
                &[
                    ("select", MEMBER_SELECT.into()),
                    ("conversation_id", in_filter(ids)),
                ],
            )
            .await?;

        Ok(members)
    }

    async fn find_direct(
        &self,
        one: &user::Id,
        two: &user::Id,
    ) -> super::Result<Option<conversation::Id>> {
        // the pair may be stored in either order
        let pair_filter = format!(
            "(and(participant_one.eq.{one},participant_two.eq.{two}),\
             and(participant_one.eq.{two},participant_two.eq.{one}))"
        );

        let mut rows = self
            .backend
            .select::<IdRow>(
                CONVERSATIONS_TABLE,
                &[
                    ("select", "id".into()),
                    ("is_group", "eq.false".into()),
                    ("or", pair_filter),
                    ("limit", "1".into()),
                ],
            )
            .await?;

        Ok(rows.pop().map(|row| row.id))
    }

    async fn create_direct(
        &self,
        one: &user::Id,
        two: &user::Id,
    ) -> super::Result<conversation::Id> {
        let conversation = self
            .backend
            .insert::<NewConversation, Conversation>(
                CONVERSATIONS_TABLE,
                &NewConversation::direct(one.clone(), two.clone()),
            )
            .await?;

        let members = [
            NewMember::new(&conversation.id, one),
            NewMember::new(&conversation.id, two),
        ];
        self.backend.insert_many(MEMBERS_TABLE, &members).await?;

        Ok(conversation.id)
    }

    async fn touch_last_message(
        &self,
        id: &conversation::Id,
        at: DateTime<Utc>,
    ) -> super::Result<()> {
        self.backend
            .update(
                CONVERSATIONS_TABLE,
                &[("id", format!("eq.{id}"))],
                &serde_json::json!({ "last_message_at": at }),
            )
            .await?;

        Ok(())
    }
}
