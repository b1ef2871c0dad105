use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user;
use crate::user::model::Profile;

/// A direct conversation carries exactly two participants and no title;
/// a group holds its members in the membership relation instead.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Conversation {
    pub id: super::Id,
    pub is_group: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub participant_one: Option<user::Id>,
    pub participant_two: Option<user::Id>,
    pub last_message_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct NewConversation {
    is_group: bool,
    participant_one: Option<user::Id>,
    participant_two: Option<user::Id>,
}

impl NewConversation {
    pub fn direct(one: user::Id, two: user::Id) -> Self {
        Self {
            is_group: false,
            participant_one: Some(one),
            participant_two: Some(two),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Member {
    pub conversation_id: super::Id,
    pub user_id: user::Id,
    pub joined_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct NewMember<'a> {
    conversation_id: &'a super::Id,
    user_id: &'a user::Id,
}

impl<'a> NewMember<'a> {
    pub fn new(conversation_id: &'a super::Id, user_id: &'a user::Id) -> Self {
        Self {
            conversation_id,
            user_id,
        }
    }
}

/// Enriched read model handed to the UI layer.
#[derive(Clone, Debug, Serialize)]
pub struct ConversationView {
    conversation: Conversation,
    members: Vec<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    other_user: Option<Profile>,
    unread_count: i64,
}

impl ConversationView {
    pub fn new(
        conversation: Conversation,
        members: Vec<Member>,
        other_user: Option<Profile>,
        unread_count: i64,
    ) -> Self {
        Self {
            conversation,
            members,
            other_user,
            unread_count,
        }
    }

    pub const fn id(&self) -> &super::Id {
        &self.conversation.id
    }

    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub const fn other_user(&self) -> Option<&Profile> {
        self.other_user.as_ref()
    }

    pub const fn unread_count(&self) -> i64 {
        self.unread_count
    }
}
