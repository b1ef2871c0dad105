use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{conversation, user};

/// Immutable once created, except `read_at` which transitions one way
/// from unset to set.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    id: super::Id,
    conversation_id: conversation::Id,
    sender_id: user::Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default)]
    media_urls: Vec<String>,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<super::Id>,
}

impl Message {
    pub fn new(
        id: super::Id,
        conversation_id: conversation::Id,
        sender_id: user::Id,
        text: Option<String>,
        media_urls: Vec<String>,
        created_at: DateTime<Utc>,
        reply_to: Option<super::Id>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            text,
            media_urls,
            created_at,
            read_at: None,
            reply_to,
        }
    }

    pub const fn id(&self) -> &super::Id {
        &self.id
    }

    pub const fn conversation_id(&self) -> &conversation::Id {
        &self.conversation_id
    }

    pub const fn sender_id(&self) -> &user::Id {
        &self.sender_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn media_urls(&self) -> &[String] {
        &self.media_urls
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }

    pub const fn reply_to(&self) -> Option<&super::Id> {
        self.reply_to.as_ref()
    }

    /// One-way transition; a second call has no effect.
    pub fn mark_read(&mut self, at: DateTime<Utc>) {
        if self.read_at.is_none() {
            self.read_at = Some(at);
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct NewMessage {
    conversation_id: conversation::Id,
    sender_id: user::Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    media_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<super::Id>,
}

impl NewMessage {
    /// Text is trimmed; blank text collapses to none. Presence of at least
    /// one of text/attachments is the caller's contract, not enforced here.
    pub fn new(
        conversation_id: conversation::Id,
        sender_id: user::Id,
        text: Option<&str>,
        media_urls: Vec<String>,
    ) -> Self {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);

        Self {
            conversation_id,
            sender_id,
            text,
            media_urls,
            reply_to: None,
        }
    }

    pub fn with_reply_to(mut self, reply_to: super::Id) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    pub const fn conversation_id(&self) -> &conversation::Id {
        &self.conversation_id
    }

    pub const fn sender_id(&self) -> &user::Id {
        &self.sender_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn media_urls(&self) -> &[String] {
        &self.media_urls
    }

    pub const fn reply_to(&self) -> Option<&super::Id> {
        self.reply_to.as_ref()
    }
}
