use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::model::Message;
use crate::user;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Notification {
    NewMessage { message: Message },
}

/// Ephemeral presence record broadcast on a conversation's typing channel.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TypingStatus {
    pub user_id: user::Id,
    pub typing: bool,
    pub heartbeat: DateTime<Utc>,
}

impl TypingStatus {
    pub fn now(user_id: user::Id, typing: bool) -> Self {
        Self {
            user_id,
            typing,
            heartbeat: Utc::now(),
        }
    }
}
