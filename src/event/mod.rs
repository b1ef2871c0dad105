use std::fmt::Display;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::{conversation, integration};

pub mod model;
pub mod service;

pub type Result<T> = std::result::Result<T, Error>;
pub type PubSub = Arc<dyn PubSubClient + Send + Sync>;
pub type EventStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Channel key: one live subscription per subject at any time.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Subject {
    Messages(conversation::Id),
    Typing(conversation::Id),
}

impl Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Messages(id) => write!(f, "messages_{id}"),
            Self::Typing(id) => write!(f, "typing_{id}"),
        }
    }
}

/// Seam over the realtime channel transport.
#[async_trait]
pub trait PubSubClient {
    async fn subscribe(&self, subject: &Subject) -> integration::Result<EventStream>;

    async fn publish(&self, subject: &Subject, payload: Bytes) -> integration::Result<()>;
}

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    _Integration(#[from] integration::Error),
    _ParseJson(#[from] serde_json::Error),
}
