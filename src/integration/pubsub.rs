use std::env;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use log::warn;

use crate::event;

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 4222,
        }
    }
}

impl Config {
    pub fn env() -> Option<Self> {
        let host = env::var("NATS_HOST").ok();
        let port = env::var("NATS_PORT")
            .unwrap_or_else(|_| "4222".to_string())
            .parse()
            .ok();

        if let (Some(host), Some(port)) = (host, port) {
            Some(Self { host, port })
        } else {
            warn!("NATS env is not configured");
            None
        }
    }

    pub async fn connect(&self) -> async_nats::Client {
        match async_nats::connect(&format!("{}:{}", self.host, self.port)).await {
            Ok(con) => con,
            Err(e) => panic!("Failed to connect to NATS: {e}"),
        }
    }
}

impl async_nats::subject::ToSubject for &event::Subject {
    fn to_subject(&self) -> async_nats::Subject {
        match self {
            event::Subject::Messages(id) => format!("messages.{id}").into(),
            event::Subject::Typing(id) => format!("typing.{id}").into(),
        }
    }
}

#[async_trait]
impl event::PubSubClient for async_nats::Client {
    async fn subscribe(&self, subject: &event::Subject) -> super::Result<event::EventStream> {
        let subscriber = async_nats::Client::subscribe(self, subject).await?;

        Ok(Box::pin(subscriber.map(|msg| msg.payload)))
    }

    async fn publish(&self, subject: &event::Subject, payload: Bytes) -> super::Result<()> {
        async_nats::Client::publish(self, subject, payload).await?;
        Ok(())
    }
}
