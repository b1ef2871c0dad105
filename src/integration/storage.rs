use std::env;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use super::Result;

const API_KEY_HEADER: &str = "apikey";
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;

/// Seam over durable object storage.
#[async_trait]
pub trait StorageClient {
    /// Uploads an object and returns its public URL. Progress is advisory,
    /// reported as a 0-100 percentage while bytes are transferred.
    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        on_progress: Option<ProgressFn>,
    ) -> Result<String>;
}

#[derive(Clone)]
pub struct Config {
    base_url: String,
    api_key: String,
    bucket: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:54321"),
            api_key: String::new(),
            bucket: String::from("attachments"),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let base_url = env::var("BACKEND_URL")?;
        let api_key = env::var("BACKEND_API_KEY")?;
        let bucket = env::var("STORAGE_BUCKET").unwrap_or_else(|_| "attachments".into());

        Ok(Self {
            base_url,
            api_key,
            bucket,
        })
    }

    pub fn connect(&self, http: reqwest::Client) -> Result<Storage> {
        let base_url = Url::parse(&self.base_url)?;

        Ok(Storage {
            http,
            base_url,
            api_key: self.api_key.clone(),
            bucket: self.bucket.clone(),
        })
    }
}

/// Object storage reached over the hosted backend's storage API.
#[derive(Clone)]
pub struct Storage {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    bucket: String,
}

#[async_trait]
impl StorageClient for Storage {
    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        on_progress: Option<ProgressFn>,
    ) -> Result<String> {
        let upload_url = self
            .base_url
            .join(&format!("storage/v1/object/{}/{path}", self.bucket))?;
        let public_url = self
            .base_url
            .join(&format!("storage/v1/object/public/{}/{path}", self.bucket))?;

        let total = data.len();
        let body_stream = async_stream::stream! {
            if let Some(report) = &on_progress {
                report(0);
            }

            let mut sent = 0usize;
            for chunk in data.chunks(UPLOAD_CHUNK_SIZE) {
                sent += chunk.len();
                yield Ok::<Bytes, std::io::Error>(Bytes::copy_from_slice(chunk));
                if let Some(report) = &on_progress {
                    report((sent * 100 / total.max(1)) as u8);
                }
            }

            if total == 0 {
                if let Some(report) = &on_progress {
                    report(100);
                }
            }
        };

        self.http
            .post(upload_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, content_type)
            .body(reqwest::Body::wrap_stream(body_stream))
            .send()
            .await?
            .error_for_status()?;

        Ok(public_url.to_string())
    }
}
