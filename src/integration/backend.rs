use std::env;

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::{Error, Result};

const API_KEY_HEADER: &str = "apikey";

#[derive(Clone)]
pub struct Config {
    base_url: String,
    api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:54321"),
            api_key: String::new(),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let base_url = env::var("BACKEND_URL")?;
        let api_key = env::var("BACKEND_API_KEY")?;
        Ok(Self { base_url, api_key })
    }

    pub fn connect(&self, http: reqwest::Client) -> Result<Backend> {
        let base_url = Url::parse(&self.base_url)?;
        Ok(Backend {
            http,
            base_url,
            api_key: self.api_key.clone(),
        })
    }
}

/// Thin client for the hosted backend's auto-generated REST API. Rows are
/// addressed by table name, filtered with `column=op.value` query pairs.
#[derive(Clone)]
pub struct Backend {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl Backend {
    fn table_url(&self, table: &str) -> Result<Url> {
        self.base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(Error::from)
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let rows = self
            .http
            .get(self.table_url(table)?)
            .header(API_KEY_HEADER, &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<T>>()
            .await?;

        Ok(rows)
    }

    /// Inserts a single row and returns its server-assigned representation.
    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T> {
        let mut rows = self
            .http
            .post(self.table_url(table)?)
            .header(API_KEY_HEADER, &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<T>>()
            .await?;

        if rows.is_empty() {
            return Err(Error::Unexpected(format!(
                "insert into {table} returned no representation"
            )));
        }

        Ok(rows.swap_remove(0))
    }

    pub async fn insert_many<B: Serialize>(&self, table: &str, rows: &[B]) -> Result<()> {
        self.http
            .post(self.table_url(table)?)
            .header(API_KEY_HEADER, &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    pub async fn update<B: Serialize>(
        &self,
        table: &str,
        query: &[(&str, String)],
        patch: &B,
    ) -> Result<()> {
        self.http
            .patch(self.table_url(table)?)
            .header(API_KEY_HEADER, &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .query(query)
            .json(patch)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Renders ids as an `in.(a,b,c)` filter value.
pub fn in_filter<T: ToString>(ids: &[T]) -> String {
    let list = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");

    format!("in.({list})")
}
