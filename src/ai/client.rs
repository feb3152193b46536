//! Caller of the server's AI routes.
//!
//! Both calls degrade to an empty result on any failure: connection errors,
//! timeouts, non-2xx statuses and undecodable bodies all return the empty
//! shape. The server-side 4xx/5xx distinction is only logged.

use crate::config::ClientConfig;
use crate::types::{PrioritiseResult, SubtaskSuggestion};
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const SUGGEST_PATH: &str = "/api/ai/suggest";
pub const PRIORITISE_PATH: &str = "/api/ai/prioritise";

#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
}

impl AiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.server_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Suggested subtasks for `title`, or none if the server could not help.
    pub async fn suggest_subtasks(&self, title: &str) -> SubtaskSuggestion {
        self.post_or_default(SUGGEST_PATH, &json!({ "title": title }))
            .await
    }

    /// Priority labels for `todos`, or none if the server could not help.
    pub async fn prioritise_todos(&self, todos: &[String]) -> PrioritiseResult {
        self.post_or_default(PRIORITISE_PATH, &json!({ "todos": todos }))
            .await
    }

    async fn post_or_default<B, T>(&self, path: &str, body: &B) -> T
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        match self.post(path, body).await {
            Ok(value) => value,
            Err(e) => {
                debug!(path, "AI call failed, using empty result: {:#}", e);
                T::default()
            }
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}
