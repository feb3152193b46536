//! AI helpers: one external model call per request, structured JSON out.

pub mod client;
pub mod flows;
pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use client::AiClient;
pub use flows::{prioritise_todos, suggest_subtasks};
pub use gemini::GeminiGenerator;

/// A single generation request: the prompt and the JSON schema the answer
/// must follow.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub schema: Value,
}

/// Abstraction over the external model.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Run one generation. `Ok(None)` means the model returned no usable text.
    async fn generate(&self, request: GenerateRequest) -> Result<Option<String>>;
}
