//! Prompt templates and output handling for the two AI helpers.

use super::{GenerateRequest, Generator};
use crate::types::{PrioritiseResult, SubtaskSuggestion};
use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::debug;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("valid fence regex")
});

/// Ask the model for 3 to 5 actionable subtasks of `title`.
pub async fn suggest_subtasks(generator: &dyn Generator, title: &str) -> Result<SubtaskSuggestion> {
    let request = GenerateRequest {
        prompt: suggest_prompt(title),
        schema: suggest_schema(),
    };
    let output = generator.generate(request).await?;
    parse_output(output)
}

/// Ask the model to label each todo with a priority and a one-sentence reason.
pub async fn prioritise_todos(
    generator: &dyn Generator,
    todos: &[String],
) -> Result<PrioritiseResult> {
    let request = GenerateRequest {
        prompt: prioritise_prompt(todos),
        schema: prioritise_schema(),
    };
    let output = generator.generate(request).await?;
    parse_output(output)
}

pub fn suggest_prompt(title: &str) -> String {
    format!(
        r#"You are a productivity assistant.
Suggest 3 to 5 clear, actionable subtasks that would help someone complete the task below.

Task: "{title}"

Respond with ONLY a JSON object in this format, without markdown or explanation:
{{"subtasks": ["subtask 1", "subtask 2", "subtask 3"]}}"#
    )
}

pub fn prioritise_prompt(todos: &[String]) -> String {
    let list = todos
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a productivity assistant.
Assign each task below a priority of high, medium or low and give a one-sentence reason.

Tasks:
{list}

Respond with ONLY a JSON object, without markdown or explanation:
{{"prioritised": [{{"title": "...", "priority": "high|medium|low", "reason": "..."}}]}}"#
    )
}

fn suggest_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "subtasks": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["subtasks"]
    })
}

fn prioritise_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "prioritised": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "priority": { "type": "STRING", "enum": ["high", "medium", "low"] },
                        "reason": { "type": "STRING" }
                    },
                    "required": ["title", "priority", "reason"]
                }
            }
        },
        "required": ["prioritised"]
    })
}

/// Validate model output against the expected shape.
///
/// No output, or a JSON `null`, yields the empty default. Output that is
/// present but does not match the shape is an error.
pub fn parse_output<T>(output: Option<String>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = output.filter(|o| !o.trim().is_empty()) else {
        debug!("Model returned no output, using empty result");
        return Ok(T::default());
    };

    let parsed: Option<T> = serde_json::from_str(extract_json(&raw))
        .context("model output did not match the expected shape")?;
    if parsed.is_none() {
        debug!("Model returned null, using empty result");
    }
    Ok(parsed.unwrap_or_default())
}

/// Strip a surrounding markdown code fence, or any text around the outermost
/// JSON object.
fn extract_json(raw: &str) -> &str {
    if let Some(inner) = CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        return inner.as_str();
    }
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw.trim(),
    }
}
