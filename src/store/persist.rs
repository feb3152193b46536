//! Persistence adapter: the task list as one JSON array under one storage key.

use crate::db::Database;
use crate::types::Task;
use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Default storage key for the task list.
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Reads and writes the serialized task list.
#[derive(Clone)]
pub struct Persistence {
    db: Database,
    key: String,
}

impl Persistence {
    pub fn new(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    /// Storage key this adapter reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored task list.
    ///
    /// A missing key yields an empty list. Storage failures and values that do
    /// not match the record schema are logged and also yield an empty list; the
    /// stored value is left untouched until the next save.
    pub fn load(&self) -> Vec<Task> {
        let raw = match self.db.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No stored todos, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(key = %self.key, "Failed to read stored todos: {:#}", e);
                return Vec::new();
            }
        };

        match decode(&raw) {
            Ok(tasks) => {
                debug!(key = %self.key, count = tasks.len(), "Loaded todos");
                tasks
            }
            Err(e) => {
                warn!(
                    key = %self.key,
                    "Stored todos do not match the expected schema, starting empty: {:#}",
                    e
                );
                Vec::new()
            }
        }
    }

    /// Serialize the full list and overwrite the stored value.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let raw = serde_json::to_string(tasks).context("failed to serialize todos")?;
        self.db
            .set_item(&self.key, &raw)
            .with_context(|| format!("failed to write todos under key '{}'", self.key))
    }
}

/// Parse and validate a stored task list.
pub fn decode(raw: &str) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(raw).context("invalid task record JSON")?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(task.id) {
            bail!("duplicate task id {}", task.id);
        }
        if task.title.trim().is_empty() {
            bail!("task {} has a blank title", task.id);
        }
    }

    Ok(tasks)
}
