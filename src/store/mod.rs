//! The todo store: authoritative in-memory task list with write-through
//! persistence.
//!
//! Every mutating operation updates the in-memory list first and then saves
//! the whole list before returning. Operations that reference an unknown id
//! are no-ops.

pub mod persist;

use crate::types::{Stats, Task};
use chrono::{DateTime, Utc};
use persist::Persistence;
use thiserror::Error;
use tracing::debug;

/// Errors returned by store mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The title was empty or whitespace-only after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// No id above the current maximum is representable.
    #[error("no task ids left above {0}")]
    IdsExhausted(i64),

    /// The mutation was applied in memory but could not be saved.
    #[error("failed to persist todos: {0:#}")]
    Persistence(anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Owns the task list. Newest tasks are kept at the front.
pub struct TodoStore {
    tasks: Vec<Task>,
    persistence: Persistence,
}

impl TodoStore {
    /// Create a store, loading any previously saved tasks.
    pub fn open(persistence: Persistence) -> Self {
        let tasks = persistence.load();
        Self { tasks, persistence }
    }

    /// Snapshot of all tasks, newest first.
    pub fn get_all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Look up a single task.
    pub fn get(&self, id: i64) -> Option<Task> {
        self.tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Add a new task at the head of the list.
    pub fn add(&mut self, title: &str) -> StoreResult<Task> {
        let title = normalize_title(title)?;
        // Stored timestamps carry millisecond precision
        let now_ms = Utc::now().timestamp_millis();
        let created_at = DateTime::from_timestamp_millis(now_ms).unwrap_or_else(Utc::now);
        let task = Task {
            id: self.next_id(now_ms)?,
            title,
            completed: false,
            created_at,
        };
        self.tasks.insert(0, task.clone());
        debug!(id = task.id, "Added todo");
        self.persist()?;
        Ok(task)
    }

    /// Flip the completion flag of a task.
    pub fn toggle(&mut self, id: i64) -> StoreResult<()> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(());
        };
        task.completed = !task.completed;
        debug!(id, completed = task.completed, "Toggled todo");
        self.persist()
    }

    /// Remove a task.
    pub fn delete(&mut self, id: i64) -> StoreResult<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(());
        }
        debug!(id, "Deleted todo");
        self.persist()
    }

    /// Replace the title of a task.
    pub fn update(&mut self, id: i64, title: &str) -> StoreResult<()> {
        let title = normalize_title(title)?;
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(());
        };
        task.title = title;
        debug!(id, "Renamed todo");
        self.persist()
    }

    /// Remove every completed task, keeping the relative order of the rest.
    pub fn clear_completed(&mut self) -> StoreResult<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        debug!(removed = before - self.tasks.len(), "Cleared completed todos");
        self.persist()
    }

    pub fn get_stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks)
    }

    /// Ids come from the creation time but must stay unique and increasing,
    /// so a clash or a clock going backwards bumps past the current maximum.
    fn next_id(&self, now_ms: i64) -> StoreResult<i64> {
        match self.tasks.iter().map(|t| t.id).max() {
            Some(max) if now_ms <= max => max.checked_add(1).ok_or(StoreError::IdsExhausted(max)),
            _ => Ok(now_ms),
        }
    }

    fn persist(&self) -> StoreResult<()> {
        self.persistence
            .save(&self.tasks)
            .map_err(StoreError::Persistence)
    }
}

fn normalize_title(title: &str) -> StoreResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
