//! View/controller over the todo store.
//!
//! Every action goes through [`TodoView::dispatch`]: the store is mutated,
//! then the full list and stats are re-read. Store errors are logged and kept
//! on the view as a notice instead of being propagated.

use crate::store::TodoStore;
use crate::types::{Filter, Stats, Task};
use tracing::warn;

/// User intents the view forwards to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add(String),
    Toggle(i64),
    Delete(i64),
    Update(i64, String),
    ClearCompleted,
    SetFilter(Filter),
}

/// Controller holding the store, the current filter and the last snapshot.
pub struct TodoView {
    store: TodoStore,
    filter: Filter,
    items: Vec<Task>,
    stats: Stats,
    last_error: Option<String>,
}

impl TodoView {
    pub fn new(store: TodoStore) -> Self {
        let mut view = Self {
            store,
            filter: Filter::default(),
            items: Vec::new(),
            stats: Stats::default(),
            last_error: None,
        };
        view.refresh();
        view
    }

    /// Apply an action and refresh. Returns the task created by `Add`.
    pub fn dispatch(&mut self, action: Action) -> Option<Task> {
        self.last_error = None;

        let result = match action {
            Action::Add(title) => self.store.add(&title).map(Some),
            Action::Toggle(id) => self.store.toggle(id).map(|_| None),
            Action::Delete(id) => self.store.delete(id).map(|_| None),
            Action::Update(id, title) => self.store.update(id, &title).map(|_| None),
            Action::ClearCompleted => self.store.clear_completed().map(|_| None),
            Action::SetFilter(filter) => {
                self.filter = filter;
                Ok(None)
            }
        };

        let created = match result {
            Ok(created) => created,
            Err(e) => {
                warn!("Todo action failed: {}", e);
                self.last_error = Some(e.to_string());
                None
            }
        };

        self.refresh();
        created
    }

    /// Re-read the full list and stats from the store.
    pub fn refresh(&mut self) {
        self.items = self.store.get_all();
        self.stats = self.store.get_stats();
    }

    /// Items visible under the current filter.
    pub fn visible(&self) -> Vec<Task> {
        self.filter.apply(&self.items)
    }

    /// Every item in the last snapshot, ignoring the filter.
    pub fn items(&self) -> &[Task] {
        &self.items
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Message from the last failed action, cleared on the next dispatch.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// "1 item left" / "N items left".
    pub fn remaining_label(&self) -> String {
        match self.stats.active {
            1 => "1 item left".to_string(),
            n => format!("{} items left", n),
        }
    }

    /// Message shown when nothing is visible under the current filter.
    pub fn empty_message(&self) -> &'static str {
        match self.filter {
            Filter::All => "No todos yet. Add one to get started.",
            Filter::Active => "Nothing left to do.",
            Filter::Completed => "No completed todos.",
        }
    }
}
