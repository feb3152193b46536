//! Integration tests for the todo store and its persistence.
//!
//! Most tests use an in-memory SQLite database; the reopen tests use a
//! temporary file so a second store instance sees what the first one saved.

use todo_assist::db::Database;
use todo_assist::store::persist::{DEFAULT_STORAGE_KEY, Persistence};
use todo_assist::store::{StoreError, TodoStore};
use todo_assist::types::{Filter, Stats};
use todo_assist::view::{Action, TodoView};

/// Helper to create a fresh store on an in-memory database.
fn setup_store() -> TodoStore {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    TodoStore::open(Persistence::new(db, DEFAULT_STORAGE_KEY))
}

fn open_file_store(path: &std::path::Path) -> TodoStore {
    let db = Database::open(path).expect("Failed to open database file");
    TodoStore::open(Persistence::new(db, DEFAULT_STORAGE_KEY))
}

fn assert_stats_consistent(stats: Stats) {
    assert_eq!(stats.total, stats.completed + stats.active);
}

mod store_tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = setup_store();
        assert!(store.get_all().is_empty());
        assert_eq!(store.get_stats(), Stats::default());
    }

    #[test]
    fn add_trims_title_and_starts_active() {
        let mut store = setup_store();

        let task = store.add("  Buy milk  ").expect("add should succeed");

        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(store.get_all(), vec![task]);
    }

    #[test]
    fn add_rejects_blank_title() {
        let mut store = setup_store();

        let err = store.add("   ").unwrap_err();

        assert!(matches!(err, StoreError::EmptyTitle));
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn newest_task_comes_first() {
        let mut store = setup_store();

        let first = store.add("First").unwrap();
        let second = store.add("Second").unwrap();
        let third = store.add("Third").unwrap();

        let ids: Vec<i64> = store.get_all().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn ids_are_unique_even_when_added_quickly() {
        let mut store = setup_store();

        let ids: Vec<i64> = (0..20)
            .map(|i| store.add(&format!("Task {}", i)).unwrap().id)
            .collect();

        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut store = setup_store();
        let task = store.add("Walk dog").unwrap();

        store.toggle(task.id).unwrap();
        assert!(store.get(task.id).unwrap().completed);

        store.toggle(task.id).unwrap();
        assert!(!store.get(task.id).unwrap().completed);
    }

    #[test]
    fn operations_on_unknown_id_are_noops() {
        let mut store = setup_store();
        store.add("Keep me").unwrap();
        let before = store.get_all();

        store.toggle(999).unwrap();
        store.delete(999).unwrap();
        store.update(999, "Renamed").unwrap();

        assert_eq!(store.get_all(), before);
    }

    #[test]
    fn update_trims_and_rejects_blank() {
        let mut store = setup_store();
        let task = store.add("Draft").unwrap();

        store.update(task.id, "  Final  ").unwrap();
        assert_eq!(store.get(task.id).unwrap().title, "Final");

        let err = store.update(task.id, "").unwrap_err();
        assert!(matches!(err, StoreError::EmptyTitle));
        assert_eq!(store.get(task.id).unwrap().title, "Final");
    }

    #[test]
    fn delete_removes_only_that_task() {
        let mut store = setup_store();
        let a = store.add("A").unwrap();
        let b = store.add("B").unwrap();

        store.delete(a.id).unwrap();

        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, b.id);
    }

    #[test]
    fn clear_completed_keeps_active_in_order() {
        let mut store = setup_store();
        let a = store.add("A").unwrap();
        let b = store.add("B").unwrap();
        let c = store.add("C").unwrap();
        let d = store.add("D").unwrap();
        store.toggle(b.id).unwrap();
        store.toggle(d.id).unwrap();

        store.clear_completed().unwrap();

        let ids: Vec<i64> = store.get_all().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c.id, a.id]);
        assert!(store.get_all().iter().all(|t| !t.completed));
    }

    #[test]
    fn stats_track_mutations() {
        let mut store = setup_store();
        let a = store.add("A").unwrap();
        store.add("B").unwrap();
        assert_stats_consistent(store.get_stats());

        store.toggle(a.id).unwrap();
        let stats = store.get_stats();
        assert_eq!(
            stats,
            Stats {
                total: 2,
                completed: 1,
                active: 1
            }
        );
        assert_stats_consistent(stats);

        store.clear_completed().unwrap();
        assert_eq!(
            store.get_stats(),
            Stats {
                total: 1,
                completed: 0,
                active: 1
            }
        );
    }

    #[test]
    fn milk_and_dog_scenario() {
        let mut store = setup_store();

        let milk = store.add("Buy milk").unwrap();
        let dog = store.add("Walk dog").unwrap();
        store.toggle(milk.id).unwrap();

        let titles: Vec<String> = store.get_all().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Walk dog", "Buy milk"]);
        assert_eq!(
            store.get_stats(),
            Stats {
                total: 2,
                completed: 1,
                active: 1
            }
        );

        let active = Filter::Active.apply(&store.get_all());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, dog.id);

        store.clear_completed().unwrap();
        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Walk dog");
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn tasks_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.db");

        let (milk, dog) = {
            let mut store = open_file_store(&path);
            let milk = store.add("Buy milk").unwrap();
            let dog = store.add("Walk dog").unwrap();
            store.toggle(milk.id).unwrap();
            (milk, dog)
        };

        let store = open_file_store(&path);
        let all = store.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, dog.id);
        assert_eq!(all[1].id, milk.id);
        assert!(all[1].completed);
        assert_eq!(all[1].created_at, milk.created_at);
    }

    #[test]
    fn every_mutation_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.db");

        let id = {
            let mut store = open_file_store(&path);
            let task = store.add("Original").unwrap();
            store.update(task.id, "Renamed").unwrap();
            task.id
        };
        assert_eq!(open_file_store(&path).get(id).unwrap().title, "Renamed");

        open_file_store(&path).delete(id).unwrap();
        assert!(open_file_store(&path).get_all().is_empty());
    }

    #[test]
    fn malformed_stored_value_loads_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(DEFAULT_STORAGE_KEY, "{not json").unwrap();

        let store = TodoStore::open(Persistence::new(db, DEFAULT_STORAGE_KEY));

        assert!(store.get_all().is_empty());
    }

    #[test]
    fn wrong_shape_loads_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(DEFAULT_STORAGE_KEY, r#"{"todos": []}"#).unwrap();

        let store = TodoStore::open(Persistence::new(db, DEFAULT_STORAGE_KEY));

        assert!(store.get_all().is_empty());
    }

    #[test]
    fn stored_value_uses_camel_case_fields() {
        let db = Database::open_in_memory().unwrap();
        let mut store = TodoStore::open(Persistence::new(db.clone(), DEFAULT_STORAGE_KEY));
        store.add("Buy milk").unwrap();

        let raw = db.get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["title"], "Buy milk");
        assert_eq!(first["completed"], false);
        assert!(first["createdAt"].is_string());
        assert!(first["id"].is_i64());
    }

    #[test]
    fn separate_keys_are_independent() {
        let db = Database::open_in_memory().unwrap();
        let mut work = TodoStore::open(Persistence::new(db.clone(), "work"));
        work.add("Ship release").unwrap();

        let home = TodoStore::open(Persistence::new(db, "home"));

        assert!(home.get_all().is_empty());
    }
}

mod view_tests {
    use super::*;

    #[test]
    fn dispatch_refreshes_snapshot() {
        let mut view = TodoView::new(setup_store());

        let created = view.dispatch(Action::Add("Buy milk".into())).unwrap();
        view.dispatch(Action::Add("Walk dog".into()));
        view.dispatch(Action::Toggle(created.id));

        assert_eq!(view.items().len(), 2);
        assert_eq!(view.stats().completed, 1);
        assert_eq!(view.remaining_label(), "1 item left");
    }

    #[test]
    fn filter_changes_visible_items_only() {
        let mut view = TodoView::new(setup_store());
        let milk = view.dispatch(Action::Add("Buy milk".into())).unwrap();
        view.dispatch(Action::Add("Walk dog".into()));
        view.dispatch(Action::Toggle(milk.id));

        view.dispatch(Action::SetFilter(Filter::Completed));

        let visible = view.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, milk.id);
        assert_eq!(view.items().len(), 2);
    }

    #[test]
    fn failed_action_sets_notice_without_changing_list() {
        let mut view = TodoView::new(setup_store());

        let created = view.dispatch(Action::Add("   ".into()));

        assert!(created.is_none());
        assert!(view.items().is_empty());
        assert_eq!(view.last_error(), Some("title must not be empty"));

        view.dispatch(Action::Add("Valid".into()));
        assert!(view.last_error().is_none());
    }
}
