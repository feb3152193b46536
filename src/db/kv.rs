//! Single-table key/value access.

use super::{Database, now_ms};
use anyhow::Result;
use rusqlite::{OptionalExtension, params};

impl Database {
    /// Read the value stored under `key`, if any.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now_ms()],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_item("todos").unwrap(), None);
    }

    #[test]
    fn test_set_item_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.set_item("todos", "[]").unwrap();
        db.set_item("todos", "[1]").unwrap();
        assert_eq!(db.get_item("todos").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_keys_are_independent() {
        let db = Database::open_in_memory().unwrap();
        db.set_item("a", "1").unwrap();
        db.set_item("b", "2").unwrap();
        assert_eq!(db.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(db.get_item("b").unwrap().as_deref(), Some("2"));
    }
}
