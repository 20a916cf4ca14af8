// Key/value storage backends

use crate::error::{TaskError, TaskResult};
use crate::models::now_ms;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CURRENT_VERSION: u32 = 1;

/// Name of the directory holding the database, lock file and outbox
pub const STORE_DIR: &str = ".tasklist";

/// String-keyed blob storage, the same shape as browser local storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> TaskResult<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> TaskResult<()>;

    fn remove(&mut self, key: &str) -> TaskResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> TaskResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> TaskResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> TaskResult<()> {
        (**self).remove(key)
    }
}

/// Volatile storage; used in tests and when the durable backend fails
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> TaskResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> TaskResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> TaskResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Durable storage in a single-table SQLite database
pub struct SqliteStorage {
    base_path: PathBuf,
    db: Connection,
}

impl SqliteStorage {
    /// Open or create storage at the given path
    ///
    /// The database lives in a `.tasklist` subdirectory of the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> TaskResult<Self> {
        let base_path = path.as_ref().join(STORE_DIR);

        fs::create_dir_all(&base_path)
            .map_err(|e| TaskError::Storage(format!("Failed to create store directory: {}", e)))?;

        let db = Connection::open(base_path.join("tasklist.db"))?;

        let storage = Self { base_path, db };
        storage.create_schema()?;
        storage.create_gitignore()?;
        storage.write_version()?;

        Ok(storage)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn create_schema(&self) -> TaskResult<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    fn create_gitignore(&self) -> TaskResult<()> {
        let gitignore_path = self.base_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "tasklist.db\ntasklist.db-shm\ntasklist.db-wal\nlock\n")
                .map_err(|e| TaskError::Storage(e.to_string()))?;
        }
        Ok(())
    }

    fn write_version(&self) -> TaskResult<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string()).map_err(|e| TaskError::Storage(e.to_string()))?;
        }
        Ok(())
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> TaskResult<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> TaskResult<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> TaskResult<()> {
        self.db.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_sqlite_open_creates_directory() {
        let temp = TempDir::new().unwrap();

        let storage = SqliteStorage::open(temp.path()).unwrap();
        let store_path = temp.path().join(".tasklist");
        assert_eq!(storage.base_path(), store_path);
        assert!(store_path.join("tasklist.db").exists());
        assert!(store_path.join(".gitignore").exists());
        assert!(store_path.join(".version").exists());
    }

    #[test]
    fn test_sqlite_set_get_remove() {
        let temp = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open(temp.path()).unwrap();

        storage.set("tasks", "[]").unwrap();
        assert_eq!(storage.get("tasks").unwrap().as_deref(), Some("[]"));

        storage.set("tasks", "[1]").unwrap();
        assert_eq!(storage.get("tasks").unwrap().as_deref(), Some("[1]"));

        storage.remove("tasks").unwrap();
        assert_eq!(storage.get("tasks").unwrap(), None);
    }

    #[test]
    fn test_sqlite_persists_across_open() {
        let temp = TempDir::new().unwrap();
        {
            let mut storage = SqliteStorage::open(temp.path()).unwrap();
            storage.set("darkMode", "true").unwrap();
        }

        let storage = SqliteStorage::open(temp.path()).unwrap();
        assert_eq!(storage.get("darkMode").unwrap().as_deref(), Some("true"));
    }
}
