//! Single-file durable KV store backed by SQLite.
//!
//! Layout: one table `kv(key TEXT PRIMARY KEY, value BLOB NOT NULL)`.
//! Each `set` runs in its own transaction, so a crash before commit leaves
//! the previously committed value in place.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::KvStore;
use crate::{Error, Result};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY,
    value BLOB NOT NULL
)";

/// Durable key-value store in a single SQLite file.
///
/// The connection is serialized behind a mutex; SQLite itself provides the
/// atomic commit.
#[derive(Debug)]
pub struct SqliteKvStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Open or create the store at `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or the schema cannot be created
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute(SCHEMA, [])?;

        tracing::debug!(target: "twizzle::kv", path = %path.display(), "opened sqlite store");

        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory SQLite database (same semantics, no file).
    ///
    /// # Errors
    /// Returns error if SQLite cannot allocate the database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Path of the backing file, `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Storage("SQLite connection lock poisoned".to_string()))
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");

        {
            let store = SqliteKvStore::open(&path).unwrap();
            store.set("challenges", b"[1,2,3]".to_vec()).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
        }

        let reopened = SqliteKvStore::open(&path).unwrap();
        assert_eq!(reopened.get("challenges").unwrap(), Some(b"[1,2,3]".to_vec()));
    }

    #[test]
    fn test_sqlite_overwrite_keeps_single_row() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("tests", b"a".to_vec()).unwrap();
        store.set("tests", b"b".to_vec()).unwrap();

        let count: i64 = store
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.get("tests").unwrap(), Some(b"b".to_vec()));
    }
}
