//! Key-Value Store Module
//!
//! The catalog persists as two whole-collection snapshots keyed by name in a
//! single key-value store. This module provides the backend seam:
//! - [`MemoryKvStore`]: process-local, lost on restart (tests, dry runs)
//! - [`SqliteKvStore`]: single durable file, every `set` commits
//!
//! # Example
//!
//! ```rust
//! use twizzle::kv::{KvStore, MemoryKvStore};
//!
//! # fn main() -> twizzle::Result<()> {
//! let store = MemoryKvStore::new();
//!
//! store.set("key", b"value".to_vec())?;
//! assert_eq!(store.get("key")?, Some(b"value".to_vec()));
//!
//! store.delete("key")?;
//! assert!(!store.exists("key")?);
//! # Ok(())
//! # }
//! ```

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use crate::Result;

/// Key-value store trait backing the challenge/test catalog.
///
/// `set` is the durability boundary: once it returns `Ok`, the value
/// survives a crash for durable backends, and a failed `set` leaves the
/// previously committed value intact.
pub trait KvStore: Send + Sync {
    /// Get a value by key.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value for a key and commit it.
    ///
    /// Overwrites any existing value.
    ///
    /// # Errors
    /// Returns error if the write or commit fails
    fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete a key.
    ///
    /// No-op if the key doesn't exist.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists.
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
