//! Catalog storage: two whole-collection snapshots over a KV backend
//!
//! **Snapshot Write Pattern**:
//! - Exactly two top-level collections, "challenges" and "tests"
//! - Every mutation reads the whole collection, edits it in memory and
//!   rewrites it; the KV `set` is the commit
//! - Mutations are serialized by one write lock, so concurrent writers
//!   never lose each other's updates
//! - Reads take no lock and return independent copies
//!
//! O(n) per mutation is fine at the intended scale (hundreds of records).
//! Scaling further means per-record keys behind the same public API.

mod challenge_store;
mod test_store;

pub use challenge_store::ChallengeStore;
pub use test_store::TestStore;

use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Backend, StoreConfig};
use crate::kv::{KvStore, MemoryKvStore, SqliteKvStore};
use crate::{Error, Result};

/// Database instance holding the challenge and test collections.
pub struct Database {
    config: StoreConfig,
    kv: Box<dyn KvStore>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Create a new database builder
    #[must_use]
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    /// Open the backend named by `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the backend cannot be opened
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let kv: Box<dyn KvStore> = match &config.backend {
            Backend::Memory => Box::new(MemoryKvStore::new()),
            Backend::Sqlite(path) => Box::new(SqliteKvStore::open(path)?),
        };
        Ok(Self::from_parts(config, kv))
    }

    /// Open an in-memory database with default collection keys.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_parts(StoreConfig::in_memory(), Box::new(MemoryKvStore::new()))
    }

    /// Use a caller-supplied KV backend. `config.backend` is kept for
    /// reporting only.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn with_kv(config: StoreConfig, kv: Box<dyn KvStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, kv))
    }

    fn from_parts(config: StoreConfig, kv: Box<dyn KvStore>) -> Self {
        tracing::debug!(target: "twizzle::store", ?config, "database opened");
        Self {
            config,
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the configuration this database was opened with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Challenge collection handle.
    #[must_use]
    pub const fn challenges(&self) -> ChallengeStore<'_> {
        ChallengeStore::new(self)
    }

    /// Test collection handle.
    #[must_use]
    pub const fn tests(&self) -> TestStore<'_> {
        TestStore::new(self)
    }

    /// Read a whole collection. A missing key is an empty collection.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.kv.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::Storage(format!("collection {key:?} is corrupted: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Read → edit → rewrite+commit under the write lock.
    ///
    /// If `edit` fails, nothing is written and the collection is unchanged.
    fn mutate<T, R>(&self, key: &str, edit: impl FnOnce(&mut Vec<T>) -> Result<R>) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::Storage("write lock poisoned".to_string()))?;

        let mut items: Vec<T> = self.load(key)?;
        let out = edit(&mut items)?;
        let bytes = serde_json::to_vec(&items)?;
        self.kv.set(key, bytes)?;
        Ok(out)
    }
}

/// Database builder
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    config: StoreConfig,
}

impl DatabaseBuilder {
    /// Start from an existing configuration
    #[must_use]
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Keep everything in memory
    #[must_use]
    pub fn in_memory(mut self) -> Self {
        self.config.backend = Backend::Memory;
        self
    }

    /// Persist to a SQLite file at `path`
    #[must_use]
    pub fn sqlite(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.backend = Backend::Sqlite(path.into());
        self
    }

    /// Override the KV key of the challenge collection
    #[must_use]
    pub fn challenges_key(mut self, key: impl Into<String>) -> Self {
        self.config.challenges_key = key.into();
        self
    }

    /// Override the KV key of the test collection
    #[must_use]
    pub fn tests_key(mut self, key: impl Into<String>) -> Self {
        self.config.tests_key = key.into();
        self
    }

    /// Build the database
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the backend cannot be opened
    pub fn open(self) -> Result<Database> {
        Database::open(self.config)
    }
}
