//! Store configuration.
//!
//! A [`StoreConfig`] is built once at process start and handed to
//! [`Database::open`](crate::store::Database::open); it is never mutated
//! afterwards. Three ways to obtain one:
//!
//! - [`Database::builder()`](crate::store::Database::builder) in code
//! - [`StoreConfig::from_json_file`] for a checked-in config file
//! - [`StoreConfig::from_env`] for `TWIZZLE_*` environment variables
//!
//! ## Example config file
//!
//! ```json
//! {
//!   "backend": { "sqlite": "results/twizzle.db" },
//!   "challenges_key": "challenges",
//!   "tests_key": "tests"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "twizzle.db";

/// Default KV key of the challenge collection.
pub const DEFAULT_CHALLENGES_KEY: &str = "challenges";

/// Default KV key of the test collection.
pub const DEFAULT_TESTS_KEY: &str = "tests";

/// Environment variable overriding the SQLite database path.
pub const ENV_DB_PATH: &str = "TWIZZLE_DB_PATH";

/// Environment variable overriding the challenge collection key.
pub const ENV_CHALLENGES_KEY: &str = "TWIZZLE_CHALLENGES_KEY";

/// Environment variable overriding the test collection key.
pub const ENV_TESTS_KEY: &str = "TWIZZLE_TESTS_KEY";

/// KV backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Process-local store, lost on exit
    Memory,
    /// Durable single-file SQLite store
    Sqlite(PathBuf),
}

impl Default for Backend {
    fn default() -> Self {
        Self::Sqlite(PathBuf::from(DEFAULT_DB_PATH))
    }
}

/// Immutable configuration for a [`Database`](crate::store::Database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which KV backend holds the two collections
    pub backend: Backend,
    /// KV key under which the challenge collection is stored
    pub challenges_key: String,
    /// KV key under which the test collection is stored
    pub tests_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            challenges_key: DEFAULT_CHALLENGES_KEY.to_string(),
            tests_key: DEFAULT_TESTS_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    /// In-memory configuration with default collection keys.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            ..Self::default()
        }
    }

    /// SQLite configuration at `path` with default collection keys.
    #[must_use]
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Sqlite(path.into()),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid JSON, or fails validation
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `TWIZZLE_DB_PATH`, `TWIZZLE_CHALLENGES_KEY`
    /// and `TWIZZLE_TESTS_KEY` when set.
    ///
    /// # Errors
    /// Returns error if the resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_DB_PATH) {
            config.backend = Backend::Sqlite(PathBuf::from(path));
        }
        if let Some(key) = lookup(ENV_CHALLENGES_KEY) {
            config.challenges_key = key;
        }
        if let Some(key) = lookup(ENV_TESTS_KEY) {
            config.tests_key = key;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that both collection keys are non-empty and distinct.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.challenges_key.is_empty() || self.tests_key.is_empty() {
            return Err(Error::validation("collection keys must not be empty"));
        }
        if self.challenges_key == self.tests_key {
            return Err(Error::validation(format!(
                "challenge and test collections cannot share the key {:?}",
                self.challenges_key
            )));
        }
        if let Backend::Sqlite(path) = &self.backend {
            if path.as_os_str().is_empty() {
                return Err(Error::validation("SQLite path must not be empty"));
            }
        }
        Ok(())
    }
}
