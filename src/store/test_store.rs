//! Test Store - append-only result log

use super::Database;
use crate::record::TestRecord;
use crate::Result;

/// Handle on the test collection of a [`Database`].
///
/// Records are appended in completion order and never individually deleted.
#[derive(Debug, Clone, Copy)]
pub struct TestStore<'a> {
    db: &'a Database,
}

impl<'a> TestStore<'a> {
    pub(super) const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn key(&self) -> &'a str {
        &self.db.config.tests_key
    }

    /// Append a record, then commit.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read or the commit fails
    pub fn append(&self, record: TestRecord) -> Result<()> {
        let challenge = record.challenge().to_string();
        let error_rate = record.error_rate();

        let total = self.db.mutate(self.key(), |items: &mut Vec<TestRecord>| {
            items.push(record);
            Ok(items.len())
        })?;

        tracing::info!(
            target: "twizzle::store",
            challenge = %challenge,
            error_rate,
            total,
            "test record appended"
        );
        Ok(())
    }

    /// All records in append order.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend cannot be read
    pub fn list(&self) -> Result<Vec<TestRecord>> {
        self.db.load(self.key())
    }

    /// Records that reference `challenge`, in append order.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend cannot be read
    pub fn for_challenge(&self, challenge: &str) -> Result<Vec<TestRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|t| t.challenge() == challenge)
            .collect())
    }

    /// Number of records.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend cannot be read
    pub fn len(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// Check if the log is empty.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend cannot be read
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Delete every record.
    ///
    /// # Errors
    ///
    /// Returns error if the commit fails
    pub fn clear(&self) -> Result<()> {
        self.db.mutate(self.key(), |items: &mut Vec<TestRecord>| {
            items.clear();
            Ok(())
        })?;
        tracing::info!(target: "twizzle::store", "tests cleared");
        Ok(())
    }
}
