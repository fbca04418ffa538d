//! Challenge Store - the named dataset catalog

use super::Database;
use crate::metadata::Metadata;
use crate::record::Challenge;
use crate::{Error, Result};

/// Handle on the challenge collection of a [`Database`].
///
/// ## Example
///
/// ```rust
/// use twizzle::metadata::Metadata;
/// use twizzle::store::Database;
///
/// # fn main() -> twizzle::Result<()> {
/// let db = Database::in_memory();
/// let challenges = db.challenges();
///
/// challenges.add(
///     "image_hashing_challenge_print_scan_1",
///     vec!["c1.png".into(), "c2.png".into(), "c3.png".into()],
///     vec!["c1.png".into(), "c5.png".into(), "c6.png".into()],
///     vec![true, false, false],
///     Metadata::new().with("printer", "DC783").with("print_dpi", 300),
/// )?;
///
/// let challenge = challenges.get("image_hashing_challenge_print_scan_1")?;
/// assert_eq!(challenge.len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChallengeStore<'a> {
    db: &'a Database,
}

impl<'a> ChallengeStore<'a> {
    pub(super) const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn key(&self) -> &'a str {
        &self.db.config.challenges_key
    }

    /// Validate and append a new challenge, then commit.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for empty names, empty or mismatched sequences,
    ///   empty artifact references, or reserved metadata keys
    /// - [`Error::DuplicateName`] if the name is taken (store unchanged)
    /// - Storage errors if the commit fails (prior state intact)
    pub fn add(
        &self,
        name: &str,
        originals: Vec<String>,
        comparatives: Vec<String>,
        ground_truth: Vec<bool>,
        metadata: Metadata,
    ) -> Result<()> {
        let challenge = Challenge::new(name, originals, comparatives, ground_truth, metadata)?;
        self.insert(challenge)
    }

    /// Append an already constructed challenge, then commit.
    ///
    /// # Errors
    ///
    /// Same as [`ChallengeStore::add`]
    pub fn insert(&self, challenge: Challenge) -> Result<()> {
        challenge.validate()?;
        let name = challenge.name().to_string();
        let pairs = challenge.len();

        self.db.mutate(self.key(), |items: &mut Vec<Challenge>| {
            if items.iter().any(|c| c.name() == name) {
                return Err(Error::DuplicateName(name.clone()));
            }
            items.push(challenge);
            Ok(())
        })?;

        tracing::info!(target: "twizzle::store", challenge = %name, pairs, "challenge added");
        Ok(())
    }

    /// Remove the first challenge named `name`, then commit.
    ///
    /// Test records that reference it are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no challenge has that name
    pub fn remove(&self, name: &str) -> Result<()> {
        self.db.mutate(self.key(), |items: &mut Vec<Challenge>| {
            let pos = items
                .iter()
                .position(|c| c.name() == name)
                .ok_or_else(|| Error::NotFound(name.to_string()))?;
            items.remove(pos);
            Ok(())
        })?;

        tracing::info!(target: "twizzle::store", challenge = %name, "challenge removed");
        Ok(())
    }

    /// Get a challenge by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no challenge has that name
    pub fn get(&self, name: &str) -> Result<Challenge> {
        tracing::debug!(target: "twizzle::store", challenge = %name, "challenge lookup");
        self.list()?
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// All challenges in insertion order.
    ///
    /// Every loaded record is re-validated.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read or a stored record
    /// breaks a challenge invariant
    pub fn list(&self) -> Result<Vec<Challenge>> {
        let challenges: Vec<Challenge> = self.db.load(self.key())?;
        for challenge in &challenges {
            challenge.validate().map_err(|e| {
                Error::Storage(format!("stored challenge {:?} is invalid: {e}", challenge.name()))
            })?;
        }
        Ok(challenges)
    }

    /// Challenge names in insertion order.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend cannot be read
    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .map(|c| c.name().to_string())
            .collect())
    }

    /// Check whether a challenge named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend cannot be read
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|c| c.name() == name))
    }

    /// Number of challenges.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend cannot be read
    pub fn len(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// Check if there are no challenges.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend cannot be read
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every challenge (maintenance only).
    ///
    /// # Errors
    ///
    /// Returns error if the commit fails
    pub fn clear(&self) -> Result<()> {
        self.db.mutate(self.key(), |items: &mut Vec<Challenge>| {
            items.clear();
            Ok(())
        })?;
        tracing::info!(target: "twizzle::store", "challenges cleared");
        Ok(())
    }
}
