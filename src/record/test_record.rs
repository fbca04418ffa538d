//! Test Record - one scored execution of an algorithm against a challenge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::{Error, Result};

/// Field names an algorithm's self-reported metadata may not use.
pub const TEST_RESERVED_FIELDS: [&str; 3] = ["challenge", "error_rate", "created_at"];

/// Test Record represents a single scored run.
///
/// The `challenge` field is a weak reference: the record stays in the log
/// after the challenge it names has been removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestRecord {
    challenge: String,
    error_rate: f64,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    metadata: Metadata,
}

impl TestRecord {
    /// Create a new test record with the current timestamp.
    ///
    /// # Arguments
    ///
    /// * `challenge` - Name of the challenge that was run
    /// * `error_rate` - Fraction of wrong decisions, in `[0, 1]`
    /// * `metadata` - Algorithm identity and parameters
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the error rate is outside `[0, 1]` or a
    /// metadata key collides with [`TEST_RESERVED_FIELDS`].
    pub fn new(
        challenge: impl Into<String>,
        error_rate: f64,
        metadata: Metadata,
    ) -> Result<Self> {
        Self::builder(challenge, error_rate).metadata(metadata).build()
    }

    /// Create a builder for constructing a test record with optional fields.
    #[must_use]
    pub fn builder(challenge: impl Into<String>, error_rate: f64) -> TestRecordBuilder {
        TestRecordBuilder::new(challenge, error_rate)
    }

    /// Get the challenge name.
    #[must_use]
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// Get the error rate.
    #[must_use]
    pub const fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the algorithm metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Builder for `TestRecord`.
#[derive(Debug)]
pub struct TestRecordBuilder {
    challenge: String,
    error_rate: f64,
    created_at: DateTime<Utc>,
    metadata: Metadata,
}

impl TestRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(challenge: impl Into<String>, error_rate: f64) -> Self {
        Self {
            challenge: challenge.into(),
            error_rate,
            created_at: Utc::now(),
            metadata: Metadata::new(),
        }
    }

    /// Set the algorithm metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set a custom creation timestamp (useful for testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `TestRecord`.
    ///
    /// # Errors
    ///
    /// See [`TestRecord::new`]
    pub fn build(self) -> Result<TestRecord> {
        if self.challenge.is_empty() {
            return Err(Error::validation("test record must name its challenge"));
        }
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(Error::validation(format!(
                "error rate {} is outside [0, 1]",
                self.error_rate
            )));
        }
        self.metadata.ensure_no_reserved(&TEST_RESERVED_FIELDS)?;

        Ok(TestRecord {
            challenge: self.challenge,
            error_rate: self.error_rate,
            created_at: self.created_at,
            metadata: self.metadata,
        })
    }
}
