//! Challenge Record - labeled dataset of artifact pairs

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::{Error, Result};

/// Field names a challenge's metadata may not use.
pub const CHALLENGE_RESERVED_FIELDS: [&str; 4] =
    ["challenge", "originals", "comparatives", "ground_truth"];

/// Challenge Record represents a named, labeled dataset.
///
/// The three sequences describe a table:
///
/// ```text
/// | original | comparative     | ground truth |
/// |----------|-----------------|--------------|
/// | img1.png | img1_scaled.png | true         |
/// | img2.png | img2_bright.png | true         |
/// | img2.png | img9.png        | false        |
/// ```
///
/// An algorithm under test decides, per row, whether the two artifacts show
/// the same content; the decision is scored against the ground truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    #[serde(rename = "challenge")]
    name: String,
    originals: Vec<String>,
    comparatives: Vec<String>,
    ground_truth: Vec<bool>,
    #[serde(flatten)]
    metadata: Metadata,
}

impl Challenge {
    /// Create a validated challenge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is empty, the sequences are
    /// empty or of different lengths, an artifact reference is empty, or a
    /// metadata key collides with [`CHALLENGE_RESERVED_FIELDS`].
    pub fn new(
        name: impl Into<String>,
        originals: Vec<String>,
        comparatives: Vec<String>,
        ground_truth: Vec<bool>,
        metadata: Metadata,
    ) -> Result<Self> {
        let challenge = Self {
            name: name.into(),
            originals,
            comparatives,
            ground_truth,
            metadata,
        };
        challenge.validate()?;
        Ok(challenge)
    }

    /// Re-check every invariant. Also used on records loaded from disk.
    ///
    /// # Errors
    ///
    /// See [`Challenge::new`]
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("challenge name must not be empty"));
        }
        let (n_orig, n_comp, n_truth) = (
            self.originals.len(),
            self.comparatives.len(),
            self.ground_truth.len(),
        );
        if n_orig == 0 || n_comp == 0 || n_truth == 0 {
            return Err(Error::validation(format!(
                "challenge {:?} needs at least one pair (originals={n_orig}, comparatives={n_comp}, ground_truth={n_truth})",
                self.name
            )));
        }
        if n_orig != n_comp || n_orig != n_truth {
            return Err(Error::validation(format!(
                "originals ({n_orig}), comparatives ({n_comp}) and ground truth ({n_truth}) must have the same length"
            )));
        }
        if let Some(pos) = self
            .originals
            .iter()
            .chain(&self.comparatives)
            .position(|path| path.is_empty())
        {
            return Err(Error::validation(format!(
                "artifact reference #{pos} is empty; every artifact must be a path string"
            )));
        }
        self.metadata.ensure_no_reserved(&CHALLENGE_RESERVED_FIELDS)
    }

    /// Get the challenge name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the original artifact references.
    #[must_use]
    pub fn originals(&self) -> &[String] {
        &self.originals
    }

    /// Get the comparative artifact references.
    #[must_use]
    pub fn comparatives(&self) -> &[String] {
        &self.comparatives
    }

    /// Get the expected decisions.
    #[must_use]
    pub fn ground_truth(&self) -> &[bool] {
        &self.ground_truth
    }

    /// Get the challenge metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ground_truth.len()
    }

    /// Always `false` for a validated challenge.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ground_truth.is_empty()
    }

    /// Iterate `(original, comparative, expected)` rows.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.originals
            .iter()
            .zip(&self.comparatives)
            .zip(&self.ground_truth)
            .map(|((o, c), &t)| (o.as_str(), c.as_str(), t))
    }
}
