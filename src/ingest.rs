//! Curated challenges from hand-labeled artifact collections
//!
//! Comparatives follow the naming rule `<stem>_S.<ext>` ("same content as
//! `<stem>`") or `<stem>_D.<ext>` ("different content"). Each comparative is
//! paired with the original whose file stem is `<stem>`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::metadata::Metadata;
use crate::record::Challenge;
use crate::{Error, Result};

/// Label carried by a comparative's file name.
fn parse_label(path: &str) -> Option<(String, bool)> {
    let stem = Path::new(path).file_stem()?.to_str()?;
    let (base, label) = stem.rsplit_once('_')?;
    if base.is_empty() {
        return None;
    }
    match label {
        "S" => Some((base.to_string(), true)),
        "D" => Some((base.to_string(), false)),
        _ => None,
    }
}

/// Check if `path` follows the `_S` / `_D` comparative naming rule
#[must_use]
pub fn is_comparative(path: &str) -> bool {
    parse_label(path).is_some()
}

/// Pairs assembled from a curated collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CuratedPairs {
    /// Original of each pair
    pub originals: Vec<String>,
    /// Labeled comparative of each pair
    pub comparatives: Vec<String>,
    /// `true` for `_S`, `false` for `_D`
    pub ground_truth: Vec<bool>,
}

impl CuratedPairs {
    /// Pair labeled comparatives with their originals.
    ///
    /// Both inputs may come from the same folder listing: labeled files are
    /// removed from `originals` and unlabeled files from `comparatives`.
    /// Pairs follow the order of `comparatives`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if an original has no comparative, a
    /// comparative has no original, two originals share a stem, or nothing
    /// is left to pair
    pub fn pair(originals: &[String], comparatives: &[String]) -> Result<Self> {
        let mut by_stem: BTreeMap<String, &String> = BTreeMap::new();
        for original in originals.iter().filter(|p| !is_comparative(p)) {
            let stem = Path::new(original)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| Error::validation(format!("{original:?} has no file name")))?;
            if by_stem.insert(stem.clone(), original).is_some() {
                return Err(Error::validation(format!(
                    "two originals share the stem {stem:?}"
                )));
            }
        }

        let mut pairs = Self::default();
        let mut matched: BTreeMap<&str, bool> = by_stem.keys().map(|k| (k.as_str(), false)).collect();
        for comparative in comparatives {
            let Some((base, same)) = parse_label(comparative) else {
                continue;
            };
            let original = by_stem.get(&base).ok_or_else(|| {
                Error::validation(format!("comparative {comparative:?} has no original named {base:?}"))
            })?;
            if let Some(seen) = matched.get_mut(base.as_str()) {
                *seen = true;
            }
            pairs.originals.push((*original).clone());
            pairs.comparatives.push(comparative.clone());
            pairs.ground_truth.push(same);
        }

        let unmatched: Vec<&str> = matched
            .into_iter()
            .filter_map(|(stem, seen)| (!seen).then_some(stem))
            .collect();
        if !unmatched.is_empty() {
            return Err(Error::validation(format!(
                "originals without a comparative: {}",
                unmatched.join(", ")
            )));
        }
        if pairs.originals.is_empty() {
            return Err(Error::validation("no labeled comparatives to pair"));
        }
        Ok(pairs)
    }

    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Check if there are no pairs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Build a challenge from the pairs.
    ///
    /// # Errors
    ///
    /// Same as [`Challenge::new`]
    pub fn into_challenge(self, name: impl Into<String>, metadata: Metadata) -> Result<Challenge> {
        Challenge::new(
            name,
            self.originals,
            self.comparatives,
            self.ground_truth,
            metadata,
        )
    }
}
