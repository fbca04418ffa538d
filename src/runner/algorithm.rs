//! Algorithm contract and the hash + threshold reference decider

use serde::{Deserialize, Serialize};

use crate::deviation::{hamming_distance, DeviationFn};
use crate::metadata::Metadata;
use crate::{Error, Result};

/// What an algorithm returns for one challenge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlgorithmOutput {
    /// One decision per pair: `true` means "same content"
    pub decisions: Vec<bool>,
    /// Self-reported identity and parameters, stored on the test record
    pub metadata: Metadata,
}

impl AlgorithmOutput {
    /// Bundle decisions and metadata.
    #[must_use]
    pub const fn new(decisions: Vec<bool>, metadata: Metadata) -> Self {
        Self {
            decisions,
            metadata,
        }
    }
}

/// A decision algorithm under test.
///
/// `evaluate` receives the challenge's originals and comparatives in pair
/// order and must return exactly one decision per pair. `P` is the typed
/// parameter set the algorithm recognizes.
///
/// Closures of the right shape implement this trait; see [`from_fn`].
pub trait Algorithm<P>: Send + Sync {
    /// Decide every pair.
    ///
    /// # Errors
    ///
    /// Any error fails the run; nothing is recorded.
    fn evaluate(
        &self,
        originals: &[String],
        comparatives: &[String],
        params: &P,
    ) -> Result<AlgorithmOutput>;
}

impl<P, F> Algorithm<P> for F
where
    F: Fn(&[String], &[String], &P) -> Result<AlgorithmOutput> + Send + Sync,
{
    fn evaluate(
        &self,
        originals: &[String],
        comparatives: &[String],
        params: &P,
    ) -> Result<AlgorithmOutput> {
        self(originals, comparatives, params)
    }
}

/// Pin a closure to the [`Algorithm`] signature so its argument types are inferred.
///
/// ```
/// use twizzle::metadata::Metadata;
/// use twizzle::runner::{from_fn, AlgorithmOutput};
///
/// let always_same = from_fn(|originals, _comparatives, _params: &()| {
///     Ok(AlgorithmOutput::new(
///         vec![true; originals.len()],
///         Metadata::new().with("algorithm", "always_same"),
///     ))
/// });
/// # let _ = always_same;
/// ```
pub fn from_fn<P, F>(f: F) -> F
where
    F: Fn(&[String], &[String], &P) -> Result<AlgorithmOutput> + Send + Sync,
{
    f
}

/// A perceptual hash over an artifact reference.
///
/// Implementations load the artifact themselves; the harness only passes paths.
pub trait PerceptualHash: Send + Sync {
    /// Short identifier recorded as the `algorithm` metadata value.
    fn name(&self) -> &str;

    /// Hash the artifact at `artifact` into `hash_size`-dependent bits.
    ///
    /// # Errors
    ///
    /// Returns error if the artifact cannot be loaded or hashed
    fn hash(&self, artifact: &str, hash_size: u32) -> Result<Vec<bool>>;
}

/// Parameters recognized by [`HashThresholdDecider`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParams {
    /// Pairs with deviation `<= threshold` are decided "same"
    pub threshold: f64,
    /// Hash size handed to the perceptual hash
    pub hash_size: u32,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            hash_size: 16,
        }
    }
}

impl ThresholdParams {
    /// Validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `threshold` is outside `[0, 1]` or `hash_size` is zero
    pub fn new(threshold: f64, hash_size: u32) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::validation(format!(
                "threshold {threshold} is outside [0, 1]"
            )));
        }
        if hash_size == 0 {
            return Err(Error::validation("hash size must be positive"));
        }
        Ok(Self {
            threshold,
            hash_size,
        })
    }
}

/// Hash both artifacts, measure the deviation, compare to a threshold.
pub struct HashThresholdDecider<H> {
    hash: H,
    deviation: DeviationFn,
}

impl<H: PerceptualHash> HashThresholdDecider<H> {
    /// Decider using Hamming distance.
    #[must_use]
    pub fn new(hash: H) -> Self {
        Self {
            hash,
            deviation: hamming_distance,
        }
    }

    /// Replace the deviation measure.
    #[must_use]
    pub fn with_deviation(mut self, deviation: DeviationFn) -> Self {
        self.deviation = deviation;
        self
    }
}

impl<H: PerceptualHash> Algorithm<ThresholdParams> for HashThresholdDecider<H> {
    fn evaluate(
        &self,
        originals: &[String],
        comparatives: &[String],
        params: &ThresholdParams,
    ) -> Result<AlgorithmOutput> {
        let decisions = originals
            .iter()
            .zip(comparatives)
            .map(|(original, comparative)| {
                let a = self.hash.hash(original, params.hash_size)?;
                let b = self.hash.hash(comparative, params.hash_size)?;
                Ok((self.deviation)(&b, &a)? <= params.threshold)
            })
            .collect::<Result<Vec<bool>>>()?;

        let metadata = Metadata::new()
            .with("algorithm", self.hash.name())
            .with("hash_size", params.hash_size)
            .with("threshold", params.threshold);

        Ok(AlgorithmOutput::new(decisions, metadata))
    }
}
