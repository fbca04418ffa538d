//! Parameter sweeps: synthetic challenges from perturbed base artifacts
//!
//! A [`SweepEngine`] pairs one [`Attack`] with its parameter values and an
//! external [`Perturbation`] that writes the derived artifacts. For every
//! base artifact and every value (base-major), the perturbation is asked
//! to write `<target_dir>/<stem>_<attack>_<value>.png`, and the pair is
//! labeled "same" by construction.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//! use twizzle::sweep::{from_fn, Attack, PerturbationHook, SweepEngine};
//!
//! # fn main() -> twizzle::Result<()> {
//! let range = Attack::RotationCropped.range(0.0, 180.0, 90.0)?;
//! let noop = from_fn(|_src, _value, _dst| Ok(()));
//! let engine = SweepEngine::range(Attack::RotationCropped, range, noop)?;
//!
//! let output = engine.generate(&["img/cat.png".to_string()], Path::new("out"))?;
//! assert_eq!(output.comparatives, vec![
//!     "out/cat_rotation_cropped_0.0.png".to_string(),
//!     "out/cat_rotation_cropped_90.0.png".to_string(),
//! ]);
//! # Ok(())
//! # }
//! ```

mod attack;
mod range;
mod set;

pub use attack::{Attack, AttackKind};
pub use range::{ParameterDomain, ParameterRange, MAX_SWEEP_VALUES};
pub use set::{CropMargins, ParameterSet, ParameterSetBuilder, ScaleFactors, SetParameter};

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::metadata::Metadata;
use crate::record::Challenge;
use crate::store::ChallengeStore;
use crate::{Error, Result};

/// Extension of every generated artifact.
pub const DERIVED_EXTENSION: &str = "png";

/// Format a scalar the way generated names expect it.
///
/// Integral values keep one decimal (`2.0`); everything else uses the
/// shortest representation that round-trips (`0.1`, `0.30000000000000004`).
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// One parameter value handed to a [`Perturbation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SweepValue {
    /// Scalar from a [`ParameterRange`]
    Scalar(f64),
    /// Tuple from a crop [`ParameterSet`]
    Crop(CropMargins),
    /// Tuple from a scale [`ParameterSet`]
    Scale(ScaleFactors),
    /// Pattern image for [`Attack::Overlay`]
    Overlay(PathBuf),
}

impl SweepValue {
    /// Suffix used in the derived artifact name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if an overlay path has no file stem
    pub fn label(&self) -> Result<String> {
        match self {
            Self::Scalar(v) => Ok(format_value(*v)),
            Self::Crop(margins) => Ok(margins.to_string()),
            Self::Scale(factors) => Ok(factors.to_string()),
            Self::Overlay(pattern) => file_stem(pattern),
        }
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| Error::validation(format!("{} has no file name", path.display())))
}

/// Writes one derived artifact. Implemented by the caller's image library.
///
/// Closures `Fn(&Path, &SweepValue, &Path) -> Result<()>` implement it.
pub trait Perturbation: Send + Sync {
    /// Read `source`, apply the perturbation with `value`, write `destination`.
    ///
    /// # Errors
    ///
    /// Any error aborts the sweep
    fn apply(&self, source: &Path, value: &SweepValue, destination: &Path) -> Result<()>;
}

impl<F> Perturbation for F
where
    F: Fn(&Path, &SweepValue, &Path) -> Result<()> + Send + Sync,
{
    fn apply(&self, source: &Path, value: &SweepValue, destination: &Path) -> Result<()> {
        self(source, value, destination)
    }
}

/// Pin a closure to the [`Perturbation`] signature.
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&Path, &SweepValue, &Path) -> Result<()> + Send + Sync,
{
    f
}

/// Labeled pairs produced by a sweep, ready to become a challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutput {
    /// Base artifacts, each repeated once per parameter value
    pub originals: Vec<String>,
    /// Generated artifacts, positionally aligned with `originals`
    pub comparatives: Vec<String>,
    /// All `true`
    pub ground_truth: Vec<bool>,
    /// `attack` plus the parameter description
    pub metadata: Metadata,
}

impl SweepOutput {
    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Check if no pairs were produced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Build a challenge, adding `extra` to the sweep metadata.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `extra` repeats a sweep key such as `attack`
    /// - Otherwise the same as [`Challenge::new`]
    pub fn into_challenge(self, name: impl Into<String>, extra: Metadata) -> Result<Challenge> {
        if let Some((key, _)) = extra.iter().find(|(key, _)| self.metadata.contains_key(key)) {
            return Err(Error::validation(format!(
                "metadata key {key:?} is set by the sweep and cannot be overridden"
            )));
        }
        let mut metadata = self.metadata;
        metadata.extend(extra);
        Challenge::new(
            name,
            self.originals,
            self.comparatives,
            self.ground_truth,
            metadata,
        )
    }
}

/// Generates labeled pairs from base artifacts into a target directory.
pub trait PerturbationHook {
    /// Run the sweep.
    ///
    /// # Errors
    ///
    /// Returns error if the inputs are invalid or a perturbation fails
    fn generate(&self, originals: &[String], target_dir: &Path) -> Result<SweepOutput>;
}

#[derive(Debug, Clone)]
enum Plan {
    Range(ParameterRange),
    Crop(ParameterSet<CropMargins>),
    Scale(ParameterSet<ScaleFactors>),
    Overlay(PathBuf),
}

/// An attack, its parameter values and the perturbation that applies them.
pub struct SweepEngine<T> {
    attack: Attack,
    plan: Plan,
    perturbation: T,
}

impl<T> std::fmt::Debug for SweepEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepEngine")
            .field("attack", &self.attack)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl<T: Perturbation> SweepEngine<T> {
    /// Sweep a scalar attack over `range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `attack` is not a range attack or
    /// `range` falls outside its domain
    pub fn range(attack: Attack, range: ParameterRange, perturbation: T) -> Result<Self> {
        let domain = attack.domain().ok_or_else(|| {
            Error::validation(format!("attack {attack} is not parameterized by a range"))
        })?;
        range.check_domain(&domain)?;
        Ok(Self {
            attack,
            plan: Plan::Range(range),
            perturbation,
        })
    }

    /// Four-sided crop over an explicit set of margins.
    #[must_use]
    pub const fn crop_set(set: ParameterSet<CropMargins>, perturbation: T) -> Self {
        Self {
            attack: Attack::CropNonuniform,
            plan: Plan::Crop(set),
            perturbation,
        }
    }

    /// Per-axis scaling over an explicit set of factors.
    #[must_use]
    pub const fn scale_set(set: ParameterSet<ScaleFactors>, perturbation: T) -> Self {
        Self {
            attack: Attack::ScaleNonuniform,
            plan: Plan::Scale(set),
            perturbation,
        }
    }

    /// Blend one pattern image over every original.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `pattern` has no file stem
    pub fn overlay(pattern: impl Into<PathBuf>, perturbation: T) -> Result<Self> {
        let pattern = pattern.into();
        file_stem(&pattern)?;
        Ok(Self {
            attack: Attack::Overlay,
            plan: Plan::Overlay(pattern),
            perturbation,
        })
    }

    /// Attack this engine applies
    #[must_use]
    pub const fn attack(&self) -> Attack {
        self.attack
    }

    /// Parameter values in sweep order
    #[must_use]
    pub fn values(&self) -> Vec<SweepValue> {
        match &self.plan {
            Plan::Range(range) => range.iter().map(SweepValue::Scalar).collect(),
            Plan::Crop(set) => set.items().iter().copied().map(SetParameter::into_value).collect(),
            Plan::Scale(set) => set.items().iter().copied().map(SetParameter::into_value).collect(),
            Plan::Overlay(pattern) => vec![SweepValue::Overlay(pattern.clone())],
        }
    }

    /// `attack` plus `parameter_range`, `parameter_set` or `blend_image`.
    ///
    /// # Errors
    ///
    /// Returns error if the parameter description cannot be serialized
    pub fn metadata(&self) -> Result<Metadata> {
        let metadata = Metadata::new().with("attack", self.attack.name());
        Ok(match &self.plan {
            Plan::Range(range) => metadata.with("parameter_range", serde_json::to_value(range)?),
            Plan::Crop(set) => metadata.with("parameter_set", serde_json::to_value(set)?),
            Plan::Scale(set) => metadata.with("parameter_set", serde_json::to_value(set)?),
            Plan::Overlay(pattern) => {
                metadata.with("blend_image", pattern.to_string_lossy().into_owned())
            }
        })
    }

    /// Deterministic location of the artifact derived from `original` with `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `original` has no file stem
    pub fn derived_path(&self, target_dir: &Path, original: &str, value: &SweepValue) -> Result<PathBuf> {
        let stem = file_stem(Path::new(original))?;
        let label = value.label()?;
        Ok(target_dir.join(format!(
            "{stem}_{}_{label}.{DERIVED_EXTENSION}",
            self.attack.name()
        )))
    }
}

impl<T: Perturbation> PerturbationHook for SweepEngine<T> {
    fn generate(&self, originals: &[String], target_dir: &Path) -> Result<SweepOutput> {
        if originals.is_empty() {
            return Err(Error::validation("sweep needs at least one base artifact"));
        }
        let values = self.values();
        if values.is_empty() {
            return Err(Error::validation(format!(
                "sweep for {} produces no parameter values",
                self.attack
            )));
        }

        let total = originals.len() * values.len();
        let mut out_originals = Vec::with_capacity(total);
        let mut comparatives = Vec::with_capacity(total);

        for original in originals {
            for value in &values {
                let destination = self.derived_path(target_dir, original, value)?;
                self.perturbation
                    .apply(Path::new(original), value, &destination)?;
                tracing::debug!(
                    target: "twizzle::sweep",
                    original = %original,
                    destination = %destination.display(),
                    "derived artifact written"
                );
                out_originals.push(original.clone());
                comparatives.push(destination.to_string_lossy().into_owned());
            }
        }

        tracing::info!(
            target: "twizzle::sweep",
            attack = %self.attack,
            bases = originals.len(),
            values = values.len(),
            "sweep generated"
        );

        Ok(SweepOutput {
            originals: out_originals,
            comparatives,
            ground_truth: vec![true; total],
            metadata: self.metadata()?,
        })
    }
}

/// Run `hook` and store the result as a challenge named `name`.
///
/// The name is checked before any artifact is generated.
///
/// # Errors
///
/// - [`Error::DuplicateName`] if `name` is taken
/// - Any error from the hook or from [`ChallengeStore::insert`]
pub fn create_attack_challenge<H>(
    store: &ChallengeStore<'_>,
    name: &str,
    hook: &H,
    originals: &[String],
    target_dir: &Path,
) -> Result<Challenge>
where
    H: PerturbationHook + ?Sized,
{
    if name.trim().is_empty() {
        return Err(Error::validation("challenge name must not be empty"));
    }
    if store.contains(name)? {
        return Err(Error::DuplicateName(name.to_string()));
    }

    let challenge = hook
        .generate(originals, target_dir)?
        .into_challenge(name, Metadata::new())?;
    store.insert(challenge.clone())?;
    Ok(challenge)
}
