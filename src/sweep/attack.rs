//! Attack catalog: names, parameter shapes and valid domains

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::range::{ParameterDomain, ParameterRange};
use crate::{Error, Result};

/// How an attack is parameterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackKind {
    /// Scalar swept over a [`ParameterRange`]
    Range,
    /// Explicit set of [`CropMargins`](super::CropMargins)
    CropSet,
    /// Explicit set of [`ScaleFactors`](super::ScaleFactors)
    ScaleSet,
    /// A single pattern image blended over every original
    Overlay,
}

/// Known perturbations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attack {
    /// Rotate by an angle in degrees, cropping to the original frame
    #[serde(rename = "rotation_cropped")]
    RotationCropped,
    /// Rotate by an angle in degrees, enlarging the frame to fit
    #[serde(rename = "rotation_fitted")]
    RotationFitted,
    /// Crop the same fraction from every edge
    #[serde(rename = "crop_uniform")]
    CropUniform,
    /// Crop a separate fraction from each edge
    #[serde(rename = "crop_nonuniform")]
    CropNonuniform,
    /// Re-encode as JPEG at a quality percentage
    #[serde(rename = "JPEG_quality")]
    JpegQuality,
    /// Multiplicative speckle noise with the given sigma
    #[serde(rename = "speckle_noise")]
    SpeckleNoise,
    /// Salt and pepper noise amount
    #[serde(rename = "salt_pepper_noise")]
    SaltPepperNoise,
    /// Additive gaussian noise with the given sigma
    #[serde(rename = "gauss_noise")]
    GaussNoise,
    /// Scale both axes by one factor
    #[serde(rename = "scale_uniform")]
    ScaleUniform,
    /// Scale each axis separately
    #[serde(rename = "scale_nonuniform")]
    ScaleNonuniform,
    /// Contrast adjustment
    #[serde(rename = "contrast")]
    Contrast,
    /// Gamma correction
    #[serde(rename = "gamma")]
    Gamma,
    /// Blend a pattern image over the original
    #[serde(rename = "overlay")]
    Overlay,
}

impl Attack {
    /// Every attack, in catalog order.
    pub const ALL: [Self; 13] = [
        Self::RotationCropped,
        Self::RotationFitted,
        Self::CropUniform,
        Self::CropNonuniform,
        Self::JpegQuality,
        Self::SpeckleNoise,
        Self::SaltPepperNoise,
        Self::GaussNoise,
        Self::ScaleUniform,
        Self::ScaleNonuniform,
        Self::Contrast,
        Self::Gamma,
        Self::Overlay,
    ];

    /// Name used in generated file names and the `attack` metadata key
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RotationCropped => "rotation_cropped",
            Self::RotationFitted => "rotation_fitted",
            Self::CropUniform => "crop_uniform",
            Self::CropNonuniform => "crop_nonuniform",
            Self::JpegQuality => "JPEG_quality",
            Self::SpeckleNoise => "speckle_noise",
            Self::SaltPepperNoise => "salt_pepper_noise",
            Self::GaussNoise => "gauss_noise",
            Self::ScaleUniform => "scale_uniform",
            Self::ScaleNonuniform => "scale_nonuniform",
            Self::Contrast => "contrast",
            Self::Gamma => "gamma",
            Self::Overlay => "overlay",
        }
    }

    /// Parameter shape
    #[must_use]
    pub const fn kind(self) -> AttackKind {
        match self {
            Self::CropNonuniform => AttackKind::CropSet,
            Self::ScaleNonuniform => AttackKind::ScaleSet,
            Self::Overlay => AttackKind::Overlay,
            _ => AttackKind::Range,
        }
    }

    /// Valid scalar domain, for range attacks only
    #[must_use]
    pub const fn domain(self) -> Option<ParameterDomain> {
        let (min, max) = match self {
            Self::RotationCropped | Self::RotationFitted => (0.0, 360.0),
            Self::CropUniform => (0.0, 0.5),
            Self::JpegQuality => (0.0, 100.0),
            Self::SpeckleNoise | Self::SaltPepperNoise | Self::GaussNoise => (0.0, 1.0),
            Self::ScaleUniform | Self::Gamma => (0.0, 10.0),
            Self::Contrast => (-128.0, 128.0),
            Self::CropNonuniform | Self::ScaleNonuniform | Self::Overlay => return None,
        };
        Some(ParameterDomain::new(min, max))
    }

    /// Build a range and check it against this attack's domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the attack is not range-parameterized
    /// or the range is invalid for its domain
    pub fn range(self, min: f64, max: f64, step: f64) -> Result<ParameterRange> {
        let domain = self.domain().ok_or_else(|| {
            Error::validation(format!("attack {self} is not parameterized by a range"))
        })?;
        let range = ParameterRange::new(min, max, step)?;
        range.check_domain(&domain)?;
        Ok(range)
    }
}

impl std::fmt::Display for Attack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attack {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|attack| attack.name() == s)
            .ok_or_else(|| Error::validation(format!("unknown attack {s:?}")))
    }
}
