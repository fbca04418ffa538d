//! Explicit parameter sets for jointly constrained tuples

use serde::{Deserialize, Serialize};

use super::range::ParameterDomain;
use super::{format_value, SweepValue};
use crate::{Error, Result};

/// A multi-field parameter whose fields are validated together.
pub trait SetParameter: Copy + Serialize {
    /// Check per-field domains and the joint constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the violated constraint
    fn validate(&self) -> Result<()>;

    /// Wrap into the value handed to a perturbation
    fn into_value(self) -> SweepValue;
}

fn check_field(name: &str, value: f64, domain: &ParameterDomain) -> Result<()> {
    if value.is_finite() && domain.contains(value) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "{name} {value} is outside the attack domain {domain}"
        )))
    }
}

/// Fractions to crop from each edge of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropMargins {
    /// Fraction removed from the top edge
    pub top: f64,
    /// Fraction removed from the left edge
    pub left: f64,
    /// Fraction removed from the bottom edge
    pub bottom: f64,
    /// Fraction removed from the right edge
    pub right: f64,
}

impl CropMargins {
    /// Domain of every individual margin.
    pub const DOMAIN: ParameterDomain = ParameterDomain::new(0.0, 1.0);

    /// Validated margins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a margin is outside `[0, 1]`,
    /// `top + bottom > 1`, or `left + right > 1`
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Result<Self> {
        let margins = Self {
            top,
            left,
            bottom,
            right,
        };
        margins.validate()?;
        Ok(margins)
    }
}

impl SetParameter for CropMargins {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("top", self.top),
            ("left", self.left),
            ("bottom", self.bottom),
            ("right", self.right),
        ] {
            check_field(name, value, &Self::DOMAIN)?;
        }
        if self.top + self.bottom > 1.0 || self.left + self.right > 1.0 {
            return Err(Error::validation(format!(
                "crop margins {self:?} violate top + bottom <= 1 and left + right <= 1"
            )));
        }
        Ok(())
    }

    fn into_value(self) -> SweepValue {
        SweepValue::Crop(self)
    }
}

impl std::fmt::Display for CropMargins {
    /// `(top_left_bottom_right)`, safe as a file name fragment.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}_{}_{}_{})",
            format_value(self.top),
            format_value(self.left),
            format_value(self.bottom),
            format_value(self.right)
        )
    }
}

/// Independent horizontal and vertical scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
    /// Horizontal factor
    pub x: f64,
    /// Vertical factor
    pub y: f64,
}

impl ScaleFactors {
    /// Domain of each factor.
    pub const DOMAIN: ParameterDomain = ParameterDomain::new(0.0, 10.0);

    /// Validated factors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a factor is outside `[0, 10]`
    pub fn new(x: f64, y: f64) -> Result<Self> {
        let factors = Self { x, y };
        factors.validate()?;
        Ok(factors)
    }
}

impl SetParameter for ScaleFactors {
    fn validate(&self) -> Result<()> {
        check_field("x", self.x, &Self::DOMAIN)?;
        check_field("y", self.y, &Self::DOMAIN)
    }

    fn into_value(self) -> SweepValue {
        SweepValue::Scale(self)
    }
}

impl std::fmt::Display for ScaleFactors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}_{})", format_value(self.x), format_value(self.y))
    }
}

/// Non-empty, validated, ordered set of tuples.
///
/// ## Example
///
/// ```rust
/// use twizzle::sweep::{CropMargins, ParameterSet};
///
/// # fn main() -> twizzle::Result<()> {
/// let mut builder = ParameterSet::builder();
/// builder.push(CropMargins::new(0.1, 0.0, 0.2, 0.0)?)?;
/// builder.push(CropMargins::new(0.0, 0.3, 0.0, 0.3)?)?;
/// let set = builder.build()?;
/// assert_eq!(set.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet<T> {
    items: Vec<T>,
}

impl<T: SetParameter> ParameterSet<T> {
    /// Start an empty builder
    #[must_use]
    pub const fn builder() -> ParameterSetBuilder<T> {
        ParameterSetBuilder { items: Vec::new() }
    }

    /// Validate every tuple and build in one call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on the first invalid tuple or if `items` is empty
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut builder = Self::builder();
        for item in items {
            builder.push(item)?;
        }
        builder.build()
    }

    /// Tuples in insertion order
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of tuples
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a built set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Accumulates tuples; each is validated on [`push`](Self::push).
#[derive(Debug, Clone)]
pub struct ParameterSetBuilder<T> {
    items: Vec<T>,
}

impl<T: SetParameter> ParameterSetBuilder<T> {
    /// Accept `item` if it satisfies its constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`]; the builder is unchanged
    pub fn push(&mut self, item: T) -> Result<&mut Self> {
        item.validate()?;
        self.items.push(item);
        Ok(self)
    }

    /// Number of accepted tuples so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing has been accepted yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finish the set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if no tuple was pushed
    pub fn build(self) -> Result<ParameterSet<T>> {
        if self.items.is_empty() {
            return Err(Error::validation("parameter set needs at least one tuple"));
        }
        Ok(ParameterSet { items: self.items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_joint_constraint() {
        assert!(CropMargins::new(0.5, 0.2, 0.5, 0.8).is_ok());
        assert!(CropMargins::new(0.6, 0.0, 0.5, 0.0).is_err());
        assert!(CropMargins::new(0.0, 0.7, 0.0, 0.4).is_err());
        assert!(CropMargins::new(-0.1, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_without_losing_state() {
        let mut builder = ParameterSet::builder();
        builder.push(ScaleFactors { x: 1.0, y: 2.0 }).unwrap();
        assert!(builder.push(ScaleFactors { x: 11.0, y: 1.0 }).is_err());
        assert_eq!(builder.len(), 1);

        let set = builder.build().unwrap();
        assert_eq!(set.items(), &[ScaleFactors { x: 1.0, y: 2.0 }]);
    }

    #[test]
    fn test_empty_set_rejected() {
        let builder = ParameterSet::<CropMargins>::builder();
        assert!(matches!(builder.build(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_labels() {
        let crop = CropMargins::new(0.1, 0.0, 0.25, 0.0).unwrap();
        assert_eq!(crop.to_string(), "(0.1_0.0_0.25_0.0)");
        assert_eq!(ScaleFactors::new(2.0, 0.5).unwrap().to_string(), "(2.0_0.5)");
    }
}
