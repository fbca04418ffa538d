//! Numeric parameter ranges: half-open arithmetic sweeps `[min, max)`

use serde::Serialize;

use crate::{Error, Result};

/// Upper bound on the number of values a single range may produce.
pub const MAX_SWEEP_VALUES: usize = 1_000_000;

/// Closed interval of values an attack accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterDomain {
    /// Smallest accepted value
    pub min: f64,
    /// Largest accepted value
    pub max: f64,
}

impl ParameterDomain {
    /// Create a domain `[min, max]`
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check if `value` lies inside the domain
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Width of the domain
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

impl std::fmt::Display for ParameterDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Half-open sweep `min, min + step, ...` strictly below `max`.
///
/// Value `i` is computed as `min + i * step` (no accumulated error). The
/// sequence stops at the first computed value `>= max`, so rounding never
/// lets a value reach `max`.
///
/// ## Example
///
/// ```rust
/// use twizzle::sweep::ParameterRange;
///
/// let range = ParameterRange::new(0.0, 10.0, 3.0).unwrap();
/// assert_eq!(range.values(), vec![0.0, 3.0, 6.0, 9.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRange {
    min: f64,
    max: f64,
    step: f64,
}

impl ParameterRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any bound is non-finite, `step <= 0`,
    /// `min > max`, or the range would produce more than
    /// [`MAX_SWEEP_VALUES`] values
    #[allow(clippy::cast_precision_loss)]
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(Error::validation(format!(
                "range bounds must be finite (min={min}, max={max}, step={step})"
            )));
        }
        if step <= 0.0 {
            return Err(Error::validation(format!("step must be positive, got {step}")));
        }
        if min > max {
            return Err(Error::validation(format!("min {min} is greater than max {max}")));
        }

        let count = ((max - min) / step).ceil();
        if count > MAX_SWEEP_VALUES as f64 {
            return Err(Error::validation(format!(
                "range [{min}, {max}) with step {step} yields more than {MAX_SWEEP_VALUES} values"
            )));
        }

        Ok(Self { min, max, step })
    }

    /// Check the range against an attack's domain.
    ///
    /// `min` and `max` must lie in the domain and `step` may not exceed its width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the offending bound
    pub fn check_domain(&self, domain: &ParameterDomain) -> Result<()> {
        for (label, value) in [("min", self.min), ("max", self.max)] {
            if !domain.contains(value) {
                return Err(Error::validation(format!(
                    "{label} {value} is outside the attack domain {domain}"
                )));
            }
        }
        if self.step > domain.width() {
            return Err(Error::validation(format!(
                "step {} is larger than the attack domain {domain}",
                self.step
            )));
        }
        Ok(())
    }

    /// Inclusive lower bound
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Exclusive upper bound
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Distance between consecutive values
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Number of values produced
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn len(&self) -> usize {
        let mut n = ((self.max - self.min) / self.step).ceil() as usize;
        while n > 0 && self.value_at(n - 1) >= self.max {
            n -= 1;
        }
        while self.value_at(n) < self.max {
            n += 1;
        }
        n
    }

    #[allow(clippy::cast_precision_loss)]
    fn value_at(&self, i: usize) -> f64 {
        self.min + i as f64 * self.step
    }

    /// Check if the range produces no values (`min == max`)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the values in ascending order
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.value_at(i))
    }

    /// Collect the values
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_and_uneven_steps() {
        assert_eq!(
            ParameterRange::new(0.0, 10.0, 2.0).unwrap().values(),
            vec![0.0, 2.0, 4.0, 6.0, 8.0]
        );
        assert_eq!(
            ParameterRange::new(0.0, 10.0, 3.0).unwrap().values(),
            vec![0.0, 3.0, 6.0, 9.0]
        );
    }

    #[test]
    fn test_rounding_never_reaches_max() {
        let noise = ParameterRange::new(0.1, 0.4, 0.1).unwrap();
        assert_eq!(noise.len(), 3);
        assert!(noise.values().iter().all(|v| *v < 0.4));

        let values = ParameterRange::new(1.0, 1.3, 0.1).unwrap().values();
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| *v < 1.3));
    }

    #[test]
    fn test_non_positive_step_fails_fast() {
        assert!(ParameterRange::new(0.0, 10.0, 0.0).is_err());
        assert!(ParameterRange::new(0.0, 10.0, -1.0).is_err());
        assert!(ParameterRange::new(0.0, 10.0, f64::NAN).is_err());
    }

    #[test]
    fn test_inverted_and_huge_ranges_rejected() {
        assert!(ParameterRange::new(5.0, 1.0, 1.0).is_err());
        assert!(ParameterRange::new(0.0, 1.0, 1e-9).is_err());
    }

    #[test]
    fn test_degenerate_range_is_empty() {
        let range = ParameterRange::new(4.0, 4.0, 1.0).unwrap();
        assert!(range.is_empty());
        assert!(range.values().is_empty());
    }

    #[test]
    fn test_domain_checks() {
        let domain = ParameterDomain::new(0.0, 0.5);
        assert!(ParameterRange::new(0.0, 0.5, 0.1).unwrap().check_domain(&domain).is_ok());
        assert!(ParameterRange::new(0.0, 0.6, 0.1).unwrap().check_domain(&domain).is_err());

        let err = ParameterRange::new(0.0, 0.5, 0.75)
            .unwrap()
            .check_domain(&domain)
            .unwrap_err();
        assert!(err.to_string().contains("step"));
    }

    #[test]
    fn test_serializes_bounds() {
        let json = serde_json::to_value(ParameterRange::new(0.0, 360.0, 90.0).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"min": 0.0, "max": 360.0, "step": 90.0}));
    }
}
