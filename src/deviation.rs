//! Deviation measures between two feature vectors
//!
//! Both measures return a value in `[0, 1]` for valid input and are
//! symmetric: `d(a, b) == d(b, a)`.

use trueno::Vector;

use crate::{Error, Result};

/// Signature shared by the bit-vector deviation measures.
pub type DeviationFn = fn(&[bool], &[bool]) -> Result<f64>;

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(Error::SizeMismatch {
            expected: a,
            found: b,
        });
    }
    if a == 0 {
        return Err(Error::validation("cannot measure deviation of empty vectors"));
    }
    Ok(())
}

/// Fraction of positions where two bit vectors differ.
///
/// # Errors
///
/// - [`Error::SizeMismatch`] if the vectors differ in length
/// - [`Error::Validation`] if they are empty
///
/// # Example
///
/// ```
/// use twizzle::deviation::hamming_distance;
///
/// let d = hamming_distance(&[true, false, true, true], &[true, true, true, false]).unwrap();
/// assert!((d - 0.5).abs() < f64::EPSILON);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn hamming_distance(a: &[bool], b: &[bool]) -> Result<f64> {
    check_lengths(a.len(), b.len())?;
    let differing = a.iter().zip(b).filter(|(x, y)| x != y).count();
    Ok(differing as f64 / a.len() as f64)
}

/// Mean absolute difference of two real-valued vectors.
///
/// Components are expected in `[0, 1]` (normalized hash coefficients);
/// the sum runs through trueno's SIMD Kahan reduction.
///
/// # Errors
///
/// - [`Error::SizeMismatch`] if the vectors differ in length
/// - [`Error::Validation`] if they are empty or contain NaN
#[allow(clippy::cast_precision_loss)]
pub fn normalized_l1_distance(a: &[f32], b: &[f32]) -> Result<f64> {
    check_lengths(a.len(), b.len())?;
    if a.iter().chain(b).any(|x| x.is_nan()) {
        return Err(Error::validation("feature vectors must not contain NaN"));
    }

    let diffs: Vec<f32> = a.iter().zip(b).map(|(x, y)| (x - y).abs()).collect();
    let total = Vector::from_slice(&diffs)
        .sum_kahan()
        .map_err(|e| Error::Other(format!("SIMD reduction failed: {e}")))?;

    Ok(f64::from(total) / diffs.len() as f64)
}
