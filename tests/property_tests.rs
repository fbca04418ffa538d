//! Property-based tests for twizzle
//!
//! - Sweep ranges: length, bounds, ordering
//! - Store: add/get/remove equivalence
//! - Scoring: error-rate bounds and complement
//! - Deviation: symmetry and identity

use proptest::prelude::*;
use twizzle::deviation::{hamming_distance, normalized_l1_distance};
use twizzle::metadata::Metadata;
use twizzle::runner::error_rate;
use twizzle::store::Database;
use twizzle::sweep::{CropMargins, ParameterRange};
use twizzle::Error;

// ============================================================================
// Strategies
// ============================================================================

/// (min, max, step) with min <= max and a moderate value count
fn arb_range() -> impl Strategy<Value = (f64, f64, f64)> {
    (-100.0f64..100.0, 0.0f64..200.0, 0.5f64..50.0)
        .prop_map(|(min, width, step)| (min, min + width, step))
}

/// Two equal-length bit vectors
fn arb_bit_pair() -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
    (1usize..256).prop_flat_map(|n| {
        (
            proptest::collection::vec(any::<bool>(), n),
            proptest::collection::vec(any::<bool>(), n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Sweep range properties
    // ========================================================================

    /// Property: values start at min, stay strictly below max, and stop at the first one that would not
    #[test]
    fn prop_range_values_half_open((min, max, step) in arb_range()) {
        let range = ParameterRange::new(min, max, step).unwrap();
        let values = range.values();

        prop_assert_eq!(values.len(), range.len());
        prop_assert!(min + values.len() as f64 * step >= max);
        if let Some(first) = values.first() {
            prop_assert!((first - min).abs() < f64::EPSILON);
        }
        for pair in values.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for v in &values {
            prop_assert!(*v < max);
        }
    }

    /// Property: any non-positive step is rejected
    #[test]
    fn prop_non_positive_step_rejected(min in -10.0f64..10.0, step in -10.0f64..=0.0) {
        let result = ParameterRange::new(min, min + 5.0, step);
        prop_assert!(matches!(result, Err(Error::Validation(_))));
    }

    /// Property: crop margins are accepted exactly when both sums fit
    #[test]
    fn prop_crop_joint_constraint(
        top in 0.0f64..=1.0,
        left in 0.0f64..=1.0,
        bottom in 0.0f64..=1.0,
        right in 0.0f64..=1.0,
    ) {
        let accepted = CropMargins::new(top, left, bottom, right).is_ok();
        prop_assert_eq!(accepted, top + bottom <= 1.0 && left + right <= 1.0);
    }

    // ========================================================================
    // Store properties
    // ========================================================================

    /// Property: add then get returns an equivalent challenge; remove makes it unreachable
    #[test]
    fn prop_add_get_remove(
        name in "[a-z][a-z0-9_]{0,15}",
        rows in proptest::collection::vec(("[a-z]{1,8}\\.png", "[a-z]{1,8}\\.png", any::<bool>()), 1..20),
    ) {
        let db = Database::in_memory();
        let originals: Vec<String> = rows.iter().map(|r| r.0.clone()).collect();
        let comparatives: Vec<String> = rows.iter().map(|r| r.1.clone()).collect();
        let truth: Vec<bool> = rows.iter().map(|r| r.2).collect();

        db.challenges()
            .add(&name, originals.clone(), comparatives.clone(), truth.clone(), Metadata::new())
            .unwrap();
        let stored = db.challenges().get(&name).unwrap();
        prop_assert_eq!(stored.originals(), originals.as_slice());
        prop_assert_eq!(stored.comparatives(), comparatives.as_slice());
        prop_assert_eq!(stored.ground_truth(), truth.as_slice());

        db.challenges().remove(&name).unwrap();
        prop_assert!(matches!(db.challenges().get(&name), Err(Error::NotFound(_))));
    }

    // ========================================================================
    // Scoring and deviation properties
    // ========================================================================

    /// Property: error rate is in [0, 1] and inverting every decision complements it
    #[test]
    fn prop_error_rate_complement((predicted, truth) in arb_bit_pair()) {
        let rate = error_rate(&predicted, &truth).unwrap();
        let inverted: Vec<bool> = predicted.iter().map(|p| !p).collect();
        let complement = error_rate(&inverted, &truth).unwrap();

        prop_assert!((0.0..=1.0).contains(&rate));
        prop_assert!((rate + complement - 1.0).abs() < 1e-12);
    }

    /// Property: hamming distance is symmetric and zero on identity
    #[test]
    fn prop_hamming_symmetric((a, b) in arb_bit_pair()) {
        prop_assert_eq!(hamming_distance(&a, &b).unwrap(), hamming_distance(&b, &a).unwrap());
        prop_assert_eq!(hamming_distance(&a, &a).unwrap(), 0.0);
    }

    /// Property: L1 distance is symmetric and bounded for unit-interval inputs
    #[test]
    fn prop_l1_symmetric(
        pairs in proptest::collection::vec((0.0f32..=1.0, 0.0f32..=1.0), 1..128),
    ) {
        let a: Vec<f32> = pairs.iter().map(|p| p.0).collect();
        let b: Vec<f32> = pairs.iter().map(|p| p.1).collect();
        let ab = normalized_l1_distance(&a, &b).unwrap();
        let ba = normalized_l1_distance(&b, &a).unwrap();

        prop_assert!((ab - ba).abs() < 1e-6);
        prop_assert!((-1e-6..=1.0 + 1e-6).contains(&ab));
    }
}
