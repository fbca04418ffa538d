//! Sweep engine and curated ingestion tests

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use twizzle::ingest::CuratedPairs;
use twizzle::metadata::Metadata;
use twizzle::store::Database;
use twizzle::sweep::{
    create_attack_challenge, from_fn, Attack, AttackKind, CropMargins, ParameterRange,
    ParameterSet, PerturbationHook, ScaleFactors, SweepEngine, SweepValue,
};
use twizzle::Error;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// =============================================================================
// Range sweeps
// =============================================================================

#[test]
fn test_documented_range_sequences() {
    assert_eq!(
        ParameterRange::new(0.0, 10.0, 2.0).unwrap().values(),
        vec![0.0, 2.0, 4.0, 6.0, 8.0]
    );
    assert_eq!(
        ParameterRange::new(0.0, 10.0, 3.0).unwrap().values(),
        vec![0.0, 3.0, 6.0, 9.0]
    );
    assert!(matches!(
        ParameterRange::new(0.0, 10.0, 0.0),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_fractional_step_stops_below_max() {
    let noop = from_fn(|_, _, _| Ok(()));
    let range = Attack::GaussNoise.range(0.1, 0.4, 0.1).unwrap();
    assert!(range.values().iter().all(|v| *v < 0.4));

    let engine = SweepEngine::range(Attack::GaussNoise, range, noop).unwrap();
    let output = engine.generate(&strings(&["a.png"]), Path::new("out")).unwrap();
    assert_eq!(output.len(), 3);
    assert!(!output.comparatives.iter().any(|c| c.ends_with("_0.4.png")));
}

#[test]
fn test_identical_inputs_identical_names() {
    let noop = from_fn(|_, _, _| Ok(()));
    let range = Attack::JpegQuality.range(50.0, 100.0, 25.0).unwrap();
    let engine = SweepEngine::range(Attack::JpegQuality, range, noop).unwrap();
    let originals = strings(&["base/a.png"]);

    let first = engine.generate(&originals, Path::new("out")).unwrap();
    let second = engine.generate(&originals, Path::new("out")).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.comparatives,
        strings(&["out/a_JPEG_quality_50.0.png", "out/a_JPEG_quality_75.0.png"])
    );
}

#[test]
fn test_every_range_attack_has_a_domain() {
    for attack in Attack::ALL {
        assert_eq!(attack.kind() == AttackKind::Range, attack.domain().is_some());
    }
}

// =============================================================================
// Set sweeps
// =============================================================================

#[test]
fn test_crop_set_sweep() {
    let set = ParameterSet::from_items([
        CropMargins::new(0.1, 0.0, 0.1, 0.0).unwrap(),
        CropMargins::new(0.0, 0.25, 0.0, 0.5).unwrap(),
    ])
    .unwrap();
    let engine = SweepEngine::crop_set(set, from_fn(|_, _, _| Ok(())));

    let output = engine.generate(&strings(&["x.png", "y.png"]), Path::new("t")).unwrap();
    assert_eq!(output.len(), 4);
    assert_eq!(output.comparatives[1], "t/x_crop_nonuniform_(0.0_0.25_0.0_0.5).png");
    assert_eq!(output.metadata.get("parameter_set").unwrap().as_array().unwrap().len(), 2);
}

#[test]
fn test_scale_set_values_passed_to_perturbation() {
    let set = ParameterSet::from_items([ScaleFactors::new(0.5, 2.0).unwrap()]).unwrap();
    let check = from_fn(|_, value, _| match value {
        SweepValue::Scale(f) if (f.x - 0.5).abs() < f64::EPSILON => Ok(()),
        other => Err(Error::Other(format!("unexpected value {other:?}"))),
    });
    let engine = SweepEngine::scale_set(set, check);
    assert!(engine.generate(&strings(&["a.png"]), Path::new("t")).is_ok());
}

// =============================================================================
// Attack challenge creation
// =============================================================================

#[test]
fn test_create_attack_challenge_writes_and_stores() {
    let dir = TempDir::new().unwrap();
    let copy = from_fn(|src, _value, dst| {
        fs::write(dst, src.to_string_lossy().as_bytes())?;
        Ok(())
    });
    let range = Attack::RotationFitted.range(0.0, 360.0, 120.0).unwrap();
    let engine = SweepEngine::range(Attack::RotationFitted, range, copy).unwrap();

    let db = Database::in_memory();
    let challenge = create_attack_challenge(
        &db.challenges(),
        "rotation_fitted_0_360",
        &engine,
        &strings(&["a.png", "b.png"]),
        dir.path(),
    )
    .unwrap();

    assert_eq!(challenge.len(), 6);
    assert!(challenge.ground_truth().iter().all(|&t| t));
    assert_eq!(challenge.metadata().get("attack").unwrap(), "rotation_fitted");
    assert_eq!(challenge.metadata().get("parameter_range").unwrap()["step"], 120.0);
    for comparative in challenge.comparatives() {
        assert!(Path::new(comparative).exists());
    }
    assert_eq!(db.challenges().get("rotation_fitted_0_360").unwrap(), challenge);
}

#[test]
fn test_extra_metadata_cannot_override_sweep_keys() {
    let range = Attack::Gamma.range(0.5, 2.0, 0.5).unwrap();
    let engine = SweepEngine::range(Attack::Gamma, range, from_fn(|_, _, _| Ok(()))).unwrap();
    let output = engine.generate(&strings(&["a.png"]), Path::new("t")).unwrap();

    let err = output
        .clone()
        .into_challenge("gamma", Metadata::new().with("attack", "contrast"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ref msg) if msg.contains("attack")));

    let challenge = output
        .into_challenge("gamma", Metadata::new().with("source", "kodak"))
        .unwrap();
    assert_eq!(challenge.metadata().get("attack").unwrap(), "gamma");
    assert_eq!(challenge.metadata().get("source").unwrap(), "kodak");
}

#[test]
fn test_create_attack_challenge_checks_name_first() {
    let db = Database::in_memory();
    db.challenges()
        .add("taken", strings(&["o"]), strings(&["c"]), vec![true], Metadata::new())
        .unwrap();

    let calls = std::sync::atomic::AtomicUsize::new(0);
    let counting = from_fn(|_, _, _| {
        calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    });
    let engine = SweepEngine::overlay("stripes.png", counting).unwrap();

    let err = create_attack_challenge(
        &db.challenges(),
        "taken",
        &engine,
        &strings(&["a.png"]),
        Path::new("t"),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

// =============================================================================
// Curated ingestion
// =============================================================================

#[test]
fn test_curated_pairs_into_challenge() {
    let listing = strings(&["scans/c1.png", "scans/c1_S.png", "scans/c2.png", "scans/c2_D.png"]);
    let pairs = CuratedPairs::pair(&listing, &listing).unwrap();
    let challenge = pairs
        .into_challenge("print_scan", Metadata::new().with("printer", "DC783"))
        .unwrap();

    assert_eq!(challenge.ground_truth(), &[true, false]);
    assert_eq!(challenge.originals(), strings(&["scans/c1.png", "scans/c2.png"]).as_slice());
}

#[test]
fn test_curated_pairs_require_counterparts() {
    let err = CuratedPairs::pair(&strings(&["c1.png", "c2.png"]), &strings(&["c1_S.png"])).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
