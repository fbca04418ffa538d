//! Challenge and test store tests over both KV backends

use tempfile::TempDir;
use twizzle::config::StoreConfig;
use twizzle::metadata::Metadata;
use twizzle::record::TestRecord;
use twizzle::store::Database;
use twizzle::Error;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn add_print_scan(db: &Database) {
    db.challenges()
        .add(
            "image_hashing_challenge_print_scan_1",
            strings(&["c1.png", "c2.png", "c3.png"]),
            strings(&["c1.png", "c5.png", "c6.png"]),
            vec![true, false, false],
            Metadata::new()
                .with("printer", "DC783")
                .with("paper", "recycled paper")
                .with("print_dpi", 300),
        )
        .unwrap();
}

// =============================================================================
// Add / Get / Remove
// =============================================================================

#[test]
fn test_add_then_get_returns_equivalent_challenge() {
    let db = Database::in_memory();
    add_print_scan(&db);

    let challenge = db.challenges().get("image_hashing_challenge_print_scan_1").unwrap();
    assert_eq!(challenge.originals(), strings(&["c1.png", "c2.png", "c3.png"]).as_slice());
    assert_eq!(challenge.ground_truth(), &[true, false, false]);
    assert_eq!(challenge.metadata().get("print_dpi").unwrap(), 300);
}

#[test]
fn test_remove_then_get_fails() {
    let db = Database::in_memory();
    add_print_scan(&db);

    db.challenges().remove("image_hashing_challenge_print_scan_1").unwrap();
    let err = db.challenges().get("image_hashing_challenge_print_scan_1").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_every_length_mismatch_rejected() {
    let db = Database::in_memory();
    let cases = [(1, 2, 2), (2, 1, 2), (2, 2, 1), (0, 0, 0), (3, 1, 2)];

    for (n_orig, n_comp, n_truth) in cases {
        let err = db
            .challenges()
            .add(
                "mismatch",
                vec!["o.png".to_string(); n_orig],
                vec!["c.png".to_string(); n_comp],
                vec![true; n_truth],
                Metadata::new(),
            )
            .unwrap_err();
        assert!(
            matches!(err, Error::Validation(_)),
            "({n_orig}, {n_comp}, {n_truth}) gave {err:?}"
        );
    }
    assert!(db.challenges().is_empty().unwrap());
}

#[test]
fn test_reserved_metadata_key_rejected() {
    let db = Database::in_memory();
    let err = db
        .challenges()
        .add(
            "reserved",
            strings(&["a"]),
            strings(&["b"]),
            vec![true],
            Metadata::new().with("originals", "sneaky"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_empty_artifact_reference_rejected() {
    let db = Database::in_memory();
    let result = db.challenges().add(
        "blank",
        strings(&["a.png", ""]),
        strings(&["b.png", "c.png"]),
        vec![true, false],
        Metadata::new(),
    );
    assert!(matches!(result, Err(Error::Validation(_))));
}

// =============================================================================
// Persisted layout
// =============================================================================

#[test]
fn test_persisted_record_is_flat() {
    let db = Database::in_memory();
    add_print_scan(&db);

    let json = serde_json::to_value(&db.challenges().list().unwrap()[0]).unwrap();
    assert_eq!(json["challenge"], "image_hashing_challenge_print_scan_1");
    assert_eq!(json["printer"], "DC783");
    assert!(json["ground_truth"].is_array());
    assert!(json.get("metadata").is_none());
}

// =============================================================================
// SQLite backend
// =============================================================================

#[test]
fn test_sqlite_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("twizzle.db");

    {
        let db = Database::open(StoreConfig::sqlite(&path)).unwrap();
        add_print_scan(&db);
        db.tests()
            .append(
                TestRecord::new(
                    "image_hashing_challenge_print_scan_1",
                    0.33,
                    Metadata::new().with("algorithm", "dhash"),
                )
                .unwrap(),
            )
            .unwrap();
    }

    let reopened = Database::builder().sqlite(&path).open().unwrap();
    assert_eq!(
        reopened.challenges().names().unwrap(),
        vec!["image_hashing_challenge_print_scan_1"]
    );
    let tests = reopened.tests().list().unwrap();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].metadata().get("algorithm").unwrap(), "dhash");
}

#[test]
fn test_custom_collection_keys_are_isolated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.db");

    let first = Database::builder()
        .sqlite(&path)
        .challenges_key("challenges_a")
        .tests_key("tests_a")
        .open()
        .unwrap();
    add_print_scan(&first);
    drop(first);

    let second = Database::builder()
        .sqlite(&path)
        .challenges_key("challenges_b")
        .tests_key("tests_b")
        .open()
        .unwrap();
    assert!(second.challenges().is_empty().unwrap());
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_adds_lose_nothing() {
    let db = Database::in_memory();

    std::thread::scope(|scope| {
        for t in 0..8 {
            let db = &db;
            scope.spawn(move || {
                for i in 0..10 {
                    db.challenges()
                        .add(
                            &format!("c-{t}-{i}"),
                            strings(&["o"]),
                            strings(&["c"]),
                            vec![true],
                            Metadata::new(),
                        )
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(db.challenges().len().unwrap(), 80);
}
