//! Challenge Creation Example
//!
//! Adds a hand-built challenge and a curated `_S` / `_D` challenge to a
//! SQLite-backed catalog, then lists the catalog.
//!
//! Run with: cargo run --example challenge_creation

use twizzle::config::StoreConfig;
use twizzle::ingest::CuratedPairs;
use twizzle::metadata::Metadata;
use twizzle::store::Database;

fn main() -> anyhow::Result<()> {
    twizzle::logging::init_from_env();
    println!("=== Twizzle Challenge Creation ===\n");

    let dir = tempfile::tempdir()?;
    let db = Database::open(StoreConfig::sqlite(dir.path().join("twizzle.db")))?;

    // -------------------------------------------------------------------------
    // 1. A challenge given as three aligned lists
    // -------------------------------------------------------------------------
    println!("1. Adding print/scan challenge...");
    db.challenges().add(
        "image_hashing_challenge_print_scan_1",
        vec!["c1.png".into(), "c2.png".into(), "c3.png".into()],
        vec!["c1.png".into(), "c5.png".into(), "c6.png".into()],
        vec![true, false, false],
        Metadata::new()
            .with("printer", "DC783")
            .with("paper", "recycled paper")
            .with("print_dpi", 300),
    )?;

    // -------------------------------------------------------------------------
    // 2. A curated challenge from labeled file names
    // -------------------------------------------------------------------------
    println!("2. Pairing curated scans...");
    let listing: Vec<String> = ["scans/a.png", "scans/a_S.png", "scans/b.png", "scans/b_D.png"]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    let pairs = CuratedPairs::pair(&listing, &listing)?;
    println!("   {} pairs", pairs.len());
    db.challenges()
        .insert(pairs.into_challenge("curated_scans", Metadata::new().with("source", "scanner"))?)?;

    // -------------------------------------------------------------------------
    // 3. Catalog
    // -------------------------------------------------------------------------
    println!("\n3. Catalog:");
    for challenge in db.challenges().list()? {
        println!(
            "   {:<40} {:>3} pairs  {}",
            challenge.name(),
            challenge.len(),
            serde_json::to_string(challenge.metadata())?
        );
    }

    Ok(())
}
