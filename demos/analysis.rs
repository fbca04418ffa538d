//! Analysis Example
//!
//! Joins stored test results with their challenges' metadata, prints the
//! columns, and exports the table to Parquet.
//!
//! Run with: cargo run --example analysis

use std::sync::Arc;

use twizzle::analysis::{load_parquet, AnalysisAdapter};
use twizzle::metadata::Metadata;
use twizzle::runner::{from_fn, AlgorithmOutput, TestRunner};
use twizzle::store::Database;

fn main() -> anyhow::Result<()> {
    twizzle::logging::init_from_env();
    println!("=== Twizzle Analysis ===\n");

    let db = Arc::new(Database::in_memory());
    for (name, printer, dpi) in [("scan_dc783", "DC783", 300), ("scan_hp", "HP", 600)] {
        db.challenges().add(
            name,
            (0..8).map(|i| format!("{name}/o{i}.png")).collect(),
            (0..8).map(|i| format!("{name}/c{i}.png")).collect(),
            (0..8).map(|i| i % 3 != 0).collect(),
            Metadata::new().with("printer", printer).with("print_dpi", dpi),
        )?;
    }

    // -------------------------------------------------------------------------
    // 1. Populate the test store
    // -------------------------------------------------------------------------
    println!("1. Running a biased coin at several cutoffs...");
    let runner = TestRunner::new(Arc::clone(&db), 2)?;
    let coin = Arc::new(from_fn(|originals: &[String], _c: &[String], cutoff: &usize| {
        Ok(AlgorithmOutput::new(
            (0..originals.len()).map(|i| i >= *cutoff).collect(),
            Metadata::new().with("algorithm", "cutoff").with("cutoff", *cutoff),
        ))
    }));
    let mut handles = Vec::new();
    for name in ["scan_dc783", "scan_hp"] {
        for cutoff in [0usize, 2, 4] {
            handles.push(runner.run_async(name, Arc::clone(&coin), cutoff));
        }
    }
    TestRunner::await_all(handles)?;

    // -------------------------------------------------------------------------
    // 2. Join
    // -------------------------------------------------------------------------
    let table = AnalysisAdapter::new(&db).build()?;
    println!("\n2. {} rows, columns: {:?}", table.len(), table.columns());

    let mean = table
        .column("error_rate")
        .flatten()
        .filter_map(serde_json::Value::as_f64)
        .sum::<f64>()
        / table.len() as f64;
    println!("   mean error rate: {mean:.3}");

    // -------------------------------------------------------------------------
    // 3. Parquet export
    // -------------------------------------------------------------------------
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("analysis.parquet");
    table.save_parquet(&path)?;
    let rows: usize = load_parquet(&path)?.iter().map(|b| b.num_rows()).sum();
    println!("\n3. Exported {rows} rows to {}", path.display());

    Ok(())
}
