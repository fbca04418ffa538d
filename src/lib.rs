//! # Twizzle: Evaluation Harness for Perceptual Matching Algorithms
//!
//! **Version**: 0.2.0
//!
//! Twizzle keeps a persistent catalog of labeled **challenges** (pairs of
//! artifacts with a known "same / different" decision), runs pluggable
//! decision algorithms against them on a bounded worker pool, and records
//! every scored run as an append-only **test** log.
//!
//! ## Components
//!
//! - [`store`]: two whole-collection snapshots (challenges, tests) over a KV file
//! - [`sweep`]: synthetic challenges from perturbed base artifacts
//! - [`runner`]: synchronous and pooled test execution with error-rate scoring
//! - [`analysis`]: joined test/challenge table, Arrow and Parquet export
//! - [`ingest`]: curated challenges from `_S` / `_D` labeled file names
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use twizzle::analysis::AnalysisAdapter;
//! use twizzle::metadata::Metadata;
//! use twizzle::runner::{from_fn, AlgorithmOutput, TestRunner};
//! use twizzle::store::Database;
//!
//! # fn main() -> twizzle::Result<()> {
//! let db = Arc::new(Database::in_memory());
//! db.challenges().add(
//!     "print_scan_1",
//!     vec!["c1.png".into(), "c2.png".into(), "c3.png".into()],
//!     vec!["c1.png".into(), "c5.png".into(), "c6.png".into()],
//!     vec![true, false, false],
//!     Metadata::new().with("printer", "DC783").with("print_dpi", 300),
//! )?;
//!
//! let runner = TestRunner::new(Arc::clone(&db), 2)?;
//! let same_name = from_fn(|originals: &[String], comparatives: &[String], _params: &()| {
//!     let decisions = originals.iter().zip(comparatives).map(|(o, c)| o == c).collect();
//!     Ok(AlgorithmOutput::new(decisions, Metadata::new().with("algorithm", "same_name")))
//! });
//! let record = runner.run("print_scan_1", &same_name, &())?;
//! assert!(record.error_rate().abs() < f64::EPSILON);
//!
//! let table = AnalysisAdapter::new(&db).build()?;
//! assert_eq!(table.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod config;
pub mod deviation;
pub mod error;
pub mod ingest;
pub mod kv;
pub mod logging;
pub mod metadata;
pub mod record;
pub mod runner;
pub mod store;
pub mod sweep;

pub use error::{Error, Result};
pub use metadata::Metadata;
pub use record::{Challenge, TestRecord};
pub use store::Database;
