//! Record schema
//!
//! ```text
//! Challenge (1) ──< TestRecord (N)   [weak reference by challenge name]
//! ```
//!
//! Both records persist as flat JSON objects: fixed fields plus the
//! flattened metadata map.
//!
//! ## Usage
//!
//! ```rust
//! use twizzle::metadata::Metadata;
//! use twizzle::record::{Challenge, TestRecord};
//!
//! # fn main() -> twizzle::Result<()> {
//! let challenge = Challenge::new(
//!     "print_scan_1",
//!     vec!["c1.png".into(), "c2.png".into()],
//!     vec!["c1_scan.png".into(), "c7.png".into()],
//!     vec![true, false],
//!     Metadata::new().with("printer", "DC783"),
//! )?;
//!
//! let record = TestRecord::new(challenge.name(), 0.5, Metadata::new().with("algorithm", "dhash"))?;
//! assert_eq!(record.challenge(), "print_scan_1");
//! # Ok(())
//! # }
//! ```

mod challenge;
mod test_record;

pub use challenge::{Challenge, CHALLENGE_RESERVED_FIELDS};
pub use test_record::{TestRecord, TestRecordBuilder, TEST_RESERVED_FIELDS};
