//! Analysis adapter: one denormalized row per test record
//!
//! Tests are inner-joined to challenges on the challenge name. The bulk
//! sequences (`originals`, `comparatives`, `ground_truth`) are dropped and
//! replaced by `challenge_size`; challenge metadata is merged into the row.
//! When a challenge key collides with a test key the test value keeps the
//! plain key and the challenge value is stored as `challenge_<key>`.
//!
//! The table converts to an Arrow [`RecordBatch`] and exports to Parquet.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::record::Challenge;
use crate::store::Database;
use crate::{Error, Result};

/// Column holding the pair count of the joined challenge.
pub const CHALLENGE_SIZE_COLUMN: &str = "challenge_size";

/// Columns placed first, in this order.
const LEADING_COLUMNS: [&str; 2] = ["challenge", "error_rate"];

/// One joined row, keyed by column name.
pub type AnalysisRow = BTreeMap<String, Value>;

/// Builds [`AnalysisTable`]s from a database.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisAdapter<'a> {
    db: &'a Database,
}

impl<'a> AnalysisAdapter<'a> {
    /// Adapter over `db`
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Join every test record to its challenge.
    ///
    /// Tests whose challenge no longer exists are skipped.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyDataset`] if there are no challenges or no tests
    /// - Storage errors if either collection cannot be read
    pub fn build(&self) -> Result<AnalysisTable> {
        let challenges = self.db.challenges().list()?;
        if challenges.is_empty() {
            return Err(Error::EmptyDataset("no challenges stored".to_string()));
        }
        let tests = self.db.tests().list()?;
        if tests.is_empty() {
            return Err(Error::EmptyDataset("no tests recorded".to_string()));
        }

        let mut index: FxHashMap<&str, &Challenge> = FxHashMap::default();
        for challenge in &challenges {
            index.entry(challenge.name()).or_insert(challenge);
        }

        let mut rows = Vec::with_capacity(tests.len());
        let mut orphaned = 0usize;
        for test in &tests {
            let Some(challenge) = index.get(test.challenge()) else {
                orphaned += 1;
                continue;
            };

            let mut row: AnalysisRow = match serde_json::to_value(test)? {
                Value::Object(map) => map.into_iter().collect(),
                other => {
                    return Err(Error::Other(format!(
                        "test record serialized as non-object: {other}"
                    )))
                }
            };
            merge_challenge_field(&mut row, CHALLENGE_SIZE_COLUMN, Value::from(challenge.len()));
            for (key, value) in challenge.metadata().iter() {
                merge_challenge_field(&mut row, key, value.clone());
            }
            rows.push(row);
        }

        tracing::debug!(
            target: "twizzle::analysis",
            rows = rows.len(),
            orphaned,
            "analysis table built"
        );
        Ok(AnalysisTable { rows })
    }
}

/// Insert under `key`, prefixing `challenge_` until the name is free.
fn merge_challenge_field(row: &mut AnalysisRow, key: &str, value: Value) {
    let mut name = key.to_string();
    while row.contains_key(&name) {
        name = format!("challenge_{name}");
    }
    row.insert(name, value);
}

/// Joined test/challenge rows in test append order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTable {
    rows: Vec<AnalysisRow>,
}

impl AnalysisTable {
    /// Rows in test append order
    #[must_use]
    pub fn rows(&self) -> &[AnalysisRow] {
        &self.rows
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no test joined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of all row keys: `challenge`, `error_rate`, then the rest sorted.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        let mut rest: Vec<&String> = self
            .rows
            .iter()
            .flat_map(BTreeMap::keys)
            .filter(|k| !LEADING_COLUMNS.contains(&k.as_str()))
            .collect();
        rest.sort();
        rest.dedup();

        LEADING_COLUMNS
            .iter()
            .filter(|lead| self.rows.iter().any(|row| row.contains_key(**lead)))
            .map(|lead| (*lead).to_string())
            .chain(rest.into_iter().cloned())
            .collect()
    }

    /// Values of `column` per row; `None` where a row lacks it.
    pub fn column<'t>(&'t self, column: &'t str) -> impl Iterator<Item = Option<&'t Value>> + 't {
        self.rows.iter().map(move |row| row.get(column).filter(|v| !v.is_null()))
    }

    /// Convert to a single Arrow batch.
    ///
    /// Each column is typed from its non-null values: all booleans →
    /// `Boolean`, all integers → `Int64`, all numbers → `Float64`,
    /// anything else → `Utf8` (non-strings JSON-encoded). Every field is nullable.
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the assembled batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let columns = self.columns();
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

        for name in &columns {
            let data_type = infer_type(self.column(name));
            let array: ArrayRef = match data_type {
                DataType::Boolean => Arc::new(BooleanArray::from(
                    self.column(name)
                        .map(|v| v.and_then(Value::as_bool))
                        .collect::<Vec<_>>(),
                )),
                DataType::Int64 => Arc::new(Int64Array::from(
                    self.column(name)
                        .map(|v| v.and_then(Value::as_i64))
                        .collect::<Vec<_>>(),
                )),
                DataType::Float64 => Arc::new(Float64Array::from(
                    self.column(name)
                        .map(|v| v.and_then(Value::as_f64))
                        .collect::<Vec<_>>(),
                )),
                _ => Arc::new(StringArray::from(
                    self.column(name)
                        .map(|v| v.map(value_to_string))
                        .collect::<Vec<_>>(),
                )),
            };
            fields.push(Field::new(name, data_type, true));
            arrays.push(array);
        }

        let schema = Arc::new(Schema::new(fields));
        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Write the table as a single-batch Parquet file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written
    pub fn save_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let batch = self.to_record_batch()?;
        let file = File::create(path.as_ref())?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;

        tracing::info!(
            target: "twizzle::analysis",
            path = %path.as_ref().display(),
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "analysis table exported"
        );
        Ok(())
    }
}

/// Read every batch of a Parquet file written by [`AnalysisTable::save_parquet`].
///
/// # Errors
///
/// Returns error if the file cannot be opened or decoded
pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Vec<RecordBatch>> {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    let file = File::open(path.as_ref())?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    reader
        .map(|batch| batch.map_err(Error::from))
        .collect()
}

fn infer_type<'v>(values: impl Iterator<Item = Option<&'v Value>>) -> DataType {
    let (mut all_bool, mut all_int, mut all_num, mut any) = (true, true, true, false);
    for value in values.flatten() {
        any = true;
        all_bool &= value.is_boolean();
        all_int &= value.is_i64();
        all_num &= value.is_number();
    }
    match (any, all_bool, all_int, all_num) {
        (false, ..) => DataType::Utf8,
        (true, true, _, _) => DataType::Boolean,
        (true, _, true, _) => DataType::Int64,
        (true, _, _, true) => DataType::Float64,
        _ => DataType::Utf8,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
