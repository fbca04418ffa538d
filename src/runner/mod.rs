//! Test runner: evaluate algorithms against stored challenges
//!
//! A run loads the challenge, hands its pairs to the algorithm, scores the
//! decisions against the ground truth and appends a [`TestRecord`]. Any
//! failure appends nothing.
//!
//! Runs execute either on the caller's thread ([`TestRunner::run`]) or on a
//! fixed-size rayon pool ([`TestRunner::run_async`]). There is no ordering
//! between concurrent runs; records land in completion order.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use twizzle::metadata::Metadata;
//! use twizzle::runner::{from_fn, AlgorithmOutput, TestRunner};
//! use twizzle::store::Database;
//!
//! # fn main() -> twizzle::Result<()> {
//! let db = Arc::new(Database::in_memory());
//! db.challenges().add(
//!     "flip",
//!     vec!["a.png".into(), "b.png".into()],
//!     vec!["a_1.png".into(), "c.png".into()],
//!     vec![true, false],
//!     Metadata::new(),
//! )?;
//!
//! let runner = TestRunner::new(Arc::clone(&db), 2)?;
//! let always_same = Arc::new(from_fn(|originals, _comparatives, _params: &()| {
//!     Ok(AlgorithmOutput::new(vec![true; originals.len()], Metadata::new()))
//! }));
//!
//! let handle = runner.run_async("flip", always_same, ());
//! let records = TestRunner::await_all([handle])?;
//! assert!((records[0].error_rate() - 0.5).abs() < f64::EPSILON);
//! # Ok(())
//! # }
//! ```

mod algorithm;
mod handle;

pub use algorithm::{
    from_fn, Algorithm, AlgorithmOutput, HashThresholdDecider, PerceptualHash, ThresholdParams,
};
pub use handle::{RunHandle, RunState};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::record::TestRecord;
use crate::store::Database;
use crate::{Error, Result};

/// Worker count used when the caller has no preference.
pub const DEFAULT_WORKERS: usize = 2;

/// Fraction of decisions that disagree with the ground truth.
///
/// # Errors
///
/// - [`Error::SizeMismatch`] if the lengths differ
/// - [`Error::Validation`] if both are empty
#[allow(clippy::cast_precision_loss)]
pub fn error_rate(predicted: &[bool], ground_truth: &[bool]) -> Result<f64> {
    if predicted.len() != ground_truth.len() {
        return Err(Error::SizeMismatch {
            expected: ground_truth.len(),
            found: predicted.len(),
        });
    }
    if ground_truth.is_empty() {
        return Err(Error::validation("cannot score an empty challenge"));
    }
    let mismatches = predicted
        .iter()
        .zip(ground_truth)
        .filter(|(p, t)| p != t)
        .count();
    Ok(mismatches as f64 / ground_truth.len() as f64)
}

/// Evaluate `algorithm` on the challenge named `challenge` and record the result.
///
/// # Errors
///
/// - [`Error::NotFound`] if the challenge does not exist
/// - [`Error::SizeMismatch`] if the algorithm returns the wrong number of decisions
/// - [`Error::Validation`] if its metadata uses a reserved test field
/// - Whatever the algorithm itself returns
/// - Storage errors if the append fails
pub fn run_test<P, A>(db: &Database, challenge: &str, algorithm: &A, params: &P) -> Result<TestRecord>
where
    A: Algorithm<P> + ?Sized,
{
    let challenge = db.challenges().get(challenge)?;
    let AlgorithmOutput {
        decisions,
        metadata,
    } = algorithm.evaluate(challenge.originals(), challenge.comparatives(), params)?;

    let rate = error_rate(&decisions, challenge.ground_truth())?;
    let record = TestRecord::new(challenge.name(), rate, metadata)?;
    db.tests().append(record.clone())?;
    Ok(record)
}

/// Runs challenges synchronously or on a bounded worker pool.
pub struct TestRunner {
    db: Arc<Database>,
    pool: rayon::ThreadPool,
    workers: usize,
    next_id: AtomicU64,
}

impl std::fmt::Debug for TestRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRunner")
            .field("workers", &self.workers)
            .field("submitted", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl TestRunner {
    /// Create a runner with `workers` pool threads.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `workers` is zero
    /// - [`Error::Other`] if the pool threads cannot be spawned
    pub fn new(db: Arc<Database>, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::validation("worker pool needs at least one thread"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("twizzle-worker-{i}"))
            .build()
            .map_err(|e| Error::Other(format!("failed to build worker pool: {e}")))?;

        tracing::debug!(target: "twizzle::runner", workers, "test runner started");
        Ok(Self {
            db,
            pool,
            workers,
            next_id: AtomicU64::new(0),
        })
    }

    /// Runner with [`DEFAULT_WORKERS`] threads.
    ///
    /// # Errors
    ///
    /// Returns error if the pool threads cannot be spawned
    pub fn with_default_workers(db: Arc<Database>) -> Result<Self> {
        Self::new(db, DEFAULT_WORKERS)
    }

    /// Database the runner reads challenges from and appends tests to
    #[must_use]
    pub const fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Pool size
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Run on the caller's thread.
    ///
    /// # Errors
    ///
    /// See [`run_test`]
    pub fn run<P, A>(&self, challenge: &str, algorithm: &A, params: &P) -> Result<TestRecord>
    where
        A: Algorithm<P> + ?Sized,
    {
        let outcome = run_test(&self.db, challenge, algorithm, params);
        log_outcome(None, challenge, &outcome);
        outcome
    }

    /// Submit a run to the pool and return immediately.
    ///
    /// A panic inside the algorithm fails this handle with
    /// [`Error::TaskPanicked`]; the worker survives.
    pub fn run_async<P, A>(
        &self,
        challenge: impl Into<String>,
        algorithm: Arc<A>,
        params: P,
    ) -> RunHandle
    where
        P: Send + 'static,
        A: Algorithm<P> + ?Sized + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let challenge = challenge.into();
        let shared = handle::Shared::new();

        let db = Arc::clone(&self.db);
        let worker_shared = Arc::clone(&shared);
        let worker_challenge = challenge.clone();

        tracing::debug!(target: "twizzle::runner", run_id = id, challenge = %challenge, "run queued");
        self.pool.spawn(move || {
            worker_shared.start();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                run_test(&db, &worker_challenge, algorithm.as_ref(), &params)
            }))
            .unwrap_or_else(|payload| Err(Error::TaskPanicked(panic_message(payload.as_ref()))));

            log_outcome(Some(id), &worker_challenge, &outcome);
            worker_shared.finish(outcome);
        });

        RunHandle::new(id, challenge, shared)
    }

    /// Wait for every handle, then return all records or the first failure
    /// in submission order.
    ///
    /// # Errors
    ///
    /// Returns the error of the earliest submitted failed run
    pub fn await_all(handles: impl IntoIterator<Item = RunHandle>) -> Result<Vec<TestRecord>> {
        Self::settle_all(handles).into_iter().collect()
    }

    /// Wait for every handle and return each one's own outcome, in order.
    pub fn settle_all(handles: impl IntoIterator<Item = RunHandle>) -> Vec<Result<TestRecord>> {
        handles.into_iter().map(RunHandle::wait).collect()
    }
}

fn log_outcome(run_id: Option<u64>, challenge: &str, outcome: &Result<TestRecord>) {
    match outcome {
        Ok(record) => tracing::info!(
            target: "twizzle::runner",
            run_id,
            challenge = %challenge,
            error_rate = record.error_rate(),
            "run completed"
        ),
        Err(e) => tracing::warn!(
            target: "twizzle::runner",
            run_id,
            challenge = %challenge,
            error = %e,
            "run failed"
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
