//! Run handles: the per-run state machine shared with a pool worker

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::record::TestRecord;
use crate::{Error, Result};

/// Lifecycle of a submitted run.
///
/// `Queued → Running → {Completed | Failed}`; terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Waiting for a free worker
    Queued,
    /// A worker is evaluating the algorithm
    Running,
    /// Record appended to the test store
    Completed,
    /// Nothing appended; the error is held by the handle
    Failed,
}

impl RunState {
    /// Check if the run can no longer change state
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

struct Slot {
    state: RunState,
    outcome: Option<Result<TestRecord>>,
}

/// State shared between a [`RunHandle`] and the worker executing it.
pub(super) struct Shared {
    slot: Mutex<Slot>,
    settled: Condvar,
}

impl Shared {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Slot {
                state: RunState::Queued,
                outcome: None,
            }),
            settled: Condvar::new(),
        })
    }

    // The slot is only held for field assignments, so a poisoned lock still
    // carries consistent data.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn start(&self) {
        self.lock().state = RunState::Running;
    }

    pub(super) fn finish(&self, outcome: Result<TestRecord>) {
        let mut slot = self.lock();
        slot.state = if outcome.is_ok() {
            RunState::Completed
        } else {
            RunState::Failed
        };
        slot.outcome = Some(outcome);
        drop(slot);
        self.settled.notify_all();
    }
}

/// Handle on a run submitted with [`TestRunner::run_async`](super::TestRunner::run_async).
///
/// The outcome is retrieved exactly once, by [`RunHandle::wait`].
pub struct RunHandle {
    id: u64,
    challenge: String,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("id", &self.id)
            .field("challenge", &self.challenge)
            .field("state", &self.state())
            .finish()
    }
}

impl RunHandle {
    pub(super) fn new(id: u64, challenge: String, shared: Arc<Shared>) -> Self {
        Self {
            id,
            challenge,
            shared,
        }
    }

    /// Submission sequence number, unique per runner
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Challenge name the run was submitted against
    #[must_use]
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// Current state (non-blocking)
    #[must_use]
    pub fn state(&self) -> RunState {
        self.shared.lock().state
    }

    /// Check if the run has settled
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Block until the run settles and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns the error that failed the run: validation, lookup, size
    /// mismatch, storage, or [`Error::TaskPanicked`]
    pub fn wait(self) -> Result<TestRecord> {
        let mut slot = self.shared.lock();
        while slot.outcome.is_none() {
            slot = self
                .shared
                .settled
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
        match slot.outcome.take() {
            Some(outcome) => outcome,
            None => Err(Error::Other(format!("run {} settled without an outcome", self.id))),
        }
    }
}
