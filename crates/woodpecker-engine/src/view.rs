//! The shared view of the selected log.
//!
//! [`ViewModel`] is written only by the [`Controller`](crate::Controller),
//! which runs on a single task, and read by any number of display tasks. All
//! fields live behind one `RwLock` that is never held across an `.await`, and
//! every mutation raises the [`DirtySignal`] after the lock is released.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use woodpecker_types::{Checkpoint, Leaf, WitnessedCheckpoint};

use crate::error::SharedError;
use crate::signal::DirtySignal;

/// A consistent copy of everything the view holds.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Origin of the selected log.
    pub selected: Option<String>,
    /// Last accepted checkpoint of the selected log.
    pub checkpoint: Option<Checkpoint>,
    /// Witnessed checkpoint from the last refresh, if the quorum was met.
    pub witnessed: Option<WitnessedCheckpoint>,
    /// Last successfully fetched leaf.
    pub leaf: Leaf,
    /// Outcome of the last operation.
    pub error: Option<SharedError>,
    /// Witness quorum threshold used by the next refresh.
    pub witness_threshold: usize,
}

/// Process-wide view state plus its change signal.
#[derive(Debug)]
pub struct ViewModel {
    origins: Vec<String>,
    state: RwLock<ViewState>,
    dirty: DirtySignal,
}

impl ViewModel {
    /// Create a view over the given log origins with nothing loaded yet.
    ///
    /// No change is signalled until the first mutation.
    pub fn new(origins: Vec<String>, selected: Option<String>, witness_threshold: usize) -> Self {
        Self {
            origins,
            state: RwLock::new(ViewState {
                selected,
                witness_threshold,
                ..ViewState::default()
            }),
            dirty: DirtySignal::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // -----------------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------------

    /// Origins of every configured log, in configuration order.
    pub fn log_origins(&self) -> &[String] {
        &self.origins
    }

    pub fn dirty(&self) -> &DirtySignal {
        &self.dirty
    }

    pub fn snapshot(&self) -> ViewState {
        self.read().clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.read().selected.clone()
    }

    pub fn checkpoint(&self) -> Option<Checkpoint> {
        self.read().checkpoint.clone()
    }

    pub fn witnessed(&self) -> Option<WitnessedCheckpoint> {
        self.read().witnessed.clone()
    }

    pub fn leaf(&self) -> Leaf {
        self.read().leaf.clone()
    }

    pub fn error(&self) -> Option<SharedError> {
        self.read().error.clone()
    }

    pub fn witness_threshold(&self) -> usize {
        self.read().witness_threshold
    }

    // -----------------------------------------------------------------------
    // Mutators (controller only)
    // -----------------------------------------------------------------------

    /// Publish the outcome of one refresh as a single update.
    pub(crate) fn set_checkpoint(
        &self,
        checkpoint: Option<Checkpoint>,
        witnessed: Option<WitnessedCheckpoint>,
        error: Option<SharedError>,
    ) {
        {
            let mut state = self.write();
            state.checkpoint = checkpoint;
            state.witnessed = witnessed;
            state.error = error;
        }
        self.dirty.raise();
    }

    pub(crate) fn set_leaf(&self, leaf: Leaf, error: Option<SharedError>) {
        {
            let mut state = self.write();
            state.leaf = leaf;
            state.error = error;
        }
        self.dirty.raise();
    }

    /// Record an error without touching the displayed leaf.
    pub(crate) fn set_leaf_error(&self, error: SharedError) {
        self.write().error = Some(error);
        self.dirty.raise();
    }

    pub(crate) fn set_witness_threshold(&self, n: usize) {
        self.write().witness_threshold = n;
        self.dirty.raise();
    }

    /// Switch to another log, dropping everything derived from the previous one.
    pub(crate) fn select(&self, origin: &str) {
        {
            let mut state = self.write();
            state.selected = Some(origin.to_string());
            state.checkpoint = None;
            state.witnessed = None;
            state.leaf = Leaf::default();
            state.error = None;
        }
        self.dirty.raise();
    }
}
