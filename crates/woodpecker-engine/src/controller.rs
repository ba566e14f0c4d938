//! The controller: the single writer of the [`ViewModel`].
//!
//! Operations here are not meant to overlap. Callers serialize them, which
//! the [`service`](crate::service) task does by owning the controller.

use std::sync::Arc;

use tracing::{debug, info, warn};
use woodpecker_log::{LogClient, LogRegistry};
use woodpecker_types::Leaf;
use woodpecker_witness::{WitnessKeys, WitnessQuorumSource};

use crate::error::{ControllerError, SharedError};
use crate::quorum::{WitnessThreshold, fetch_witnessed};
use crate::view::ViewModel;

/// Aborts a spawned task when dropped, so an abandoned refresh does not
/// leave its witness fetch running.
struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Drives checkpoint refreshes, witness quorum checks and leaf navigation.
pub struct Controller {
    model: Arc<ViewModel>,
    registry: Arc<LogRegistry>,
    client: Arc<LogClient>,
    quorum: Arc<dyn WitnessQuorumSource>,
    witnesses: Arc<WitnessKeys>,
    threshold: WitnessThreshold,
}

impl Controller {
    /// Create a controller with the first configured log selected.
    ///
    /// The view starts empty; call [`show_latest`](Self::show_latest) to
    /// populate it.
    pub fn new(
        registry: Arc<LogRegistry>,
        quorum: Arc<dyn WitnessQuorumSource>,
        witnesses: WitnessKeys,
        initial_threshold: usize,
    ) -> Result<Self, ControllerError> {
        let client = registry.first().ok_or(ControllerError::NoLogs)?;
        let threshold = WitnessThreshold::new(initial_threshold, witnesses.len());
        if threshold.get() != initial_threshold {
            warn!(
                requested = initial_threshold,
                effective = threshold.get(),
                configured = witnesses.len(),
                "witness threshold clamped"
            );
        }

        let model = Arc::new(ViewModel::new(
            registry.origins().to_vec(),
            Some(client.origin().to_string()),
            threshold.get(),
        ));

        Ok(Self {
            model,
            registry,
            client,
            quorum,
            witnesses: Arc::new(witnesses),
            threshold,
        })
    }

    pub fn model(&self) -> &Arc<ViewModel> {
        &self.model
    }

    /// The currently selected log.
    pub fn current(&self) -> &LogClient {
        &self.client
    }

    pub fn witness_threshold(&self) -> usize {
        self.threshold.get()
    }

    // -----------------------------------------------------------------------
    // Checkpoints
    // -----------------------------------------------------------------------

    /// Fetch the log's checkpoint and a witnessed checkpoint concurrently and
    /// publish both in one update.
    ///
    /// The published error only reflects the log's own checkpoint; a witness
    /// failure shows up as an absent witnessed checkpoint. When the log fetch
    /// fails, or reports a smaller tree than before, the last accepted
    /// checkpoint stays in place.
    pub async fn refresh_checkpoint(&mut self) {
        let threshold = self.threshold.get();
        let witness_task = tokio::spawn(fetch_witnessed(
            self.quorum.clone(),
            self.client.identity().clone(),
            self.witnesses.clone(),
            threshold,
        ));
        let _guard = AbortOnDrop(witness_task.abort_handle());

        let fetched = self.client.get_checkpoint().await;
        let witnessed = match witness_task.await {
            Ok(witnessed) => witnessed,
            Err(e) => {
                warn!(%e, "witness task failed");
                None
            }
        };

        let previous = self.model.checkpoint();
        match fetched {
            Ok(cp) => match previous {
                Some(prev) if cp.size < prev.size => {
                    let err = ControllerError::Regressed {
                        previous: prev.size,
                        fetched: cp.size,
                    };
                    warn!(origin = %self.client.origin(), %err, "rejecting checkpoint");
                    self.model
                        .set_checkpoint(Some(prev), witnessed, Some(Arc::new(err)));
                }
                _ => {
                    debug!(
                        origin = %self.client.origin(),
                        size = cp.size,
                        witnessed = witnessed.is_some(),
                        "checkpoint refreshed"
                    );
                    self.model.set_checkpoint(Some(cp), witnessed, None);
                }
            },
            Err(e) => {
                warn!(origin = %self.client.origin(), %e, "checkpoint refresh failed");
                self.model
                    .set_checkpoint(previous, witnessed, Some(Arc::new(e.into())));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Leaves
    // -----------------------------------------------------------------------

    /// Fetch and display leaf `index`.
    ///
    /// Fails with [`ControllerError::OutOfRange`] unless a checkpoint is known
    /// and `index` is below its size. On any failure the displayed leaf is
    /// kept and only the error changes.
    pub async fn get_leaf(&mut self, index: u64) -> Result<(), SharedError> {
        let size = self.model.checkpoint().map(|cp| cp.size);
        if !size.is_some_and(|s| index < s) {
            return Err(self.leaf_failed(ControllerError::OutOfRange {
                index: Some(index),
                size,
            }));
        }

        match self.client.get_leaf(index).await {
            Ok(contents) => {
                debug!(origin = %self.client.origin(), index, len = contents.len(), "fetched leaf");
                self.model.set_leaf(Leaf::new(contents, index), None);
                Ok(())
            }
            Err(e) => {
                warn!(origin = %self.client.origin(), index, %e, "leaf fetch failed");
                Err(self.leaf_failed(e.into()))
            }
        }
    }

    /// Move to the previous leaf. Rejected at index 0 rather than wrapping.
    pub async fn prev_leaf(&mut self) -> Result<(), SharedError> {
        match self.model.leaf().index.checked_sub(1) {
            Some(index) => self.get_leaf(index).await,
            None => Err(self.leaf_failed(ControllerError::OutOfRange {
                index: None,
                size: self.model.checkpoint().map(|cp| cp.size),
            })),
        }
    }

    /// Move to the next leaf.
    pub async fn next_leaf(&mut self) -> Result<(), SharedError> {
        match self.model.leaf().index.checked_add(1) {
            Some(index) => self.get_leaf(index).await,
            None => Err(self.leaf_failed(ControllerError::OutOfRange {
                index: None,
                size: self.model.checkpoint().map(|cp| cp.size),
            })),
        }
    }

    fn leaf_failed(&self, err: ControllerError) -> SharedError {
        let err = Arc::new(err);
        self.model.set_leaf_error(err.clone());
        err
    }

    // -----------------------------------------------------------------------
    // Selection and threshold
    // -----------------------------------------------------------------------

    /// Refresh the checkpoint, then show the newest leaf if the log is non-empty.
    pub async fn show_latest(&mut self) {
        self.refresh_checkpoint().await;
        if let Some(cp) = self.model.checkpoint()
            && cp.size > 0
        {
            // A failure is already recorded in the view.
            let _ = self.get_leaf(cp.size - 1).await;
        }
    }

    /// Switch to the log registered under `origin` and load its latest state.
    ///
    /// An unknown origin is rejected and leaves the current selection and
    /// view untouched.
    pub async fn select_log(&mut self, origin: &str) -> Result<(), SharedError> {
        let Some(client) = self.registry.get(origin) else {
            warn!(%origin, "ignoring selection of unknown log");
            return Err(Arc::new(ControllerError::UnknownLog(origin.to_string())));
        };

        info!(%origin, "selected log");
        self.client = client;
        self.model.select(origin);
        self.show_latest().await;
        Ok(())
    }

    /// Require one more witness cosignature, up to the number configured.
    ///
    /// Takes effect on the next refresh.
    pub fn inc_witnesses(&mut self) -> usize {
        let n = self.threshold.inc();
        info!(threshold = n, "witness threshold");
        self.model.set_witness_threshold(n);
        n
    }

    /// Require one fewer witness cosignature, down to the minimum.
    pub fn dec_witnesses(&mut self) -> usize {
        let n = self.threshold.dec();
        info!(threshold = n, "witness threshold");
        self.model.set_witness_threshold(n);
        n
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("selected", &self.client.origin())
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
