//! Witness quorum policy.

use std::sync::Arc;

use tracing::{debug, warn};
use woodpecker_log::LogIdentity;
use woodpecker_note::open_checkpoint;
use woodpecker_types::WitnessedCheckpoint;
use woodpecker_witness::{WitnessKeys, WitnessQuorumSource};

use crate::error::ControllerError;

/// A quorum below two would mean trusting a single witness.
pub const MIN_WITNESSES: usize = 2;

/// Number of distinct witness cosignatures required, clamped to
/// `[MIN_WITNESSES, configured witness keys]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WitnessThreshold {
    n: usize,
    configured: usize,
}

impl WitnessThreshold {
    /// Start at `initial`, clamped into range.
    ///
    /// With fewer than [`MIN_WITNESSES`] keys configured the threshold stays at
    /// the minimum and no witnessed checkpoint can be accepted.
    pub fn new(initial: usize, configured: usize) -> Self {
        let max = configured.max(MIN_WITNESSES);
        Self {
            n: initial.clamp(MIN_WITNESSES, max),
            configured,
        }
    }

    pub fn get(&self) -> usize {
        self.n
    }

    /// Raise by one unless every configured witness is already required.
    pub fn inc(&mut self) -> usize {
        if self.n < self.configured {
            self.n += 1;
        }
        self.n
    }

    /// Lower by one, never below [`MIN_WITNESSES`].
    pub fn dec(&mut self) -> usize {
        if self.n > MIN_WITNESSES {
            self.n -= 1;
        }
        self.n
    }
}

/// Open `raw` as a checkpoint of `log` and require at least `threshold`
/// cosignatures from distinct keys in `witnesses`.
pub fn verify_quorum(
    raw: &[u8],
    log: &LogIdentity,
    witnesses: &WitnessKeys,
    threshold: usize,
) -> Result<WitnessedCheckpoint, ControllerError> {
    let opened = open_checkpoint(raw, log.origin(), log.verifier(), witnesses.verifiers())?;
    if opened.witnesses.len() < threshold {
        return Err(ControllerError::Quorum {
            found: opened.witnesses.len(),
            required: threshold,
        });
    }
    Ok(WitnessedCheckpoint {
        checkpoint: opened.checkpoint,
        witnesses: opened.witnesses,
    })
}

/// Ask `source` for a checkpoint of `log` with `threshold` cosignatures and
/// verify it.
///
/// Any failure yields `None`: an unavailable or unverifiable witnessed
/// checkpoint is simply absent.
pub(crate) async fn fetch_witnessed(
    source: Arc<dyn WitnessQuorumSource>,
    log: LogIdentity,
    witnesses: Arc<WitnessKeys>,
    threshold: usize,
) -> Option<WitnessedCheckpoint> {
    let raw = match source.checkpoint_n(log.log_id(), threshold).await {
        Ok(raw) => raw,
        Err(e) => {
            debug!(origin = %log.origin(), threshold, %e, "no witnessed checkpoint available");
            return None;
        }
    };

    match verify_quorum(&raw, &log, &witnesses, threshold) {
        Ok(witnessed) => {
            debug!(
                origin = %log.origin(),
                size = witnessed.size(),
                witnesses = witnessed.witness_count(),
                "witnessed checkpoint accepted"
            );
            Some(witnessed)
        }
        Err(e) => {
            warn!(origin = %log.origin(), threshold, %e, "witnessed checkpoint rejected");
            None
        }
    }
}
