//! Error types for the controller.

use std::sync::Arc;

use woodpecker_log::LogError;
use woodpecker_note::NoteError;

/// Errors are shared between the caller and the view, hence reference counted.
pub type SharedError = Arc<ControllerError>;

/// Errors surfaced by controller operations.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Reading the selected log failed.
    #[error(transparent)]
    Log(#[from] LogError),

    /// A witnessed checkpoint did not open against the log key.
    #[error("witnessed checkpoint verification failed: {0}")]
    Verification(#[from] NoteError),

    /// Too few distinct configured witnesses cosigned.
    #[error("witness quorum not met: {found} of {required} required cosignatures")]
    Quorum {
        /// Distinct configured witnesses that cosigned.
        found: usize,
        /// Current threshold.
        required: usize,
    },

    /// The requested leaf is not covered by the current checkpoint.
    ///
    /// `index` is `None` when the position cannot be represented, such as the
    /// leaf before index 0. `size` is `None` when no checkpoint is known.
    #[error("leaf {} out of range: {}", describe_index(.index), describe_size(.size))]
    OutOfRange {
        index: Option<u64>,
        size: Option<u64>,
    },

    /// No log is registered under the given origin.
    #[error("unknown log {0:?}")]
    UnknownLog(String),

    /// The log reported a smaller tree than it did before.
    #[error("checkpoint regressed from size {previous} to {fetched}")]
    Regressed {
        /// Size of the last accepted checkpoint.
        previous: u64,
        /// Size of the rejected checkpoint.
        fetched: u64,
    },

    /// The registry has no logs to select.
    #[error("no logs configured")]
    NoLogs,

    /// The controller task is no longer running.
    #[error("controller stopped")]
    Stopped,
}

fn describe_index(index: &Option<u64>) -> String {
    match index {
        Some(i) => i.to_string(),
        None => "(none)".to_string(),
    }
}

fn describe_size(size: &Option<u64>) -> String {
    match size {
        Some(s) => format!("tree size is {s}"),
        None => "no checkpoint known".to_string(),
    }
}

impl ControllerError {
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
