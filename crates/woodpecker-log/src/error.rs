//! Error types for log clients.

use woodpecker_fetch::FetchError;
use woodpecker_note::NoteError;

/// Errors from building or using a log client.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Fetching a checkpoint or leaf failed.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The log's checkpoint did not open with its own key.
    #[error("checkpoint verification failed: {0}")]
    Verification(#[from] NoteError),

    /// A data tile did not contain the requested record.
    #[error("malformed tile for leaf {index}: {reason}")]
    MalformedTile {
        /// Leaf index being read.
        index: u64,
        /// What was wrong with the tile.
        reason: String,
    },

    /// The configured verifier key could not be parsed.
    #[error("invalid verifier key for {origin}: {source}")]
    InvalidKey {
        /// Origin of the offending source.
        origin: String,
        /// Parse failure.
        #[source]
        source: NoteError,
    },

    /// The configured location cannot be fetched from.
    #[error("invalid location for {origin}: {source}")]
    InvalidLocation {
        /// Origin of the offending source.
        origin: String,
        /// Construction failure.
        #[source]
        source: FetchError,
    },

    /// Two sources share one origin.
    #[error("duplicate log origin {0}")]
    DuplicateOrigin(String),
}

impl LogError {
    /// Whether this error happened while building the registry.
    ///
    /// Configuration errors are fatal at startup; the rest are per-call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey { .. } | Self::InvalidLocation { .. } | Self::DuplicateOrigin(_)
        )
    }
}
