//! Error types for witness sources.

use woodpecker_fetch::FetchError;
use woodpecker_note::NoteError;

/// Errors from fetching witness keys or cosigned checkpoints.
#[derive(Debug, thiserror::Error)]
pub enum WitnessError {
    /// The distributor could not be reached, or has no such checkpoint.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A witness verifier key is malformed.
    #[error("invalid witness key {key:?}: {source}")]
    InvalidKey {
        /// The offending key string.
        key: String,
        /// Parse failure.
        #[source]
        source: NoteError,
    },

    /// The witness list was not a JSON array of strings.
    #[error("invalid witness list: {0}")]
    Decode(#[from] serde_json::Error),
}
