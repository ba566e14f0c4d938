//! Error types for note and checkpoint handling.

/// Errors produced while parsing keys, opening notes or reading checkpoints.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NoteError {
    /// The verifier key string is not of the form `name+hash+key`.
    #[error("invalid verifier key: {0}")]
    InvalidKey(String),

    /// The key material names an algorithm this adapter does not handle.
    #[error("unsupported key type: {0:#04x}")]
    UnsupportedKeyType(u8),

    /// The key hash in the verifier key does not match its name and key.
    #[error("key hash mismatch for {name}")]
    KeyHashMismatch {
        /// Key name from the verifier string.
        name: String,
    },

    /// The note or checkpoint body does not follow the expected layout.
    #[error("malformed note: {0}")]
    Malformed(String),

    /// A signature from a known key failed to verify.
    #[error("invalid signature from {name}")]
    InvalidSignature {
        /// Name of the key whose signature was rejected.
        name: String,
    },

    /// None of the note's signatures came from a known key.
    #[error("no signature from a known key")]
    NoVerifiedSignatures,

    /// The note verified, but not with the log's own key.
    #[error("missing signature from log key {0}")]
    MissingLogSignature(String),

    /// The checkpoint body names a different log.
    #[error("origin mismatch: expected {expected:?}, found {found:?}")]
    OriginMismatch {
        /// Origin the caller asked for.
        expected: String,
        /// Origin found in the checkpoint body.
        found: String,
    },
}
