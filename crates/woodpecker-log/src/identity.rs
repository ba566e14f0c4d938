//! Static identity of a configured log.

use woodpecker_note::{NoteError, Verifier};
use woodpecker_types::LogId;

/// Origin string plus the key that signs the log's checkpoints.
///
/// Created once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogIdentity {
    origin: String,
    verifier: Verifier,
    log_id: LogId,
}

impl LogIdentity {
    /// Build an identity from an origin and a verifier key string.
    pub fn new(origin: impl Into<String>, vkey: &str) -> Result<Self, NoteError> {
        let origin = origin.into();
        let verifier = Verifier::new(vkey)?;
        let log_id = LogId::from_origin(&origin);
        Ok(Self {
            origin,
            verifier,
            log_id,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// Identifier used by witness distributors.
    pub fn log_id(&self) -> LogId {
        self.log_id
    }
}
