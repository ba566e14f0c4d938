//! The quorum source capability.

use bytes::Bytes;
use woodpecker_types::LogId;

use crate::error::WitnessError;

/// A source of witness-cosigned checkpoints.
///
/// Implementations return raw note bytes only; verifying the log signature
/// and counting witness cosignatures is the caller's job.
#[async_trait::async_trait]
pub trait WitnessQuorumSource: Send + Sync {
    /// Verifier keys of every witness this source knows about.
    async fn witness_keys(&self) -> Result<Vec<String>, WitnessError>;

    /// Latest checkpoint for `log_id` cosigned by at least `n` witnesses.
    ///
    /// Fails if no such checkpoint is currently available.
    async fn checkpoint_n(&self, log_id: LogId, n: usize) -> Result<Bytes, WitnessError>;
}
