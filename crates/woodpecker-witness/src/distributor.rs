//! HTTP client for a witness distributor.
//!
//! Endpoints, relative to the distributor base:
//!
//! - `distributor/v0/witnesses`: JSON array of witness verifier keys.
//! - `distributor/v0/logs/<log id>/checkpoint.<n>`: newest checkpoint with
//!   at least `n` cosignatures.

use bytes::Bytes;
use tracing::debug;
use woodpecker_fetch::ByteFetcher;
use woodpecker_types::LogId;

use crate::error::WitnessError;
use crate::source::WitnessQuorumSource;

const WITNESSES_PATH: &str = "distributor/v0/witnesses";

/// Reads witness data from a distributor through a [`ByteFetcher`].
#[derive(Debug, Clone)]
pub struct DistributorClient {
    fetcher: ByteFetcher,
}

impl DistributorClient {
    pub fn new(fetcher: ByteFetcher) -> Self {
        Self { fetcher }
    }

    /// Path of the `n`-cosigned checkpoint for `log_id`.
    pub fn checkpoint_path(log_id: LogId, n: usize) -> String {
        format!("distributor/v0/logs/{log_id}/checkpoint.{n}")
    }
}

#[async_trait::async_trait]
impl WitnessQuorumSource for DistributorClient {
    async fn witness_keys(&self) -> Result<Vec<String>, WitnessError> {
        let raw = self.fetcher.fetch(WITNESSES_PATH).await?;
        let keys: Vec<String> = serde_json::from_slice(&raw)?;
        debug!(count = keys.len(), "fetched witness keys");
        Ok(keys)
    }

    async fn checkpoint_n(&self, log_id: LogId, n: usize) -> Result<Bytes, WitnessError> {
        Ok(self.fetcher.fetch(&Self::checkpoint_path(log_id, n)).await?)
    }
}
