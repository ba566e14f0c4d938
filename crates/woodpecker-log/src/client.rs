//! Per-log capability bundle.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;
use woodpecker_fetch::ByteFetcher;
use woodpecker_note::{Verifier, open_checkpoint};
use woodpecker_types::{Checkpoint, LogId};

use crate::error::LogError;
use crate::identity::LogIdentity;
use crate::layout;

/// Storage layout of a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Serverless tlog: `checkpoint` plus one file per leaf under `seq/`.
    #[default]
    Serverless,
    /// Checksum database: `latest` plus height-8 data tiles.
    Sumdb,
}

/// Everything needed to read one log.
///
/// Exposes the four capabilities the controller relies on: origin, verifier,
/// checkpoint retrieval and leaf retrieval.
#[derive(Debug)]
pub struct LogClient {
    identity: LogIdentity,
    fetcher: ByteFetcher,
    kind: LogKind,
    /// Largest tree size seen by [`get_checkpoint`](Self::get_checkpoint).
    /// Tile-based layouts need it to address partial tiles.
    latest_size: AtomicU64,
}

impl LogClient {
    pub fn new(identity: LogIdentity, fetcher: ByteFetcher, kind: LogKind) -> Self {
        Self {
            identity,
            fetcher,
            kind,
            latest_size: AtomicU64::new(0),
        }
    }

    pub fn origin(&self) -> &str {
        self.identity.origin()
    }

    pub fn verifier(&self) -> &Verifier {
        self.identity.verifier()
    }

    pub fn identity(&self) -> &LogIdentity {
        &self.identity
    }

    pub fn log_id(&self) -> LogId {
        self.identity.log_id()
    }

    pub fn kind(&self) -> LogKind {
        self.kind
    }

    /// Fetch and verify the log's latest checkpoint against its own key.
    pub async fn get_checkpoint(&self) -> Result<Checkpoint, LogError> {
        let path = match self.kind {
            LogKind::Serverless => layout::SERVERLESS_CHECKPOINT,
            LogKind::Sumdb => layout::SUMDB_CHECKPOINT,
        };
        let raw = self.fetcher.fetch(path).await?;
        let opened = open_checkpoint(&raw, self.origin(), self.verifier(), &[])?;

        self.latest_size
            .fetch_max(opened.checkpoint.size, Ordering::Relaxed);
        debug!(origin = %self.origin(), size = opened.checkpoint.size, "fetched checkpoint");
        Ok(opened.checkpoint)
    }

    /// Fetch the raw contents of leaf `index`.
    ///
    /// Bounds checking against a checkpoint is the caller's job; an index past
    /// the end of the log surfaces as whatever the backend returns for a
    /// missing resource.
    pub async fn get_leaf(&self, index: u64) -> Result<Bytes, LogError> {
        match self.kind {
            LogKind::Serverless => Ok(self.fetcher.fetch(&layout::seq_path(index)).await?),
            LogKind::Sumdb => self.get_tiled_leaf(index).await,
        }
    }

    async fn get_tiled_leaf(&self, index: u64) -> Result<Bytes, LogError> {
        let mut size = self.latest_size.load(Ordering::Relaxed);
        if index >= size {
            size = self.get_checkpoint().await?.size;
        }

        let (path, offset) = layout::data_tile_path(index, size);
        let tile = self.fetcher.fetch(&path).await?;
        let records = layout::split_data_tile(&tile);
        records
            .get(offset)
            .map(|r| Bytes::copy_from_slice(r))
            .ok_or_else(|| LogError::MalformedTile {
                index,
                reason: format!("{path} holds {} records, wanted #{offset}", records.len()),
            })
    }
}
