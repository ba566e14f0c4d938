//! Shared test utilities for woodpecker-engine tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use woodpecker_fetch::{FetchError, MemoryFetcher};
use woodpecker_log::layout::{SERVERLESS_CHECKPOINT, seq_path};
use woodpecker_log::{LogClient, LogIdentity, LogKind, LogRegistry};
use woodpecker_note::{KeyKind, Signer, marshal_body, sign_note};
use woodpecker_types::LogId;
use woodpecker_witness::{WitnessError, WitnessKeys, WitnessQuorumSource};

use crate::controller::Controller;
use crate::view::ViewModel;

pub const LOG_A: &str = "example.com/log-a";
pub const LOG_B: &str = "example.com/log-b";

/// An in-memory serverless log.
pub struct TestLog {
    pub origin: String,
    pub signer: Signer,
    pub mem: MemoryFetcher,
}

impl TestLog {
    pub fn new(origin: &str, seed: u8) -> Self {
        Self {
            origin: origin.to_string(),
            signer: Signer::from_seed(origin, KeyKind::Ed25519, [seed; 32]),
            mem: MemoryFetcher::new(),
        }
    }

    pub fn body(&self, size: u64) -> String {
        marshal_body(&self.origin, size, &[size as u8; 32], &[])
    }

    /// Publish a checkpoint of `size` and leaves `0..size`.
    pub fn publish(&self, size: u64) {
        for i in 0..size {
            self.mem.insert(seq_path(i), leaf_contents(&self.origin, i));
        }
        self.set_checkpoint(size);
    }

    /// Replace the checkpoint without touching the leaves.
    pub fn set_checkpoint(&self, size: u64) {
        let raw = sign_note(&self.body(size), &[&self.signer]).unwrap();
        self.mem.insert(SERVERLESS_CHECKPOINT, raw);
    }

    /// A checkpoint of `size` signed by the log and cosigned by `witnesses`.
    pub fn cosigned(&self, size: u64, witnesses: &[&Signer]) -> Bytes {
        let mut signers = vec![&self.signer];
        signers.extend_from_slice(witnesses);
        sign_note(&self.body(size), &signers).unwrap()
    }

    pub fn identity(&self) -> LogIdentity {
        LogIdentity::new(&self.origin, &self.signer.verifier_key()).unwrap()
    }

    pub fn log_id(&self) -> LogId {
        LogId::from_origin(&self.origin)
    }

    pub fn client(&self) -> LogClient {
        LogClient::new(self.identity(), self.mem.clone().into(), LogKind::Serverless)
    }
}

pub fn leaf_contents(origin: &str, index: u64) -> String {
    format!("{origin} leaf {index}\n")
}

pub fn witness(n: u8) -> Signer {
    Signer::from_seed(format!("witness-{n}"), KeyKind::CosignatureV1, [100 + n; 32])
        .with_timestamp(1_700_000_000 + u64::from(n))
}

pub fn witness_keys(signers: &[&Signer]) -> WitnessKeys {
    let keys: Vec<String> = signers.iter().map(|s| s.verifier_key()).collect();
    WitnessKeys::parse(&keys).unwrap()
}

// ---------------------------------------------------------------------------
// Fake quorum source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Serve,
    Fail,
    Hang,
}

/// Quorum source serving canned checkpoints per log and recording requests.
pub struct FakeQuorum {
    behavior: Mutex<Behavior>,
    checkpoints: Mutex<HashMap<LogId, Bytes>>,
    requests: Mutex<Vec<(LogId, usize)>>,
}

impl FakeQuorum {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            checkpoints: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn serve(&self, log_id: LogId, raw: Bytes) {
        self.checkpoints.lock().unwrap().insert(log_id, raw);
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn requests(&self) -> Vec<(LogId, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl WitnessQuorumSource for FakeQuorum {
    async fn witness_keys(&self) -> Result<Vec<String>, WitnessError> {
        Ok(Vec::new())
    }

    async fn checkpoint_n(&self, log_id: LogId, n: usize) -> Result<Bytes, WitnessError> {
        self.requests.lock().unwrap().push((log_id, n));
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            Behavior::Hang => std::future::pending().await,
            Behavior::Fail => Err(WitnessError::Fetch(FetchError::UnexpectedStatus {
                location: format!("fake/{log_id}/checkpoint.{n}"),
                status: 503,
            })),
            Behavior::Serve => self
                .checkpoints
                .lock()
                .unwrap()
                .get(&log_id)
                .cloned()
                .ok_or_else(|| WitnessError::Fetch(FetchError::NotFound(log_id.to_string()))),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller setup
// ---------------------------------------------------------------------------

pub fn controller(
    logs: &[&TestLog],
    quorum: Arc<FakeQuorum>,
    witnesses: WitnessKeys,
    threshold: usize,
) -> Controller {
    let registry = LogRegistry::from_clients(logs.iter().map(|l| l.client()).collect()).unwrap();
    Controller::new(Arc::new(registry), quorum, witnesses, threshold).unwrap()
}

/// Wait for the view to change, failing the test after a while.
pub async fn next_change(model: &ViewModel) {
    tokio::time::timeout(Duration::from_secs(5), model.dirty().wait())
        .await
        .expect("view did not change");
}
