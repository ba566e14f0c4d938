//! Shared types and identifiers for woodpecker.
//!
//! This crate defines the value types passed between the woodpecker crates:
//! the log identifier ([`LogId`]), a log operator's signed attestation
//! ([`Checkpoint`]), the same attestation after witness quorum checking
//! ([`WitnessedCheckpoint`]) and a single log entry ([`Leaf`]).
//!
//! All types are immutable values: a newer checkpoint is a new value,
//! never an in-place update of an older one.

use std::fmt;

use bytes::Bytes;
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Log identifier
// ---------------------------------------------------------------------------

/// Stable identifier for a log, derived from its origin string.
///
/// Computed as `SHA-256("o:" || origin)` and rendered as lowercase hex. This is
/// the key under which witness distributors publish cosigned checkpoints.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct LogId([u8; 32]);

impl LogId {
    /// Derive the identifier for the log with the given origin.
    pub fn from_origin(origin: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"o:");
        hasher.update(origin.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Return the raw 32-byte representation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for LogId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogId({self})")
    }
}

// ---------------------------------------------------------------------------
// Checkpoints
// ---------------------------------------------------------------------------

/// One signature line of a signed note, as it appeared on the wire.
///
/// Carries the key name and key hash so that a display can list who signed,
/// whether or not the signature was checked against a known key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureLine {
    /// Key name as written in the signature line.
    pub name: String,
    /// First four bytes of the key's hash, big-endian.
    pub key_hash: u32,
    /// Raw signature bytes (key-type specific).
    pub signature: Vec<u8>,
}

/// A log operator's signed attestation of a tree size and root hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Origin line of the checkpoint body.
    pub origin: String,
    /// Number of leaves committed to by this checkpoint.
    pub size: u64,
    /// Merkle root hash over the first `size` leaves.
    pub hash: Vec<u8>,
    /// Any extension lines following the root hash, without newlines.
    pub extensions: Vec<String>,
    /// The complete signed note this checkpoint was parsed from.
    pub raw: Bytes,
    /// Every signature line present on the note, verified or not.
    pub signatures: Vec<SignatureLine>,
}

impl Checkpoint {
    /// Whether `index` addresses a leaf committed to by this checkpoint.
    pub fn contains(&self, index: u64) -> bool {
        index < self.size
    }
}

/// A checkpoint that carried at least the required number of valid
/// signatures from distinct, configured witness keys.
///
/// An unverified or under-signed checkpoint is never represented by this type;
/// the absence of a `WitnessedCheckpoint` is how a failed quorum is expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessedCheckpoint {
    /// The underlying checkpoint, verified against the log's own key.
    pub checkpoint: Checkpoint,
    /// Names of the configured witnesses whose cosignatures verified.
    pub witnesses: Vec<String>,
}

impl WitnessedCheckpoint {
    /// Tree size attested by the witnessed checkpoint.
    pub fn size(&self) -> u64 {
        self.checkpoint.size
    }

    /// Number of distinct witnesses that cosigned.
    pub fn witness_count(&self) -> usize {
        self.witnesses.len()
    }
}

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

/// One entry in a log, addressed by its index.
///
/// Only meaningful relative to a checkpoint whose size is strictly greater
/// than `index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaf {
    /// Opaque leaf contents.
    pub contents: Bytes,
    /// Position of the leaf in the log.
    pub index: u64,
}

impl Leaf {
    /// Create a leaf from its contents and index.
    pub fn new(contents: impl Into<Bytes>, index: u64) -> Self {
        Self {
            contents: contents.into(),
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_id_is_sha256_of_prefixed_origin() {
        let id = LogId::from_origin("example.com/log");
        let expected: [u8; 32] = Sha256::digest(b"o:example.com/log").into();
        assert_eq!(id.as_bytes(), &expected);
        assert_eq!(id.to_string(), hex::encode(expected));
        assert_eq!(id.to_string().len(), 64);
    }

    #[test]
    fn test_log_id_differs_per_origin() {
        assert_ne!(LogId::from_origin("a"), LogId::from_origin("b"));
    }

    #[test]
    fn test_checkpoint_contains_is_strict() {
        let cp = Checkpoint {
            origin: "o".into(),
            size: 3,
            hash: vec![0; 32],
            extensions: vec![],
            raw: Bytes::new(),
            signatures: vec![],
        };
        assert!(cp.contains(0));
        assert!(cp.contains(2));
        assert!(!cp.contains(3));
        assert!(!cp.contains(u64::MAX));
    }

    #[test]
    fn test_default_leaf_is_empty_at_zero() {
        let leaf = Leaf::default();
        assert_eq!(leaf.index, 0);
        assert!(leaf.contents.is_empty());
    }
}
