//! Verifier keys and their signing counterparts.
//!
//! A verifier key is written `<name>+<key hash>+<base64 key>`, where the
//! decoded key starts with a one-byte algorithm identifier and the key hash
//! is the first four bytes of `SHA-256(name || "\n" || key)` in hex.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use ed25519_dalek::{Signer as _, Verifier as _};
use sha2::{Digest, Sha256};

use crate::error::NoteError;

/// Algorithm identifier for plain Ed25519 note signatures.
const ALG_ED25519: u8 = 0x01;
/// Algorithm identifier for timestamped witness cosignatures.
const ALG_COSIGNATURE_V1: u8 = 0x04;

const ED25519_SIG_LEN: usize = 64;
const TIMESTAMP_LEN: usize = 8;

/// The signature scheme a key uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Ed25519 signature directly over the note text.
    Ed25519,
    /// Ed25519 over `"cosignature/v1\ntime <t>\n" || text`, prefixed by `t`.
    CosignatureV1,
}

impl KeyKind {
    fn from_alg(alg: u8) -> Result<Self, NoteError> {
        match alg {
            ALG_ED25519 => Ok(Self::Ed25519),
            ALG_COSIGNATURE_V1 => Ok(Self::CosignatureV1),
            other => Err(NoteError::UnsupportedKeyType(other)),
        }
    }

    fn alg(self) -> u8 {
        match self {
            Self::Ed25519 => ALG_ED25519,
            Self::CosignatureV1 => ALG_COSIGNATURE_V1,
        }
    }
}

/// Compute the 4-byte key hash over a name and its encoded key.
fn key_hash(name: &str, encoded_key: &[u8]) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"\n");
    hasher.update(encoded_key);
    let digest = hasher.finalize();
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

fn cosigned_message(timestamp: u64, msg: &[u8]) -> Vec<u8> {
    let mut out = format!("cosignature/v1\ntime {timestamp}\n").into_bytes();
    out.extend_from_slice(msg);
    out
}

/// A named public key able to check note signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verifier {
    name: String,
    key_hash: u32,
    kind: KeyKind,
    key: VerifyingKey,
}

impl Verifier {
    /// Parse a verifier key string of the form `name+hash+base64key`.
    pub fn new(vkey: &str) -> Result<Self, NoteError> {
        let invalid = || NoteError::InvalidKey(vkey.to_string());

        let (name, rest) = vkey.split_once('+').ok_or_else(invalid)?;
        let (hash_hex, key_b64) = rest.split_once('+').ok_or_else(invalid)?;
        if name.is_empty() || name.chars().any(char::is_whitespace) || hash_hex.len() != 8 {
            return Err(invalid());
        }

        let hash = u32::from_str_radix(hash_hex, 16).map_err(|_| invalid())?;
        let encoded = B64.decode(key_b64).map_err(|_| invalid())?;
        let (&alg, raw_key) = encoded.split_first().ok_or_else(invalid)?;
        let kind = KeyKind::from_alg(alg)?;

        let raw_key: &[u8; 32] = raw_key.try_into().map_err(|_| invalid())?;
        let key = VerifyingKey::from_bytes(raw_key).map_err(|_| invalid())?;

        if key_hash(name, &encoded) != hash {
            return Err(NoteError::KeyHashMismatch {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            key_hash: hash,
            kind,
            key,
        })
    }

    /// Key name, as it appears in signature lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key hash, as it prefixes each signature.
    pub fn key_hash(&self) -> u32 {
        self.key_hash
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Check `sig` over `msg`. Malformed signatures simply fail.
    pub fn verify(&self, msg: &[u8], sig: &[u8]) -> bool {
        match self.kind {
            KeyKind::Ed25519 => Signature::from_slice(sig)
                .map(|s| self.key.verify(msg, &s).is_ok())
                .unwrap_or(false),
            KeyKind::CosignatureV1 => {
                if sig.len() != TIMESTAMP_LEN + ED25519_SIG_LEN {
                    return false;
                }
                let (ts, sig) = sig.split_at(TIMESTAMP_LEN);
                let mut ts_bytes = [0u8; TIMESTAMP_LEN];
                ts_bytes.copy_from_slice(ts);
                let timestamp = u64::from_be_bytes(ts_bytes);
                Signature::from_slice(sig)
                    .map(|s| {
                        self.key
                            .verify(&cosigned_message(timestamp, msg), &s)
                            .is_ok()
                    })
                    .unwrap_or(false)
            }
        }
    }
}

/// The private half of a [`Verifier`].
///
/// Used to produce checkpoints for local file-backed logs and for fixtures.
pub struct Signer {
    name: String,
    kind: KeyKind,
    key: SigningKey,
    timestamp: u64,
}

impl Signer {
    /// Build a signer from a 32-byte Ed25519 seed.
    pub fn from_seed(name: impl Into<String>, kind: KeyKind, seed: [u8; 32]) -> Self {
        Self {
            name: name.into(),
            kind,
            key: SigningKey::from_bytes(&seed),
            timestamp: 0,
        }
    }

    /// Set the timestamp embedded in cosignatures (ignored for plain Ed25519).
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn encoded_key(&self) -> Vec<u8> {
        let mut encoded = vec![self.kind.alg()];
        encoded.extend_from_slice(self.key.verifying_key().as_bytes());
        encoded
    }

    pub fn key_hash(&self) -> u32 {
        key_hash(&self.name, &self.encoded_key())
    }

    /// The verifier key string matching this signer.
    pub fn verifier_key(&self) -> String {
        let encoded = self.encoded_key();
        format!(
            "{}+{:08x}+{}",
            self.name,
            key_hash(&self.name, &encoded),
            B64.encode(&encoded)
        )
    }

    /// Sign `msg`, returning the raw signature bytes for this key kind.
    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        match self.kind {
            KeyKind::Ed25519 => self.key.sign(msg).to_bytes().to_vec(),
            KeyKind::CosignatureV1 => {
                let sig = self.key.sign(&cosigned_message(self.timestamp, msg));
                let mut out = self.timestamp.to_be_bytes().to_vec();
                out.extend_from_slice(&sig.to_bytes());
                out
            }
        }
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
