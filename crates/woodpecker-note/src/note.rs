//! Signed note splitting, opening and signing.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use tracing::debug;
use woodpecker_types::SignatureLine;

use crate::error::NoteError;
use crate::verifier::{Signer, Verifier};

/// Every signature line starts with an em dash and a space.
const SIG_PREFIX: &str = "\u{2014} ";

/// A note whose signatures have been checked against a set of known keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Signed text, including its trailing newline.
    pub text: String,
    /// Every signature line, in order of appearance.
    pub signatures: Vec<SignatureLine>,
    /// Names of the known keys whose signatures verified, deduplicated.
    pub verified: Vec<String>,
}

impl Note {
    /// Split `msg` into text and signature lines without checking anything
    /// beyond the layout.
    pub fn split(msg: &[u8]) -> Result<(String, Vec<SignatureLine>), NoteError> {
        let msg = std::str::from_utf8(msg)
            .map_err(|_| NoteError::Malformed("note is not valid UTF-8".into()))?;

        let split = msg
            .rfind("\n\n")
            .ok_or_else(|| NoteError::Malformed("missing blank line before signatures".into()))?;
        let text = &msg[..split + 1];
        let sig_block = &msg[split + 2..];

        if !sig_block.ends_with('\n') {
            return Err(NoteError::Malformed(
                "signature block must end with a newline".into(),
            ));
        }

        let mut signatures = Vec::new();
        for line in sig_block.lines() {
            signatures.push(parse_signature_line(line)?);
        }
        if signatures.is_empty() {
            return Err(NoteError::Malformed("note has no signatures".into()));
        }

        Ok((text.to_string(), signatures))
    }

    /// Split `msg` and verify every signature made by one of `known`.
    ///
    /// Signatures by unknown keys are kept but not checked. A signature by a
    /// known key that fails verification rejects the whole note, as does a
    /// note with no signature from any known key.
    pub fn open(msg: &[u8], known: &[&Verifier]) -> Result<Self, NoteError> {
        let (text, signatures) = Self::split(msg)?;

        let mut verified: Vec<String> = Vec::new();
        for sig in &signatures {
            let Some(verifier) = known
                .iter()
                .find(|v| v.name() == sig.name && v.key_hash() == sig.key_hash)
            else {
                debug!(name = %sig.name, "skipping signature from unknown key");
                continue;
            };

            if !verifier.verify(text.as_bytes(), &sig.signature) {
                return Err(NoteError::InvalidSignature {
                    name: sig.name.clone(),
                });
            }
            if !verified.iter().any(|n| n == verifier.name()) {
                verified.push(verifier.name().to_string());
            }
        }

        if verified.is_empty() {
            return Err(NoteError::NoVerifiedSignatures);
        }

        Ok(Self {
            text,
            signatures,
            verified,
        })
    }

    /// Whether the key with the given name produced a verified signature.
    pub fn is_verified_by(&self, name: &str) -> bool {
        self.verified.iter().any(|n| n == name)
    }
}

fn parse_signature_line(line: &str) -> Result<SignatureLine, NoteError> {
    let rest = line
        .strip_prefix(SIG_PREFIX)
        .ok_or_else(|| NoteError::Malformed(format!("bad signature line: {line:?}")))?;
    let (name, b64) = rest
        .split_once(' ')
        .ok_or_else(|| NoteError::Malformed(format!("bad signature line: {line:?}")))?;

    let decoded = B64
        .decode(b64)
        .map_err(|_| NoteError::Malformed(format!("bad signature encoding for {name}")))?;
    if name.is_empty() || decoded.len() < 5 {
        return Err(NoteError::Malformed(format!("short signature for {name}")));
    }

    let key_hash = u32::from_be_bytes([decoded[0], decoded[1], decoded[2], decoded[3]]);
    Ok(SignatureLine {
        name: name.to_string(),
        key_hash,
        signature: decoded[4..].to_vec(),
    })
}

/// Sign `text` with each of `signers` and return the complete note.
///
/// `text` must end with a newline.
pub fn sign_note(text: &str, signers: &[&Signer]) -> Result<Bytes, NoteError> {
    if !text.ends_with('\n') {
        return Err(NoteError::Malformed("note text must end with a newline".into()));
    }

    let mut out = String::with_capacity(text.len() + signers.len() * 128);
    out.push_str(text);
    out.push('\n');
    for signer in signers {
        let mut payload = signer.key_hash().to_be_bytes().to_vec();
        payload.extend_from_slice(&signer.sign(text.as_bytes()));
        out.push_str(SIG_PREFIX);
        out.push_str(signer.name());
        out.push(' ');
        out.push_str(&B64.encode(&payload));
        out.push('\n');
    }
    Ok(Bytes::from(out))
}
