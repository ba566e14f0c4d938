//! Checkpoint bodies carried inside signed notes.
//!
//! A checkpoint body is:
//!
//! ```text
//! <origin>
//! <tree size, decimal>
//! <root hash, base64>
//! [extension lines...]
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use woodpecker_types::Checkpoint;

use crate::error::NoteError;
use crate::note::Note;
use crate::verifier::Verifier;

/// Result of opening a checkpoint note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedCheckpoint {
    /// The parsed checkpoint, signed by the log.
    pub checkpoint: Checkpoint,
    /// Names of the witness keys whose cosignatures verified.
    pub witnesses: Vec<String>,
}

/// Parse a checkpoint body into `(origin, size, hash, extensions)`.
pub fn parse_body(text: &str) -> Result<(String, u64, Vec<u8>, Vec<String>), NoteError> {
    if !text.ends_with('\n') {
        return Err(NoteError::Malformed(
            "checkpoint body must end with a newline".into(),
        ));
    }

    let mut lines = text.lines();
    let origin = lines
        .next()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| NoteError::Malformed("checkpoint missing origin".into()))?;
    let size = lines
        .next()
        .ok_or_else(|| NoteError::Malformed("checkpoint missing size".into()))?;
    let hash = lines
        .next()
        .ok_or_else(|| NoteError::Malformed("checkpoint missing root hash".into()))?;

    // Reject leading zeros and signs so that each size has one encoding.
    if size.is_empty()
        || !size.bytes().all(|b| b.is_ascii_digit())
        || (size.len() > 1 && size.starts_with('0'))
    {
        return Err(NoteError::Malformed(format!("bad tree size {size:?}")));
    }
    let size: u64 = size
        .parse()
        .map_err(|_| NoteError::Malformed(format!("bad tree size {size:?}")))?;
    let hash = B64
        .decode(hash)
        .map_err(|_| NoteError::Malformed("bad root hash encoding".into()))?;

    let extensions = lines.map(str::to_string).collect();
    Ok((origin.to_string(), size, hash, extensions))
}

/// Render a checkpoint body. Inverse of [`parse_body`].
pub fn marshal_body(origin: &str, size: u64, hash: &[u8], extensions: &[String]) -> String {
    let mut out = format!("{origin}\n{size}\n{}\n", B64.encode(hash));
    for ext in extensions {
        out.push_str(ext);
        out.push('\n');
    }
    out
}

/// Open `raw` as a checkpoint for `origin`.
///
/// The note must carry a valid signature from `log`. Signatures from any of
/// `witnesses` are verified too and reported in
/// [`OpenedCheckpoint::witnesses`]; deciding whether enough of them are
/// present is left to the caller.
pub fn open_checkpoint(
    raw: &[u8],
    origin: &str,
    log: &Verifier,
    witnesses: &[Verifier],
) -> Result<OpenedCheckpoint, NoteError> {
    let mut known: Vec<&Verifier> = Vec::with_capacity(witnesses.len() + 1);
    known.push(log);
    known.extend(witnesses.iter());

    let note = Note::open(raw, &known)?;
    if !note.is_verified_by(log.name()) {
        return Err(NoteError::MissingLogSignature(log.name().to_string()));
    }

    let (found, size, hash, extensions) = parse_body(&note.text)?;
    if found != origin {
        return Err(NoteError::OriginMismatch {
            expected: origin.to_string(),
            found,
        });
    }

    let witnesses = note
        .verified
        .iter()
        .filter(|n| n.as_str() != log.name())
        .cloned()
        .collect();

    Ok(OpenedCheckpoint {
        checkpoint: Checkpoint {
            origin: found,
            size,
            hash,
            extensions,
            raw: Bytes::copy_from_slice(raw),
            signatures: note.signatures,
        },
        witnesses,
    })
}
