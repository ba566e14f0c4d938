//! Signed-note and checkpoint adapter.
//!
//! Transparency logs and their witnesses publish checkpoints as signed notes:
//! a text body followed by a blank line and one signature line per signer.
//! This crate provides the narrow surface the rest of woodpecker consumes:
//!
//! - [`Verifier`]: built from a verifier-key string (`name+hash+key`).
//! - [`Note::open`]: split a note and check its signatures against known keys.
//! - [`open_checkpoint`]: open a note as a checkpoint for a given origin,
//!   reporting which witness keys cosigned it.
//!
//! Signature arithmetic is delegated to `ed25519-dalek`. [`Signer`] exists so
//! fixtures and local logs can produce notes that [`Verifier`] accepts.

mod checkpoint;
mod error;
mod note;
mod verifier;

pub use checkpoint::{OpenedCheckpoint, marshal_body, open_checkpoint, parse_body};
pub use error::NoteError;
pub use note::{Note, sign_note};
pub use verifier::{KeyKind, Signer, Verifier};

#[cfg(test)]
mod tests;
