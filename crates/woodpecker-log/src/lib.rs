//! Log clients and the registry that maps origins to them.
//!
//! A [`LogClient`] bundles everything needed to read one log: its
//! [`LogIdentity`] (origin and verifier), a [`ByteFetcher`] rooted at the log,
//! and the [`LogKind`] that decides where checkpoints and leaves live.
//!
//! [`LogRegistry`] is built once at startup from static [`LogSource`]
//! descriptions. A malformed key or unsupported location is fatal there,
//! never later.
//!
//! [`ByteFetcher`]: woodpecker_fetch::ByteFetcher

mod client;
mod error;
mod identity;
pub mod layout;
mod registry;

pub use client::{LogClient, LogKind};
pub use error::LogError;
pub use identity::LogIdentity;
pub use registry::{LogRegistry, LogSource};
