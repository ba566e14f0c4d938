//! Witness keys and sources of witness-cosigned checkpoints.
//!
//! - [`WitnessKeys`]: the configured set of witness verifiers.
//! - [`WitnessQuorumSource`]: anything that can hand out a checkpoint
//!   cosigned by at least N witnesses.
//! - [`DistributorClient`]: the HTTP distributor implementation.

mod distributor;
mod error;
mod keys;
mod source;

pub use distributor::DistributorClient;
pub use error::WitnessError;
pub use keys::WitnessKeys;
pub use source::WitnessQuorumSource;
