//! State synchronization and quorum verification for woodpecker.
//!
//! The [`Controller`] is the only writer of the [`ViewModel`]. It fetches a
//! log's own checkpoint and, concurrently, a witness-cosigned checkpoint,
//! applies the witness quorum policy, and publishes both in one update. Leaf
//! navigation is bounds-checked against the last published checkpoint.
//!
//! Display layers read the [`ViewModel`], wait on its [`DirtySignal`], and
//! drive the controller through a [`ControllerHandle`] obtained from
//! [`service::spawn`], which owns the controller on one task together with
//! the periodic refresh timer.

pub mod controller;
pub mod error;
pub mod quorum;
pub mod service;
pub mod signal;
pub mod view;

pub use controller::Controller;
pub use error::{ControllerError, SharedError};
pub use quorum::{MIN_WITNESSES, WitnessThreshold, verify_quorum};
pub use service::{ControllerHandle, ControllerService, ServiceConfig};
pub use signal::DirtySignal;
pub use view::{ViewModel, ViewState};

#[cfg(test)]
mod tests;
