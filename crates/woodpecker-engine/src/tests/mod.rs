//! Tests for the woodpecker-engine crate.

mod helpers;

mod service;
