//! Shared helpers for dispatch integration tests.

pub mod recorders;

pub use recorders::*;
