//! Crate-level tests for whole battles and purchase phases.
//!
//! - **Determinism tests**: the same seed replays the same battle
//! - **Integration tests**: abilities, statuses and guards end to end
//! - **Property tests**: termination and roster invariants over random teams
//! - **Helper functions**: catalog, team and engine builders shared with the
//!   unit tests
//!
//! # Test Structure
//!
//! - `determinism.rs`: Tests that verify reproducible resolution
//! - `integration.rs`: End-to-end battles and shop turns
//! - `properties.rs`: `proptest` invariants
//! - `helpers.rs`: Test setup utilities and factory functions

mod helpers;
mod integration;

pub use helpers::*;
