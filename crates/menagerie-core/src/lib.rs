//! # Menagerie Core
//!
//! Deterministic battle core for a pet auto-battler.
//!
//! Two teams of up to five pets line up and trade blows front to front until
//! one side is empty. Pets carry abilities that fire on battle and shop
//! events; abilities perform effects, and effects raise further events. This
//! crate resolves all of that, reproducibly, from a seed.
//!
//! ## Architecture
//!
//! - **Definitions** ([`definition`]): pet kinds, statuses and foods, loaded
//!   from JSON and indexed by trigger
//! - **Board** ([`board`]): the per-resolution arena of pets with one ordered
//!   roster per side
//! - **Dispatcher**: walks a roster snapshot and fires every ability whose
//!   trigger and predicate match
//! - **Effects**: one interpreter over the closed [`definition::Effect`] sum
//!   type, with targets picked by [`targeting`]
//! - **Battle** ([`battle`]): the start / attack / queue / cleanup state
//!   machine
//! - **Purchase phase** ([`shop`]): shop-turn events through the same
//!   dispatcher
//!
//! ## Usage
//!
//! ```rust
//! use menagerie_core::{run_battle, BattleOutcome, Definitions, EngineConfig, Team};
//!
//! let defs = Definitions::new([], [], []);
//! let mut a = Team::new();
//! let mut b = Team::new();
//! let outcome = run_battle(&defs, &mut a, &mut b, &EngineConfig::default()).unwrap();
//! assert_eq!(outcome, BattleOutcome::Draw);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod battle;
pub mod board;
pub mod config;
pub mod context;
pub mod definition;
pub mod error;
pub mod event_log;
pub mod pet;
pub mod shop;
pub mod targeting;
pub mod team;
pub mod tournament;

mod dispatch;
mod effect;

pub use battle::{run_battle, Battle, BattleOutcome, BattleReport};
pub use config::EngineConfig;
pub use definition::Definitions;
pub use error::{EngineError, EngineResult};
pub use pet::Pet;
pub use team::Team;

#[cfg(test)]
mod tests;
