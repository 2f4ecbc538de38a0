//! Error types for the battle core.
//!
//! Everything the engine can fail on is either inconsistent definition data
//! (an id that is referenced but never defined) or a runaway resolution tree
//! caught by one of the guards in [`EngineConfig`](crate::config::EngineConfig).
//! Degenerate situations such as an empty target pool or a full roster are
//! not errors and never surface here.

use thiserror::Error;

use crate::definition::{FoodId, PetKindId, StatusId, Trigger};

/// Errors raised while loading definitions or resolving a battle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A pet kind id was referenced but is not defined.
    #[error("unknown pet kind `{0}`")]
    UnknownPetKind(PetKindId),

    /// A status id was referenced but is not defined.
    #[error("unknown status `{0}`")]
    UnknownStatus(StatusId),

    /// A food id was referenced but is not defined.
    #[error("unknown food `{0}`")]
    UnknownFood(FoodId),

    /// A random summon asked for a tier with no pet kinds in it.
    #[error("no pet kinds available in tier {0}")]
    EmptyTier(u8),

    /// A roster index given by a caller is out of range.
    #[error("roster index {index} out of range for {len} pets")]
    RosterIndex {
        /// The requested index.
        index: usize,
        /// Number of pets in the roster.
        len: usize,
    },

    /// Event dispatch nested deeper than the configured limit.
    #[error("dispatch of `{trigger}` exceeded the nesting limit of {limit}")]
    DispatchDepthExceeded {
        /// The event that would have crossed the limit.
        trigger: Trigger,
        /// The configured limit.
        limit: usize,
    },

    /// More events were dispatched than the configured budget allows.
    #[error("resolution exceeded the budget of {limit} dispatched events")]
    EventBudgetExceeded {
        /// The configured budget.
        limit: usize,
    },

    /// Definition data could not be parsed.
    #[error("invalid definition data: {0}")]
    InvalidDefinitions(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDefinitions(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type EngineResult<T> = Result<T, EngineError>;
