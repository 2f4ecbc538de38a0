//! Engine configuration.
//!
//! [`EngineConfig`] carries the seed and the guards that bound a single
//! resolution. Every battle and purchase phase takes one by reference.

use serde::{Deserialize, Serialize};

/// Default limit on nested dispatch calls.
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 64;

/// Default budget of dispatched events per battle or purchase phase.
pub const DEFAULT_MAX_EVENTS: usize = 50_000;

/// Default number of attack cycles before a battle is called a stalemate.
pub const DEFAULT_MAX_ROUNDS: u32 = 200;

/// Configuration for a battle or a purchase-phase resolution.
///
/// # Example
///
/// ```
/// use menagerie_core::config::EngineConfig;
///
/// let config = EngineConfig::default().with_seed(7).with_event_log();
/// assert_eq!(config.seed, 7);
/// assert!(config.record_events);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the battle's random source.
    pub seed: u64,
    /// Maximum nesting of dispatch calls before resolution is aborted.
    pub max_dispatch_depth: usize,
    /// Maximum number of dispatched events before resolution is aborted.
    pub max_events: usize,
    /// Attack cycles after which a still-running battle ends in a draw.
    pub max_rounds: u32,
    /// Whether dispatched events are recorded in the event log.
    pub record_events: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
            max_events: DEFAULT_MAX_EVENTS,
            max_rounds: DEFAULT_MAX_ROUNDS,
            record_events: false,
        }
    }
}

impl EngineConfig {
    /// Returns a copy with the given seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns a copy with the given dispatch nesting limit.
    #[must_use]
    pub fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }

    /// Returns a copy with the given event budget.
    #[must_use]
    pub fn with_max_events(mut self, events: usize) -> Self {
        self.max_events = events;
        self
    }

    /// Returns a copy with the given round limit.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Returns a copy that records every dispatched event.
    #[must_use]
    pub fn with_event_log(mut self) -> Self {
        self.record_events = true;
        self
    }
}
