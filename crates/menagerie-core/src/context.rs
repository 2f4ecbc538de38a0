//! Event contexts.
//!
//! An [`EventContext`] describes one dispatched event: which trigger, which
//! side is notified, which pet caused it and, for events raised while a hit
//! resolves, the roster order captured before any pet was removed.

use crate::board::{PetId, Side};
use crate::definition::{FoodId, Trigger};

/// The resolution an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// A battle between two boards.
    Battle,
    /// The shop phase on a single team.
    Purchase {
        /// The pet a food was bought for.
        purchase_target: Option<PetId>,
        /// The food being eaten.
        food: Option<FoodId>,
    },
}

/// Everything an ability needs to know about the event it reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// The event.
    pub trigger: Trigger,
    /// The pet that caused it, if any.
    pub source: Option<PetId>,
    /// The notified side.
    pub side: Side,
    /// Roster order of `side` captured when the event was raised.
    pub snapshot: Option<Vec<PetId>>,
    /// Battle or purchase phase.
    pub phase: Phase,
    /// Set when an ability is being performed again.
    pub repeated: bool,
    /// The event whose ability is being announced, for `CastsAbility`.
    pub cause: Option<Box<EventContext>>,
}

impl EventContext {
    /// Creates a battle event for one side.
    #[must_use]
    pub fn battle(trigger: Trigger, side: Side) -> Self {
        Self {
            trigger,
            source: None,
            side,
            snapshot: None,
            phase: Phase::Battle,
            repeated: false,
            cause: None,
        }
    }

    /// Creates a purchase-phase event for the player's side.
    #[must_use]
    pub fn purchase(trigger: Trigger) -> Self {
        Self {
            phase: Phase::Purchase {
                purchase_target: None,
                food: None,
            },
            ..Self::battle(trigger, Side::A)
        }
    }

    /// Returns the context with a source pet.
    #[must_use]
    pub fn with_source(mut self, source: PetId) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns the context with a roster snapshot.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: Vec<PetId>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Returns a purchase context naming the fed pet and the food.
    #[must_use]
    pub fn with_purchase(mut self, target: PetId, food: FoodId) -> Self {
        self.phase = Phase::Purchase {
            purchase_target: Some(target),
            food: Some(food),
        };
        self
    }

    /// Creates an event raised while this one resolves, in the same phase.
    ///
    /// The follow-up notifies `side` with `source` as its cause and reads the
    /// live roster.
    #[must_use]
    pub fn follow_up(&self, trigger: Trigger, side: Side, source: PetId) -> Self {
        Self {
            trigger,
            source: Some(source),
            side,
            snapshot: None,
            phase: self.phase.clone(),
            repeated: false,
            cause: None,
        }
    }

    /// Returns true during a battle.
    #[must_use]
    pub fn is_battle(&self) -> bool {
        self.phase == Phase::Battle
    }

    /// Returns the pet a food was bought for.
    #[must_use]
    pub fn purchase_target(&self) -> Option<PetId> {
        match &self.phase {
            Phase::Purchase {
                purchase_target, ..
            } => *purchase_target,
            Phase::Battle => None,
        }
    }
}
