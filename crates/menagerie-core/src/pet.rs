//! Pet instances and their invariant-preserving operations.
//!
//! A [`Pet`] is one creature on a roster. It refers to its kind by id and
//! never to its team; the side it fights on is tracked by the
//! [`Board`](crate::board::Board) that holds it.
//!
//! Stats are always written attack first, matching the `attack/health`
//! notation used in logs.
//!
//! # Example
//!
//! ```
//! use menagerie_core::definition::{PetKindDefinition, PetKindId};
//! use menagerie_core::pet::Pet;
//!
//! let kind = PetKindDefinition {
//!     id: PetKindId::new("pet-fish"),
//!     name: "Fish".to_string(),
//!     tier: 1,
//!     base_attack: 2,
//!     base_health: 2,
//!     packs: Vec::new(),
//!     level1_ability: None,
//!     level2_ability: None,
//!     level3_ability: None,
//! };
//!
//! let mut fish = Pet::new(&kind);
//! assert_eq!(fish.add_experience(2), 2);
//! assert_eq!(fish.level(), 2);
//! assert_eq!((fish.attack(), fish.health()), (4, 4));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::{PetKindDefinition, PetKindId, StatusId};

/// Upper bound for a pet's health.
pub const MAX_HEALTH: i32 = 50;

/// Upper bound for a pet's attack.
pub const MAX_ATTACK: i32 = 50;

/// Highest level a pet can reach.
pub const MAX_LEVEL: u8 = 3;

/// Experience needed for each level.
pub const LEVEL_THRESHOLDS: [(u8, u32); 3] = [(1, 0), (2, 2), (3, 5)];

/// Returns the level reached with the given experience.
#[must_use]
pub fn level_for_experience(experience: u32) -> u8 {
    LEVEL_THRESHOLDS
        .iter()
        .rev()
        .find(|(_, threshold)| experience >= *threshold)
        .map_or(1, |(level, _)| *level)
}

/// A stat delta that is reverted when the next battle ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBuff {
    /// Attack delta actually applied.
    pub attack: i32,
    /// Health delta actually applied.
    pub health: i32,
}

/// An ability borrowed from another kind until the next battle ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowedAbility {
    /// Kind whose ability is used.
    pub kind: PetKindId,
    /// Level at which it is used.
    pub level: u8,
}

/// A creature instance with mutable combat stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    kind: PetKindId,
    tier: u8,
    attack: i32,
    health: i32,
    level: u8,
    experience: u32,
    status: Option<StatusId>,
    #[serde(default)]
    borrowed_ability: Option<BorrowedAbility>,
    #[serde(default)]
    active_buffs: Vec<StatBuff>,
    #[serde(default)]
    transient_state: BTreeMap<String, i64>,
}

impl Pet {
    /// Creates a level 1 pet with the kind's base stats.
    #[must_use]
    pub fn new(kind: &PetKindDefinition) -> Self {
        Self {
            kind: kind.id.clone(),
            tier: kind.tier,
            attack: kind.base_attack.clamp(0, MAX_ATTACK),
            health: kind.base_health.clamp(0, MAX_HEALTH),
            level: 1,
            experience: 0,
            status: None,
            borrowed_ability: None,
            active_buffs: Vec::new(),
            transient_state: BTreeMap::new(),
        }
    }

    /// Returns the pet with the given stats.
    #[must_use]
    pub fn with_stats(mut self, attack: i32, health: i32) -> Self {
        self.set_attack(attack);
        self.set_health(health);
        self
    }

    /// Returns the pet at the given level, with the matching minimum experience.
    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        self.level = level;
        self.experience = LEVEL_THRESHOLDS
            .iter()
            .find(|(l, _)| *l == level)
            .map_or(0, |(_, threshold)| *threshold);
        self
    }

    /// Returns the pet carrying the given status.
    #[must_use]
    pub fn with_status(mut self, status: StatusId) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the pet's kind id.
    #[must_use]
    pub fn kind(&self) -> &PetKindId {
        &self.kind
    }

    /// Returns the tier of the pet's kind.
    #[must_use]
    pub const fn tier(&self) -> u8 {
        self.tier
    }

    /// Returns the current attack.
    #[must_use]
    pub const fn attack(&self) -> i32 {
        self.attack
    }

    /// Returns the current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Returns the current level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Returns the accumulated experience.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }

    /// Returns the active status, if any.
    #[must_use]
    pub fn status(&self) -> Option<&StatusId> {
        self.status.as_ref()
    }

    /// Returns the buffs pending reversion.
    #[must_use]
    pub fn active_buffs(&self) -> &[StatBuff] {
        &self.active_buffs
    }

    /// Returns true while the pet has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Returns the kind whose ability this pet uses.
    #[must_use]
    pub fn ability_kind(&self) -> &PetKindId {
        self.borrowed_ability
            .as_ref()
            .map_or(&self.kind, |borrowed| &borrowed.kind)
    }

    /// Returns the level at which this pet's ability is used.
    #[must_use]
    pub fn ability_level(&self) -> u8 {
        self.borrowed_ability
            .as_ref()
            .map_or(self.level, |borrowed| borrowed.level)
    }

    /// Uses another kind's ability until the next battle ends.
    pub fn borrow_ability(&mut self, kind: PetKindId, level: u8) {
        self.borrowed_ability = Some(BorrowedAbility {
            kind,
            level: level.clamp(1, MAX_LEVEL),
        });
    }

    /// Sets attack, clamped to `[0, MAX_ATTACK]`.
    pub fn set_attack(&mut self, attack: i32) {
        self.attack = attack.clamp(0, MAX_ATTACK);
    }

    /// Sets health, clamped to `[0, MAX_HEALTH]`.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, MAX_HEALTH);
    }

    /// Removes up to `amount` health and returns how much was lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.set_health(before - amount.max(0));
        before - self.health
    }

    /// Adds to attack and health, clamping both.
    ///
    /// Returns the delta that was actually applied. When
    /// `until_end_of_battle` is set, that delta is recorded and reverted by
    /// [`Pet::end_of_battle`].
    pub fn buff(&mut self, attack: i32, health: i32, until_end_of_battle: bool) -> StatBuff {
        let (attack_before, health_before) = (self.attack, self.health);
        self.set_attack(attack_before + attack);
        self.set_health(health_before + health);
        let applied = StatBuff {
            attack: self.attack - attack_before,
            health: self.health - health_before,
        };
        if until_end_of_battle {
            self.active_buffs.push(applied);
        }
        applied
    }

    /// Replaces the active status.
    pub fn set_status(&mut self, status: Option<StatusId>) {
        self.status = status;
    }

    /// Grants one experience unit with its permanent +1/+1.
    ///
    /// Returns the new level if a threshold was crossed. The level itself is
    /// only changed by [`Pet::promote`], so callers can announce the level up
    /// first. Does nothing at the maximum level.
    pub fn gain_experience_point(&mut self) -> Option<u8> {
        if self.level >= MAX_LEVEL {
            return None;
        }
        self.experience += 1;
        self.buff(1, 1, false);
        let reached = level_for_experience(self.experience);
        (reached > self.level).then_some(reached)
    }

    /// Sets the level after a threshold was crossed.
    pub fn promote(&mut self, level: u8) {
        self.level = level.clamp(1, MAX_LEVEL);
    }

    /// Grants experience without announcing level ups.
    ///
    /// Stops as soon as the maximum level is reached and returns the number
    /// of units consumed.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        if self.level >= MAX_LEVEL {
            return 0;
        }
        for consumed in 1..=amount {
            if let Some(level) = self.gain_experience_point() {
                self.promote(level);
                if level >= MAX_LEVEL {
                    return consumed;
                }
            }
        }
        amount
    }

    /// Reads a scratch counter, zero if unset.
    #[must_use]
    pub fn transient(&self, key: &str) -> i64 {
        self.transient_state.get(key).copied().unwrap_or(0)
    }

    /// Increments a scratch counter and returns the new value.
    pub fn bump_transient(&mut self, key: &str) -> i64 {
        let value = self.transient_state.entry(key.to_string()).or_insert(0);
        *value += 1;
        *value
    }

    /// Reverts temporary buffs, clears scratch state and drops borrowed abilities.
    pub fn end_of_battle(&mut self) {
        for buff in std::mem::take(&mut self.active_buffs).into_iter().rev() {
            self.set_attack(self.attack - buff.attack);
            self.set_health(self.health - buff.health);
        }
        self.transient_state.clear();
        self.borrowed_ability = None;
    }

    /// Returns the copy that fights in a battle.
    ///
    /// Stats, status and borrowed ability carry over; buff records and
    /// scratch state start empty so the original keeps sole ownership of them.
    #[must_use]
    pub fn battle_copy(&self) -> Self {
        Self {
            active_buffs: Vec::new(),
            transient_state: BTreeMap::new(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Pet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} L{} {}/{}", self.kind, self.level, self.attack, self.health)
    }
}
