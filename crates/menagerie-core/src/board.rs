//! The board: every pet taking part in one resolution, plus both rosters.
//!
//! The board owns pets in a `BTreeMap` keyed by monotonically increasing
//! [`PetId`]s and keeps one ordered id list per [`Side`]. A pet leaves its
//! roster when it faints, is sold or evolves, but stays in storage so that
//! events already in flight can still read its stats.
//!
//! # Architecture
//!
//! Pets never point at their team. A pet's side is stored next to it in
//! [`BoardPet`], and every roster operation goes through the board.
//!
//! # Example
//!
//! ```
//! use menagerie_core::board::{Board, Placement, Side};
//! use menagerie_core::definition::{PetKindDefinition, PetKindId};
//! use menagerie_core::pet::Pet;
//!
//! let kind = PetKindDefinition {
//!     id: PetKindId::new("pet-ant"),
//!     name: "Ant".to_string(),
//!     tier: 1,
//!     base_attack: 2,
//!     base_health: 1,
//!     packs: Vec::new(),
//!     level1_ability: None,
//!     level2_ability: None,
//!     level3_ability: None,
//! };
//!
//! let mut board = Board::new();
//! let back = board.spawn(Side::A, Pet::new(&kind), Placement::Front).unwrap();
//! let front = board.spawn(Side::A, Pet::new(&kind), Placement::Front).unwrap();
//!
//! assert_eq!(board.roster(Side::A), &[back, front]);
//! assert_eq!(board.front(Side::A), Some(front));
//!
//! board.remove(front);
//! assert!(!board.is_alive(front));
//! assert!(board.pet(front).is_some());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pet::Pet;
use crate::team::{Team, TEAM_SIZE};

// =============================================================================
// Identifiers
// =============================================================================

/// Identity of a pet on a board.
///
/// Ids are assigned in spawn order and never reused within a board.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PetId(u64);

impl PetId {
    /// Creates a `PetId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PetId({})", self.0)
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PetId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// One of the two rosters on a board.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The first team passed to a battle; the player's team in a purchase phase.
    A,
    /// The second team passed to a battle.
    B,
}

impl Side {
    /// Both sides, in resolution order.
    pub const ALL: [Side; 2] = [Side::A, Side::B];

    /// Returns the other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Returns 0 for `A` and 1 for `B`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// Where a new pet enters a roster.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The tail of the roster, which attacks next.
    Front,
    /// Index 0, the back of the line.
    Back,
    /// A specific index, clamped to the roster length.
    At(usize),
}

// =============================================================================
// Board
// =============================================================================

/// A pet together with the side it fights on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPet {
    id: PetId,
    side: Side,
    pet: Pet,
}

impl BoardPet {
    /// Returns the pet's board id.
    #[must_use]
    pub const fn id(&self) -> PetId {
        self.id
    }

    /// Returns the side the pet fights on.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Returns the pet.
    #[must_use]
    pub fn pet(&self) -> &Pet {
        &self.pet
    }
}

/// Arena of pets with one ordered roster per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Monotonically increasing id counter.
    next_id: u64,
    /// Every pet that has been on the board, live or not.
    pets: BTreeMap<PetId, BoardPet>,
    /// Live pet ids per side, back to front.
    rosters: [Vec<PetId>; 2],
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a battle board from copies of two teams.
    #[must_use]
    pub fn from_teams(team_a: &Team, team_b: &Team) -> Self {
        let mut board = Self::new();
        for (side, team) in [(Side::A, team_a), (Side::B, team_b)] {
            for pet in team.pets() {
                board.spawn(side, pet.battle_copy(), Placement::Front);
            }
        }
        board
    }

    /// Creates a board holding a team on side `A` with an empty side `B`.
    ///
    /// Pets keep their buff records, since the board stands in for the
    /// persistent roster.
    #[must_use]
    pub fn from_team(team: &Team) -> Self {
        let mut board = Self::new();
        for pet in team.pets() {
            board.spawn(Side::A, pet.clone(), Placement::Front);
        }
        board
    }

    /// Adds a pet to a roster.
    ///
    /// Returns `None` and drops the pet if the roster already holds
    /// [`TEAM_SIZE`] live pets.
    pub fn spawn(&mut self, side: Side, pet: Pet, placement: Placement) -> Option<PetId> {
        if !self.can_add(side) {
            return None;
        }
        let id = self.insert(side, pet);
        let roster = &mut self.rosters[side.index()];
        match placement {
            Placement::Front => roster.push(id),
            Placement::Back => roster.insert(0, id),
            Placement::At(index) => roster.insert(index.min(roster.len()), id),
        }
        Some(id)
    }

    /// Puts `pet` in the roster slot of `id` and takes `id` off the roster.
    ///
    /// Returns the new pet's id, or `None` if `id` is not on a roster.
    pub fn replace(&mut self, id: PetId, pet: Pet) -> Option<PetId> {
        let side = self.side_of(id)?;
        let index = self.position(id)?;
        let new_id = self.insert(side, pet);
        self.rosters[side.index()][index] = new_id;
        Some(new_id)
    }

    /// Takes a pet off its roster. Returns false if it was not on one.
    pub fn remove(&mut self, id: PetId) -> bool {
        let Some(side) = self.side_of(id) else {
            return false;
        };
        let roster = &mut self.rosters[side.index()];
        match roster.iter().position(|p| *p == id) {
            Some(index) => {
                roster.remove(index);
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, side: Side, pet: Pet) -> PetId {
        let id = PetId::new(self.next_id);
        self.next_id += 1;
        self.pets.insert(id, BoardPet { id, side, pet });
        id
    }

    /// Returns true if another live pet fits on the side's roster.
    #[must_use]
    pub fn can_add(&self, side: Side) -> bool {
        self.live_pets(side).filter(|pet| pet.is_alive()).count() < TEAM_SIZE
    }

    /// Returns a pet and its side by id.
    #[must_use]
    pub fn get(&self, id: PetId) -> Option<&BoardPet> {
        self.pets.get(&id)
    }

    /// Returns a pet by id, live or not.
    #[must_use]
    pub fn pet(&self, id: PetId) -> Option<&Pet> {
        self.pets.get(&id).map(|entry| &entry.pet)
    }

    /// Returns a pet mutably by id, live or not.
    #[must_use]
    pub fn pet_mut(&mut self, id: PetId) -> Option<&mut Pet> {
        self.pets.get_mut(&id).map(|entry| &mut entry.pet)
    }

    /// Returns the side a pet belongs to.
    #[must_use]
    pub fn side_of(&self, id: PetId) -> Option<Side> {
        self.pets.get(&id).map(|entry| entry.side)
    }

    /// Returns the live pet ids of a side, back to front.
    #[must_use]
    pub fn roster(&self, side: Side) -> &[PetId] {
        &self.rosters[side.index()]
    }

    /// Returns the pet at the front of a side's line.
    #[must_use]
    pub fn front(&self, side: Side) -> Option<PetId> {
        self.roster(side).last().copied()
    }

    /// Returns a pet's roster index, if it is on its roster.
    #[must_use]
    pub fn position(&self, id: PetId) -> Option<usize> {
        let side = self.side_of(id)?;
        self.roster(side).iter().position(|p| *p == id)
    }

    /// Returns true if the pet is on its roster.
    #[must_use]
    pub fn is_alive(&self, id: PetId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the live pets of a side, back to front.
    pub fn live_pets(&self, side: Side) -> impl Iterator<Item = &Pet> + '_ {
        self.roster(side).iter().filter_map(|id| self.pet(*id))
    }

    /// Returns copies of a side's live pets, back to front.
    #[must_use]
    pub fn roster_pets(&self, side: Side) -> Vec<Pet> {
        self.live_pets(side).cloned().collect()
    }

    /// Returns the number of pets ever placed on the board.
    #[must_use]
    pub fn pet_count(&self) -> usize {
        self.pets.len()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in Side::ALL {
            if side == Side::B {
                f.write_str(" | ")?;
            }
            write!(f, "{side} [")?;
            for (i, pet) in self.live_pets(side).enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{pet}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{PetKindDefinition, PetKindId};

    fn pet(id: &str) -> Pet {
        let kind = PetKindDefinition {
            id: PetKindId::new(id),
            name: id.to_string(),
            tier: 1,
            base_attack: 1,
            base_health: 1,
            packs: Vec::new(),
            level1_ability: None,
            level2_ability: None,
            level3_ability: None,
        };
        Pet::new(&kind)
    }

    mod id_tests {
        use super::*;

        #[test]
        fn ids_are_monotonic_and_never_reused() {
            let mut board = Board::new();
            let first = board.spawn(Side::A, pet("pet-a"), Placement::Front).unwrap();
            board.remove(first);
            let second = board.spawn(Side::A, pet("pet-b"), Placement::Front).unwrap();
            assert!(second > first);
            assert_eq!(board.pet_count(), 2);
        }

        #[test]
        fn sides_are_opposed() {
            assert_eq!(Side::A.opponent(), Side::B);
            assert_eq!(Side::B.opponent(), Side::A);
            assert_eq!(Side::B.index(), 1);
        }
    }

    mod roster_tests {
        use super::*;

        #[test]
        fn placement_controls_roster_index() {
            let mut board = Board::new();
            let a = board.spawn(Side::A, pet("pet-a"), Placement::Front).unwrap();
            let b = board.spawn(Side::A, pet("pet-b"), Placement::Back).unwrap();
            let c = board.spawn(Side::A, pet("pet-c"), Placement::At(1)).unwrap();
            assert_eq!(board.roster(Side::A), &[b, c, a]);
            assert_eq!(board.front(Side::A), Some(a));
        }

        #[test]
        fn full_roster_rejects_spawns() {
            let mut board = Board::new();
            for _ in 0..TEAM_SIZE {
                assert!(board.spawn(Side::B, pet("pet-a"), Placement::Front).is_some());
            }
            assert!(board.spawn(Side::B, pet("pet-a"), Placement::Front).is_none());
            assert!(board.spawn(Side::A, pet("pet-a"), Placement::Front).is_some());
        }

        #[test]
        fn replace_keeps_roster_index() {
            let mut board = Board::new();
            let a = board.spawn(Side::A, pet("pet-caterpillar"), Placement::Front).unwrap();
            let b = board.spawn(Side::A, pet("pet-b"), Placement::Front).unwrap();

            let butterfly = board.replace(a, pet("pet-butterfly")).unwrap();
            assert_eq!(board.roster(Side::A), &[butterfly, b]);
            assert!(!board.is_alive(a));
            assert_eq!(board.side_of(butterfly), Some(Side::A));
        }

        #[test]
        fn removal_is_reported_once() {
            let mut board = Board::new();
            let a = board.spawn(Side::A, pet("pet-a"), Placement::Front).unwrap();
            assert!(board.remove(a));
            assert!(!board.remove(a));
            assert_eq!(board.position(a), None);
        }
    }

    mod team_tests {
        use super::*;

        #[test]
        fn battle_board_copies_both_teams_in_order() {
            let mut original = pet("pet-a");
            original.buff(1, 1, true);
            let team_a = Team::with_pets([original, pet("pet-b")]);
            let team_b = Team::with_pets([pet("pet-c")]);

            let board = Board::from_teams(&team_a, &team_b);
            let kinds: Vec<_> = board
                .live_pets(Side::A)
                .map(|p| p.kind().as_str().to_string())
                .collect();
            assert_eq!(kinds, ["pet-a", "pet-b"]);
            assert_eq!(board.roster(Side::B).len(), 1);
            assert!(board.live_pets(Side::A).all(|p| p.active_buffs().is_empty()));
            assert_eq!(board.to_string(), "A [pet-a L1 2/2, pet-b L1 1/1] | B [pet-c L1 1/1]");
        }

        #[test]
        fn serde_round_trip_keeps_rosters() {
            let board = Board::from_teams(
                &Team::with_pets([pet("pet-a")]),
                &Team::with_pets([pet("pet-b"), pet("pet-c")]),
            );
            let json = serde_json::to_string(&board).unwrap();
            let restored: Board = serde_json::from_str(&json).unwrap();
            assert_eq!(restored, board);
        }
    }
}
