//! Persistent rosters.
//!
//! A [`Team`] is the roster a player keeps between battles. Index 0 is the
//! back of the line; the last pet is the front and attacks first. Battles
//! never mutate a `Team` directly: they fight with copies on a
//! [`Board`](crate::board::Board) and only run the end-of-battle cleanup on
//! the original.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pet::{Pet, StatBuff};

/// Maximum number of live pets on a roster.
pub const TEAM_SIZE: usize = 5;

/// An ordered roster of up to [`TEAM_SIZE`] live pets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pets: Vec<Pet>,
    #[serde(default)]
    shop_buffs: Vec<StatBuff>,
}

impl Team {
    /// Creates an empty team.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a team from pets ordered back to front.
    ///
    /// Pets beyond the size limit are dropped.
    #[must_use]
    pub fn with_pets(pets: impl IntoIterator<Item = Pet>) -> Self {
        let mut team = Self::new();
        for pet in pets {
            team.add_pet(pet, None);
        }
        team
    }

    /// Returns the pets, back to front.
    #[must_use]
    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    /// Returns the pets mutably.
    pub fn pets_mut(&mut self) -> &mut [Pet] {
        &mut self.pets
    }

    /// Returns the number of pets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pets.len()
    }

    /// Returns true if the team has no pets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pets.is_empty()
    }

    /// Returns true if another live pet fits.
    #[must_use]
    pub fn can_add_pet(&self) -> bool {
        self.pets.iter().filter(|pet| pet.is_alive()).count() < TEAM_SIZE
    }

    /// Inserts a pet at `index`, or at the front of the line when `None`.
    ///
    /// Returns false and drops the pet if the team is full. Indices past the
    /// end insert at the front of the line.
    pub fn add_pet(&mut self, pet: Pet, index: Option<usize>) -> bool {
        if !self.can_add_pet() {
            return false;
        }
        let index = index.map_or(self.pets.len(), |i| i.min(self.pets.len()));
        self.pets.insert(index, pet);
        true
    }

    /// Removes and returns the pet at `index`, keeping the others in order.
    pub fn remove_pet(&mut self, index: usize) -> Option<Pet> {
        (index < self.pets.len()).then(|| self.pets.remove(index))
    }

    /// Replaces every pet, keeping shop buffs.
    pub(crate) fn replace_pets(&mut self, pets: Vec<Pet>) {
        self.pets = pets;
    }

    /// Records a buff that applies to pets the shop stocks later.
    pub fn add_shop_buff(&mut self, buff: StatBuff) {
        self.shop_buffs.push(buff);
    }

    /// Returns the pending shop buffs.
    #[must_use]
    pub fn shop_buffs(&self) -> &[StatBuff] {
        &self.shop_buffs
    }

    /// Runs end-of-battle cleanup on every pet.
    pub fn end_of_battle(&mut self) {
        for pet in &mut self.pets {
            pet.end_of_battle();
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, pet) in self.pets.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{pet}")?;
        }
        f.write_str("]")
    }
}
