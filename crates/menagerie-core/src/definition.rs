//! Immutable ability, pet kind, status and food definitions.
//!
//! Definitions are shared, read-only data. A running battle refers to them by
//! id ([`PetKindId`], [`StatusId`], [`FoodId`]) and looks them up through
//! [`Definitions`], which also owns the [`TriggerIndex`] used by the
//! dispatcher to skip pets that cannot react to an event.
//!
//! # Data shape
//!
//! The JSON accepted by [`Definitions::from_json`] uses camelCase keys and
//! `kind`-tagged objects for selectors, predicates and effects:
//!
//! ```
//! use menagerie_core::definition::{Definitions, PetKindId, Trigger};
//!
//! let json = r#"{
//!     "pets": {
//!         "pet-ant": {
//!             "id": "pet-ant", "name": "Ant", "tier": 1,
//!             "baseAttack": 2, "baseHealth": 1,
//!             "level1Ability": {
//!                 "trigger": "Faint",
//!                 "triggeredBy": { "kind": "Self" },
//!                 "effect": {
//!                     "kind": "ModifyStats",
//!                     "attackAmount": 2, "healthAmount": 1,
//!                     "target": { "kind": "RandomFriend", "n": 1 }
//!                 }
//!             }
//!         }
//!     }
//! }"#;
//!
//! let defs = Definitions::from_json(json).unwrap();
//! let ant = defs.pet_kind(&PetKindId::new("pet-ant")).unwrap();
//! assert_eq!(ant.base_attack, 2);
//! assert!(defs.trigger_index().pets_for(Trigger::Faint).any(|id| id == &ant.id));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::pet::Pet;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! definition_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from a string.
            #[must_use]
            pub fn new(id: &str) -> Self {
                Self(id.to_string())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

definition_id!(
    /// Identifier of a pet kind, e.g. `pet-ant`.
    PetKindId
);
definition_id!(
    /// Identifier of a status, e.g. `status-melon-armor`.
    StatusId
);
definition_id!(
    /// Identifier of a food, e.g. `food-apple`.
    FoodId
);

// =============================================================================
// Triggers and predicates
// =============================================================================

/// A named occurrence broadcast to eligible pets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Once per side when a battle starts.
    StartOfBattle,
    /// Before a primary attack lands.
    BeforeAttack,
    /// After a primary attack resolved.
    AfterAttack,
    /// A pet lost health and survived.
    Hurt,
    /// A pet reached zero health.
    Faint,
    /// A pet's attack made an enemy faint.
    Knockout,
    /// A pet joined a roster mid-resolution.
    Summoned,
    /// A pet's own ability finished in battle.
    CastsAbility,
    /// A pet crossed an experience threshold.
    LevelUp,
    /// Consulted on the attacker's status while computing damage.
    WhenAttacking,
    /// Consulted on the target's status while computing damage.
    WhenDamaged,
    /// A pet was bought.
    Buy,
    /// A food was bought.
    BuyFood,
    /// A tier 1 pet was bought.
    BuyTier1Animal,
    /// A pet was bought after losing the previous battle.
    BuyAfterLoss,
    /// A pet was sold.
    Sell,
    /// The purchase phase started.
    StartOfTurn,
    /// The purchase phase ended.
    EndOfTurn,
    /// The purchase phase ended with at least 3 gold left.
    EndOfTurnWith3PlusGold,
    /// The purchase phase ended with at least 2 gold left.
    EndOfTurnWith2PlusGold,
    /// The purchase phase ended with at most 4 pets.
    EndOfTurnWith4OrLessAnimals,
    /// The purchase phase ended with a level 3 pet on the team.
    EndOfTurnWithLvl3Friend,
    /// A pet ate a food bought from the shop.
    EatsShopFood,
}

impl Trigger {
    /// Every trigger, in declaration order.
    pub const ALL: [Trigger; 23] = [
        Trigger::StartOfBattle,
        Trigger::BeforeAttack,
        Trigger::AfterAttack,
        Trigger::Hurt,
        Trigger::Faint,
        Trigger::Knockout,
        Trigger::Summoned,
        Trigger::CastsAbility,
        Trigger::LevelUp,
        Trigger::WhenAttacking,
        Trigger::WhenDamaged,
        Trigger::Buy,
        Trigger::BuyFood,
        Trigger::BuyTier1Animal,
        Trigger::BuyAfterLoss,
        Trigger::Sell,
        Trigger::StartOfTurn,
        Trigger::EndOfTurn,
        Trigger::EndOfTurnWith3PlusGold,
        Trigger::EndOfTurnWith2PlusGold,
        Trigger::EndOfTurnWith4OrLessAnimals,
        Trigger::EndOfTurnWithLvl3Friend,
        Trigger::EatsShopFood,
    ];

    /// Returns the trigger's name as it appears in definition data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartOfBattle => "StartOfBattle",
            Self::BeforeAttack => "BeforeAttack",
            Self::AfterAttack => "AfterAttack",
            Self::Hurt => "Hurt",
            Self::Faint => "Faint",
            Self::Knockout => "Knockout",
            Self::Summoned => "Summoned",
            Self::CastsAbility => "CastsAbility",
            Self::LevelUp => "LevelUp",
            Self::WhenAttacking => "WhenAttacking",
            Self::WhenDamaged => "WhenDamaged",
            Self::Buy => "Buy",
            Self::BuyFood => "BuyFood",
            Self::BuyTier1Animal => "BuyTier1Animal",
            Self::BuyAfterLoss => "BuyAfterLoss",
            Self::Sell => "Sell",
            Self::StartOfTurn => "StartOfTurn",
            Self::EndOfTurn => "EndOfTurn",
            Self::EndOfTurnWith3PlusGold => "EndOfTurnWith3PlusGold",
            Self::EndOfTurnWith2PlusGold => "EndOfTurnWith2PlusGold",
            Self::EndOfTurnWith4OrLessAnimals => "EndOfTurnWith4OrLessAnimals",
            Self::EndOfTurnWithLvl3Friend => "EndOfTurnWithLvl3Friend",
            Self::EatsShopFood => "EatsShopFood",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pet, relative to the event's source, may react to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TriggeredBy {
    /// Only the source itself.
    #[serde(rename = "Self")]
    SelfPet,
    /// Any teammate other than the source.
    EachFriend,
    /// The pet directly behind the source, i.e. the source is its friend ahead.
    FriendAhead,
    /// Any pet, unconditionally.
    Player,
}

// =============================================================================
// Target selectors
// =============================================================================

/// A declarative rule choosing which pets an effect applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum TargetSelector {
    /// The acting pet.
    #[serde(rename = "Self")]
    SelfPet,
    /// The pet that caused the event.
    TriggeringEntity,
    /// The pet a food was bought for.
    PurchaseTarget,
    /// `n` random friends, never the actor.
    RandomFriend {
        /// How many to pick.
        n: usize,
    },
    /// `n` random enemies.
    RandomEnemy {
        /// How many to pick.
        n: usize,
    },
    /// Every friend except the actor.
    EachFriend,
    /// Every enemy.
    EachEnemy,
    /// Every friend except the actor, then every enemy.
    All,
    /// Friends of level 2 or higher.
    Level2And3Friends,
    /// One friend per distinct tier, in roster order.
    DifferentTierAnimals,
    /// The friends directly behind and ahead of the actor.
    AdjacentFriends,
    /// The friend at the back of the line.
    LeftMostFriend,
    /// The friend at the front of the line.
    RightMostFriend,
    /// The enemy at the front of the line.
    FirstEnemy,
    /// The enemy at the back of the line.
    LastEnemy,
    /// The enemy with the least health.
    LowestHealthEnemy,
    /// The enemy with the most health.
    HighestHealthEnemy,
    /// Up to `n` friends behind the actor, nearest first.
    FriendBehind {
        /// How many to take.
        n: usize,
    },
    /// Up to `n` friends ahead of the actor, nearest first.
    FriendAhead {
        /// How many to take.
        n: usize,
    },
    /// The enemy at the front of the line and the friend directly behind the actor.
    AdjacentAnimals,
    /// The friend with the greatest attack plus health.
    StrongestFriend,
    /// The pets in the shop; handled by the shop collaborator.
    EachShopAnimal {
        /// Whether pets stocked later are buffed too.
        #[serde(default)]
        including_future: bool,
    },
}

// =============================================================================
// Effects
// =============================================================================

/// Which roster a summon lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SummonTeam {
    /// The summoner's roster.
    #[default]
    Friendly,
    /// The opposing roster.
    Enemy,
}

/// Damage dealt by [`Effect::DealDamage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DamageAmount {
    /// A fixed number of damage points.
    Fixed {
        /// Damage points.
        amount: i32,
    },
    /// A percentage of the actor's attack.
    AttackPercent {
        /// Percentage of attack, 100 meaning the full attack stat.
        #[serde(rename = "attackDamagePercent")]
        percent: i32,
    },
}

impl DamageAmount {
    /// Returns the damage for an actor with the given attack.
    #[must_use]
    pub fn resolve(self, attack: i32) -> i32 {
        match self {
            Self::Fixed { amount } => amount,
            Self::AttackPercent { percent } => attack * percent / 100,
        }
    }
}

/// The action an ability performs when triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Effect {
    /// Perform exactly one of the effects, chosen uniformly at random.
    OneOf {
        /// Candidate effects.
        effects: Vec<Effect>,
    },
    /// Perform every effect in order.
    AllOf {
        /// Effects to perform.
        effects: Vec<Effect>,
    },
    /// Add to attack and health.
    ModifyStats {
        /// Attack delta.
        #[serde(default)]
        attack_amount: i32,
        /// Health delta.
        #[serde(default)]
        health_amount: i32,
        /// Who receives the delta.
        target: TargetSelector,
        /// Whether the delta is reverted when the next battle ends.
        #[serde(default)]
        until_end_of_battle: bool,
    },
    /// Grant experience points.
    GainExperience {
        /// Experience units.
        amount: u32,
        /// Who gains experience.
        target: TargetSelector,
    },
    /// Replace the targets' status.
    ApplyStatus {
        /// The status to apply.
        status: StatusId,
        /// Who receives the status.
        target: TargetSelector,
    },
    /// Attack the targets outside the head-to-head exchange.
    DealDamage {
        /// How much damage.
        #[serde(flatten)]
        amount: DamageAmount,
        /// Who is hit.
        target: TargetSelector,
    },
    /// Hit the enemy behind the front pet.
    SplashDamage {
        /// Damage points.
        amount: i32,
    },
    /// Remove a share of the targets' health without killing them.
    ReduceHealth {
        /// Percentage of current health removed.
        percentage: i32,
        /// Who loses health.
        target: TargetSelector,
    },
    /// Summon a specific pet kind.
    SummonPet {
        /// The kind to summon.
        pet: PetKindId,
        /// Which roster receives it.
        #[serde(default)]
        team: SummonTeam,
        /// Attack override.
        with_attack: Option<i32>,
        /// Health override.
        with_health: Option<i32>,
    },
    /// Summon a random pet kind of a tier.
    SummonRandomPet {
        /// Tier to draw from.
        tier: u8,
        /// Attack override.
        base_attack: Option<i32>,
        /// Health override.
        base_health: Option<i32>,
        /// Level of the summoned pet.
        level: Option<u8>,
    },
    /// Summon a fresh copy of the actor's kind at the actor's level.
    RespawnPet {
        /// Attack of the copy.
        base_attack: i32,
        /// Health of the copy.
        base_health: i32,
    },
    /// Copy stats from one pet to others.
    TransferStats {
        /// The donor; the first resolved pet is used.
        from: TargetSelector,
        /// The receivers.
        #[serde(alias = "target")]
        to: TargetSelector,
        /// Copy the attack stat.
        #[serde(default)]
        copy_attack: bool,
        /// Copy the health stat.
        #[serde(default)]
        copy_health: bool,
    },
    /// Copy the ability of one pet to others until the battle ends.
    TransferAbility {
        /// The donor; the first resolved pet is used.
        from: TargetSelector,
        /// The receivers.
        #[serde(alias = "target")]
        to: TargetSelector,
        /// Level at which the copied ability is used.
        level: Option<u8>,
    },
    /// Add gold to the shop.
    GainGold {
        /// Gold to add.
        amount: i32,
    },
    /// Replace the actor with a pet of another kind.
    Evolve {
        /// The kind to become.
        into: PetKindId,
    },
    /// Make the targets perform the caster's ability again.
    RepeatAbility {
        /// Who repeats.
        target: TargetSelector,
        /// Level at which the ability is repeated.
        level: Option<u8>,
    },
    /// Adjust damage while a hit is computed.
    ModifyDamage {
        /// Damage added when attacking or removed when damaged; `None` is absolute.
        damage_modifier: Option<i32>,
        /// Whether the status is consumed after use.
        #[serde(default)]
        applies_once: bool,
    },
}

impl Effect {
    /// Returns true if this effect or any nested effect satisfies `pred`.
    pub fn any(&self, pred: &impl Fn(&Effect) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Self::OneOf { effects } | Self::AllOf { effects } => {
                effects.iter().any(|effect| effect.any(pred))
            }
            _ => false,
        }
    }
}

/// A (trigger, predicate, effect) tuple attached to a pet kind level, a status or a food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityDefinition {
    /// Human-readable text.
    #[serde(default)]
    pub description: String,
    /// Event that activates the ability.
    pub trigger: Trigger,
    /// Which pet relative to the event source may react.
    pub triggered_by: TriggeredBy,
    /// What the ability does.
    pub effect: Effect,
    /// How many times the ability may fire before the next battle ends.
    #[serde(default)]
    pub max_triggers: Option<u32>,
}

// =============================================================================
// Pet kinds, statuses and foods
// =============================================================================

/// A pet kind: base stats, tier and one ability per level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetKindDefinition {
    /// Kind id.
    pub id: PetKindId,
    /// Display name.
    pub name: String,
    /// Shop tier, 1 to 6.
    pub tier: u8,
    /// Attack of a freshly created pet.
    pub base_attack: i32,
    /// Health of a freshly created pet.
    pub base_health: i32,
    /// Packs the kind belongs to.
    #[serde(default)]
    pub packs: Vec<String>,
    /// Ability at level 1.
    pub level1_ability: Option<AbilityDefinition>,
    /// Ability at level 2.
    pub level2_ability: Option<AbilityDefinition>,
    /// Ability at level 3.
    pub level3_ability: Option<AbilityDefinition>,
}

impl PetKindDefinition {
    /// Returns the ability used at `level`, clamped to 1..=3.
    #[must_use]
    pub fn ability(&self, level: u8) -> Option<&AbilityDefinition> {
        match level {
            0 | 1 => self.level1_ability.as_ref(),
            2 => self.level2_ability.as_ref(),
            _ => self.level3_ability.as_ref(),
        }
    }

    fn abilities(&self) -> impl Iterator<Item = &AbilityDefinition> {
        [&self.level1_ability, &self.level2_ability, &self.level3_ability]
            .into_iter()
            .flatten()
    }
}

/// A status a pet can carry, such as an armor or a weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    /// Status id.
    pub id: StatusId,
    /// Display name.
    pub name: String,
    /// The status ability.
    pub ability: AbilityDefinition,
}

fn default_food_cost() -> u32 {
    3
}

/// A food sold in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodDefinition {
    /// Food id.
    pub id: FoodId,
    /// Display name.
    pub name: String,
    /// Shop tier.
    #[serde(default)]
    pub tier: u8,
    /// Gold cost.
    #[serde(default = "default_food_cost")]
    pub cost: u32,
    /// What eating it does.
    pub ability: AbilityDefinition,
}

// =============================================================================
// Trigger index
// =============================================================================

/// Ability holders that declare one trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TriggerEntry {
    pets: BTreeSet<PetKindId>,
    statuses: BTreeSet<StatusId>,
    foods: BTreeSet<FoodId>,
}

/// Maps each trigger to the pet kinds, statuses and foods that can react to it.
///
/// Built once from all loaded definitions. A pet kind with a
/// [`Effect::TransferAbility`] ability is registered under every trigger,
/// since the ability it ends up using is only known at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerIndex {
    entries: HashMap<Trigger, TriggerEntry>,
}

impl TriggerIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from definitions.
    pub fn build<'a>(
        pets: impl IntoIterator<Item = &'a PetKindDefinition>,
        statuses: impl IntoIterator<Item = &'a StatusDefinition>,
        foods: impl IntoIterator<Item = &'a FoodDefinition>,
    ) -> Self {
        let mut index = Self::new();
        for pet in pets {
            let transfers = pet
                .abilities()
                .any(|ability| ability.effect.any(&|e| matches!(e, Effect::TransferAbility { .. })));
            if transfers {
                for trigger in Trigger::ALL {
                    index.register_pet(trigger, pet.id.clone());
                }
            } else {
                for ability in pet.abilities() {
                    index.register_pet(ability.trigger, pet.id.clone());
                }
            }
        }
        for status in statuses {
            index
                .entries
                .entry(status.ability.trigger)
                .or_default()
                .statuses
                .insert(status.id.clone());
        }
        for food in foods {
            index
                .entries
                .entry(food.ability.trigger)
                .or_default()
                .foods
                .insert(food.id.clone());
        }
        index
    }

    /// Registers a pet kind under a trigger.
    pub fn register_pet(&mut self, trigger: Trigger, pet: PetKindId) {
        self.entries.entry(trigger).or_default().pets.insert(pet);
    }

    /// Returns the pet kinds registered under a trigger, in id order.
    pub fn pets_for(&self, trigger: Trigger) -> impl Iterator<Item = &PetKindId> {
        self.entries
            .get(&trigger)
            .into_iter()
            .flat_map(|entry| entry.pets.iter())
    }

    /// Returns true if the food's ability declares the trigger.
    #[must_use]
    pub fn food_reacts(&self, trigger: Trigger, food: &FoodId) -> bool {
        self.entries
            .get(&trigger)
            .is_some_and(|entry| entry.foods.contains(food))
    }

    /// Returns true if any ability the pet may currently use declares the trigger.
    ///
    /// Checks the pet's own kind, a kind whose ability it borrowed, and its status.
    #[must_use]
    pub fn may_react(&self, trigger: Trigger, pet: &Pet) -> bool {
        let Some(entry) = self.entries.get(&trigger) else {
            return false;
        };
        entry.pets.contains(pet.kind())
            || entry.pets.contains(pet.ability_kind())
            || pet
                .status()
                .is_some_and(|status| entry.statuses.contains(status))
    }

    /// Returns the number of triggers with at least one registration.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Definitions
// =============================================================================

/// Raw definition maps as they appear in a JSON source, keyed by id.
#[derive(Debug, Default, Deserialize)]
struct DefinitionSource {
    #[serde(default)]
    pets: BTreeMap<String, PetKindDefinition>,
    #[serde(default)]
    statuses: BTreeMap<String, StatusDefinition>,
    #[serde(default)]
    foods: BTreeMap<String, FoodDefinition>,
}

/// Every pet kind, status and food known to the engine, plus the trigger index.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pets: BTreeMap<PetKindId, PetKindDefinition>,
    statuses: BTreeMap<StatusId, StatusDefinition>,
    foods: BTreeMap<FoodId, FoodDefinition>,
    index: TriggerIndex,
}

impl Definitions {
    /// Creates a definition set and builds its trigger index.
    pub fn new(
        pets: impl IntoIterator<Item = PetKindDefinition>,
        statuses: impl IntoIterator<Item = StatusDefinition>,
        foods: impl IntoIterator<Item = FoodDefinition>,
    ) -> Self {
        let pets: BTreeMap<_, _> = pets.into_iter().map(|p| (p.id.clone(), p)).collect();
        let statuses: BTreeMap<_, _> = statuses.into_iter().map(|s| (s.id.clone(), s)).collect();
        let foods: BTreeMap<_, _> = foods.into_iter().map(|f| (f.id.clone(), f)).collect();
        let index = TriggerIndex::build(pets.values(), statuses.values(), foods.values());
        Self {
            pets,
            statuses,
            foods,
            index,
        }
    }

    /// Parses definitions from JSON and normalizes known data quirks.
    ///
    /// Food abilities declared on `Buy` are moved to `BuyFood`, and status
    /// abilities declared on `Buy` are moved to `AfterAttack`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDefinitions`] if the JSON does not match
    /// the definition schema.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let source: DefinitionSource = serde_json::from_str(json)?;
        let foods = source.foods.into_values().map(|mut food| {
            if food.ability.trigger == Trigger::Buy {
                food.ability.trigger = Trigger::BuyFood;
            }
            food
        });
        let statuses = source.statuses.into_values().map(|mut status| {
            if status.ability.trigger == Trigger::Buy {
                status.ability.trigger = Trigger::AfterAttack;
            }
            status
        });
        Ok(Self::new(source.pets.into_values(), statuses, foods))
    }

    /// Returns a copy restricted to pet kinds of one pack.
    #[must_use]
    pub fn for_pack(&self, pack: &str) -> Self {
        Self::new(
            self.pets
                .values()
                .filter(|pet| pet.packs.iter().any(|p| p == pack))
                .cloned(),
            self.statuses.values().cloned(),
            self.foods.values().cloned(),
        )
    }

    /// Looks up a pet kind.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPetKind`] if the id is not defined.
    pub fn pet_kind(&self, id: &PetKindId) -> EngineResult<&PetKindDefinition> {
        self.pets
            .get(id)
            .ok_or_else(|| EngineError::UnknownPetKind(id.clone()))
    }

    /// Looks up a status.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownStatus`] if the id is not defined.
    pub fn status(&self, id: &StatusId) -> EngineResult<&StatusDefinition> {
        self.statuses
            .get(id)
            .ok_or_else(|| EngineError::UnknownStatus(id.clone()))
    }

    /// Looks up a food.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownFood`] if the id is not defined.
    pub fn food(&self, id: &FoodId) -> EngineResult<&FoodDefinition> {
        self.foods
            .get(id)
            .ok_or_else(|| EngineError::UnknownFood(id.clone()))
    }

    /// Returns every pet kind in id order.
    pub fn pet_kinds(&self) -> impl Iterator<Item = &PetKindDefinition> {
        self.pets.values()
    }

    /// Returns every status in id order.
    pub fn statuses(&self) -> impl Iterator<Item = &StatusDefinition> {
        self.statuses.values()
    }

    /// Returns every food in id order.
    pub fn foods(&self) -> impl Iterator<Item = &FoodDefinition> {
        self.foods.values()
    }

    /// Returns the pet kinds of a tier in id order.
    #[must_use]
    pub fn pet_kinds_in_tier(&self, tier: u8) -> Vec<&PetKindDefinition> {
        self.pets.values().filter(|pet| pet.tier == tier).collect()
    }

    /// Returns the ability a pet currently uses, honoring borrowed abilities.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPetKind`] if the ability's kind is not defined.
    pub fn level_ability(&self, pet: &Pet) -> EngineResult<Option<&AbilityDefinition>> {
        Ok(self.pet_kind(pet.ability_kind())?.ability(pet.ability_level()))
    }

    /// Returns the ability of the pet's status, if it carries one.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownStatus`] if the status is not defined.
    pub fn status_ability(&self, pet: &Pet) -> EngineResult<Option<&AbilityDefinition>> {
        match pet.status() {
            Some(status) => Ok(Some(&self.status(status)?.ability)),
            None => Ok(None),
        }
    }

    /// Returns the trigger index.
    #[must_use]
    pub fn trigger_index(&self) -> &TriggerIndex {
        &self.index
    }
}
