//! Test helper functions for building definitions, teams and engines.
//!
//! Most tests run against the sample catalog in `data/definitions.json` at
//! the workspace root, which covers every effect and selector kind. Tests
//! that need a pet shaped in a particular way build it with [`kind`] and
//! [`ability`] instead.

use crate::board::{Board, PetId, Side};
use crate::config::EngineConfig;
use crate::definition::{
    AbilityDefinition, Definitions, Effect, PetKindDefinition, PetKindId, Trigger, TriggeredBy,
};
use crate::dispatch::Engine;
use crate::event_log::EventRecord;
use crate::pet::Pet;
use crate::team::Team;

/// The sample catalog shipped with the workspace.
pub const CATALOG_JSON: &str = include_str!("../../../../data/definitions.json");

// =============================================================================
// Definitions
// =============================================================================

/// Loads the sample catalog.
///
/// # Panics
///
/// Panics if the catalog does not parse.
pub fn catalog() -> Definitions {
    Definitions::from_json(CATALOG_JSON).expect("sample catalog parses")
}

/// Loads the sample catalog with extra pet kinds added.
pub fn catalog_with(extra: impl IntoIterator<Item = PetKindDefinition>) -> Definitions {
    let base = catalog();
    Definitions::new(
        base.pet_kinds().cloned().chain(extra),
        base.statuses().cloned(),
        base.foods().cloned(),
    )
}

/// Creates a tier 1 pet kind with no abilities.
pub fn kind(id: &str, attack: i32, health: i32) -> PetKindDefinition {
    PetKindDefinition {
        id: PetKindId::new(id),
        name: id.to_string(),
        tier: 1,
        base_attack: attack,
        base_health: health,
        packs: Vec::new(),
        level1_ability: None,
        level2_ability: None,
        level3_ability: None,
    }
}

/// Gives a kind the same ability at every level.
pub fn with_ability(mut kind: PetKindDefinition, ability: AbilityDefinition) -> PetKindDefinition {
    kind.level1_ability = Some(ability.clone());
    kind.level2_ability = Some(ability.clone());
    kind.level3_ability = Some(ability);
    kind
}

/// Creates an uncapped ability.
pub fn ability(trigger: Trigger, triggered_by: TriggeredBy, effect: Effect) -> AbilityDefinition {
    AbilityDefinition {
        description: String::new(),
        trigger,
        triggered_by,
        effect,
        max_triggers: None,
    }
}

// =============================================================================
// Teams and engines
// =============================================================================

/// Creates a level 1 pet of a catalog kind.
///
/// # Panics
///
/// Panics if the kind is not defined.
pub fn pet(defs: &Definitions, id: &str) -> Pet {
    Pet::new(defs.pet_kind(&PetKindId::new(id)).expect("kind is defined"))
}

/// Creates a team of level 1 pets, back to front.
pub fn team(defs: &Definitions, ids: &[&str]) -> Team {
    Team::with_pets(ids.iter().map(|id| pet(defs, id)))
}

/// Returns a config that records events.
pub fn logged(seed: u64) -> EngineConfig {
    EngineConfig::default().with_seed(seed).with_event_log()
}

/// Creates a battle engine over copies of two teams.
pub(crate) fn battle_engine<'a>(
    defs: &'a Definitions,
    config: &'a EngineConfig,
    team_a: &Team,
    team_b: &Team,
) -> Engine<'a> {
    Engine::new(defs, config, Board::from_teams(team_a, team_b), None)
}

// =============================================================================
// Board inspection
// =============================================================================

/// Returns the kind ids on a side, back to front.
pub fn kinds(board: &Board, side: Side) -> Vec<String> {
    board
        .live_pets(side)
        .map(|pet| pet.kind().as_str().to_string())
        .collect()
}

/// Returns `(attack, health)` of each pet on a side, back to front.
pub fn stats(board: &Board, side: Side) -> Vec<(i32, i32)> {
    board
        .live_pets(side)
        .map(|pet| (pet.attack(), pet.health()))
        .collect()
}

/// Returns the roster id at `index` on a side.
///
/// # Panics
///
/// Panics if the index is out of range.
pub fn at(board: &Board, side: Side, index: usize) -> PetId {
    board.roster(side)[index]
}

/// Counts recorded events of one trigger.
pub fn count(events: &[EventRecord], trigger: Trigger) -> usize {
    events.iter().filter(|record| record.trigger == trigger).count()
}

/// Counts recorded events of one trigger caused by one pet.
pub fn count_from(events: &[EventRecord], trigger: Trigger, source: PetId) -> usize {
    events
        .iter()
        .filter(|record| record.trigger == trigger && record.source == Some(source))
        .count()
}
