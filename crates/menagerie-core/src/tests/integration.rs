//! Integration tests for whole battles and purchase phases.
//!
//! These drive the public entry points with the sample catalog and check
//! the interplay between dispatch, targeting, effects and the attack
//! pipeline:
//! - Faint, hurt and knockout bookkeeping
//! - Summons and their placement rules
//! - Status damage modifiers
//! - Ability repetition and trigger caps
//! - Dispatch guards

use crate::battle::{run_battle, Battle, BattleOutcome, BattleState};
use crate::board::{PetId, Side};
use crate::config::EngineConfig;
use crate::definition::{
    Definitions, Effect, FoodId, PetKindId, StatusId, SummonTeam, TargetSelector, Trigger, TriggeredBy,
};
use crate::error::EngineError;
use crate::pet::Pet;
use crate::shop::{PurchasePhase, ShopState};
use crate::team::Team;

use super::helpers::{
    ability, at, catalog, catalog_with, count, count_from, kind, kinds, logged, pet, stats, team,
    with_ability,
};

/// The sample catalog plus a few stat sticks.
fn arena_catalog() -> Definitions {
    catalog_with([
        kind("pet-plain", 1, 5),
        kind("pet-brute", 2, 50),
        kind("pet-tank", 1, 50),
        kind("pet-dummy", 1, 10),
        kind("pet-pacifist", 0, 5),
    ])
}

fn with_status(defs: &Definitions, id: &str, status: &str) -> Pet {
    pet(defs, id).with_status(StatusId::new(status))
}

fn step(battle: &mut Battle<'_>, rounds: usize) {
    for _ in 0..rounds {
        battle.step().unwrap();
    }
}

// =============================================================================
// Faint bookkeeping
// =============================================================================

#[test]
fn fainted_pet_hears_one_faint_and_nothing_after() {
    let defs = arena_catalog();
    let config = logged(3);
    let a = team(&defs, &["pet-fish", "pet-ant"]);
    let b = team(&defs, &["pet-beaver"]);
    let report = Battle::new(&defs, &a, &b, &config).run().unwrap();

    let ant = PetId::new(1);
    assert_eq!(count_from(&report.events, Trigger::Faint, ant), 1);
    let faint = report
        .events
        .iter()
        .position(|record| record.trigger == Trigger::Faint && record.source == Some(ant))
        .unwrap();
    assert!(report.events[faint + 1..]
        .iter()
        .all(|record| !record.notified.contains(&ant)));

    // The ant's faint ability fed the fish before the battle ended.
    assert_eq!(report.outcome, BattleOutcome::Team1Win);
    assert_eq!(report.rounds, 1);
    let fish = &report.survivors[0][0];
    assert_eq!((fish.attack(), fish.health()), (4, 3));
}

#[test]
fn zero_damage_raises_no_hurt_or_faint() {
    let defs = arena_catalog();
    let config = logged(1).with_max_rounds(3);
    let a = team(&defs, &["pet-pacifist"]);
    let report = Battle::new(&defs, &a, &a.clone(), &config).run().unwrap();

    assert_eq!(report.outcome, BattleOutcome::Draw);
    assert_eq!(count(&report.events, Trigger::Hurt), 0);
    assert_eq!(count(&report.events, Trigger::Faint), 0);
    assert_eq!(count(&report.events, Trigger::BeforeAttack), 6);
}

#[test]
fn knockout_is_raised_for_the_attacker() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = team(&defs, &["pet-brute"]);
    let b = team(&defs, &["pet-ant"]);
    let report = Battle::new(&defs, &a, &b, &config).run().unwrap();
    assert_eq!(count_from(&report.events, Trigger::Knockout, PetId::new(0)), 1);
}

#[test]
fn buffs_from_battle_and_experience_settle_after_cleanup() {
    let defs = arena_catalog();
    let mut fish = pet(&defs, "pet-fish");
    fish.buff(1, 1, true);
    assert_eq!(fish.add_experience(1), 1);
    let mut a = Team::with_pets([fish]);
    let mut b = Team::new();

    assert_eq!(
        run_battle(&defs, &mut a, &mut b, &EngineConfig::default()).unwrap(),
        BattleOutcome::Team1Win
    );
    let fish = &a.pets()[0];
    assert_eq!((fish.attack(), fish.health()), (3, 3));
}

#[test]
fn battle_does_not_touch_the_original_teams() {
    let defs = arena_catalog();
    let mut a = team(&defs, &["pet-peacock"]);
    let mut b = team(&defs, &["pet-plain"]);
    let before = a.clone();
    run_battle(&defs, &mut a, &mut b, &EngineConfig::default()).unwrap();
    assert_eq!(a, before);
}

// =============================================================================
// Ability behavior in battle
// =============================================================================

#[test]
fn trigger_cap_limits_repeated_hurt_buffs() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = team(&defs, &["pet-peacock"]);
    let b = team(&defs, &["pet-dummy", "pet-plain"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(stats(battle.board(), Side::A), [(6, 4)]);
    step(&mut battle, 1);
    // Hurt again, but the ability only works once per battle.
    assert_eq!(stats(battle.board(), Side::A), [(6, 3)]);
}

#[test]
fn flamingo_feeds_the_friends_it_left_behind() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = team(&defs, &["pet-fish", "pet-ant", "pet-flamingo"]);
    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(kinds(battle.board(), Side::A), ["pet-fish", "pet-ant"]);
    assert_eq!(stats(battle.board(), Side::A), [(3, 3), (3, 2)]);
}

#[test]
fn friend_ahead_reacts_to_the_faint_in_front_of_it() {
    let mourner = with_ability(
        kind("pet-mourner", 1, 5),
        ability(
            Trigger::Faint,
            TriggeredBy::FriendAhead,
            Effect::ModifyStats {
                attack_amount: 3,
                health_amount: 0,
                target: TargetSelector::SelfPet,
                until_end_of_battle: false,
            },
        ),
    );
    let defs = catalog_with([mourner, kind("pet-plain", 1, 2), kind("pet-brute", 2, 50)]);
    let config = logged(1);
    let a = team(&defs, &["pet-mourner", "pet-plain"]);
    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(stats(battle.board(), Side::A), [(4, 5)]);
}

#[test]
fn kangaroo_grows_when_the_friend_ahead_attacks() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = team(&defs, &["pet-kangaroo", "pet-dummy"]);
    let b = team(&defs, &["pet-dummy"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(stats(battle.board(), Side::A), [(3, 4), (1, 9)]);
}

#[test]
fn hurt_damage_is_queued_and_played_in_the_same_cycle() {
    let defs = arena_catalog();
    let config = logged(9);
    let a = team(&defs, &["pet-blowfish"]);
    let b = team(&defs, &["pet-dummy", "pet-dummy"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    let remaining: i32 = stats(battle.board(), Side::B).iter().map(|(_, health)| health).sum();
    assert_eq!(remaining, 20 - 3 - 2);
    assert_eq!(stats(battle.board(), Side::A), [(3, 4)]);
}

#[test]
fn start_of_battle_abilities_resolve_before_the_first_attack() {
    let defs = catalog_with([kind("pet-giant", 1, 30), kind("pet-dummy", 1, 9)]);
    let config = logged(1);
    let a = team(&defs, &["pet-skunk"]);
    let b = team(&defs, &["pet-giant", "pet-dummy"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    battle.start().unwrap();
    assert_eq!(battle.state(), BattleState::Running);
    assert_eq!(battle.rounds(), 0);
    assert_eq!(stats(battle.board(), Side::B), [(1, 21), (1, 9)]);
}

#[test]
fn caterpillar_evolves_at_level_three() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = Team::with_pets([pet(&defs, "pet-fish"), pet(&defs, "pet-caterpillar").with_level(3)]);
    let mut battle = Battle::new(&defs, &a, &Team::new(), &config);

    battle.start().unwrap();
    assert_eq!(kinds(battle.board(), Side::A), ["pet-fish", "pet-butterfly"]);
    assert_eq!(count(battle.events(), Trigger::Faint), 0);
}

#[test]
fn tiger_repeats_the_ability_of_the_friend_ahead() {
    let defs = catalog_with([kind("pet-giant", 2, 20)]);
    let config = logged(1);
    let a = team(&defs, &["pet-tiger", "pet-dolphin"]);
    let b = team(&defs, &["pet-giant"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    battle.start().unwrap();
    assert_eq!(stats(battle.board(), Side::B), [(2, 10)]);
    assert_eq!(count(battle.events(), Trigger::CastsAbility), 1);
}

#[test]
fn repeated_ability_is_not_announced_again() {
    let defs = catalog_with([kind("pet-giant", 2, 40)]);
    let config = logged(1);
    let a = team(&defs, &["pet-tiger", "pet-tiger", "pet-dolphin"]);
    let b = team(&defs, &["pet-giant"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    battle.start().unwrap();
    // Only the tiger directly behind the dolphin repeats.
    assert_eq!(stats(battle.board(), Side::B), [(2, 30)]);
    assert_eq!(count(battle.events(), Trigger::CastsAbility), 1);
}

// =============================================================================
// Summons
// =============================================================================

#[test]
fn sheep_leaves_two_rams_at_the_front() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = team(&defs, &["pet-fish", "pet-sheep"]);
    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(kinds(battle.board(), Side::A), ["pet-fish", "pet-ram", "pet-ram"]);
    assert_eq!(count(battle.events(), Trigger::Summoned), 2);
}

#[test]
fn horse_buffs_summoned_friends() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = team(&defs, &["pet-horse", "pet-cricket"]);
    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(kinds(battle.board(), Side::A), ["pet-horse", "pet-zombie-cricket"]);
    assert_eq!(stats(battle.board(), Side::A), [(2, 1), (2, 1)]);
}

#[test]
fn rat_gives_the_enemy_a_dirty_rat_at_the_back() {
    let defs = catalog_with([kind("pet-brute", 6, 50)]);
    let config = logged(1);
    let a = team(&defs, &["pet-rat"]);
    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(kinds(battle.board(), Side::B), ["pet-dirty-rat", "pet-brute"]);
}

#[test]
fn fly_answers_a_friend_faint_before_the_friend_does() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = team(&defs, &["pet-fly", "pet-cricket"]);
    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(
        kinds(battle.board(), Side::A),
        ["pet-fly", "pet-zombie-fly", "pet-zombie-cricket"]
    );
}

#[test]
fn summons_into_a_full_roster_are_dropped() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = team(&defs, &["pet-fish", "pet-fish", "pet-fish", "pet-fish", "pet-sheep"]);
    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    // One free slot: the second ram does not fit.
    assert_eq!(battle.board().roster(Side::A).len(), 5);
    assert_eq!(count(battle.events(), Trigger::Summoned), 1);
}

// =============================================================================
// Status damage modifiers
// =============================================================================

#[test]
fn melon_armor_absorbs_one_hit() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = Team::with_pets([with_status(&defs, "pet-plain", "status-melon-armor")]);
    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    let plain = at(battle.board(), Side::A, 0);
    assert_eq!(battle.board().pet(plain).unwrap().health(), 5);
    assert_eq!(battle.board().pet(plain).unwrap().status(), None);
    assert_eq!(count(battle.events(), Trigger::Hurt), 1);

    step(&mut battle, 1);
    assert_eq!(battle.board().pet(plain).unwrap().health(), 3);
}

#[test]
fn damage_modifiers_adjust_hits() {
    let cases = [
        ("status-garlic-armor", "pet-brute", 5),
        ("status-weak", "pet-plain", 1),
        ("status-coconut-shield", "pet-brute", 5),
    ];
    let defs = arena_catalog();
    let config = logged(1);
    for (status, attacker, expected) in cases {
        let a = Team::with_pets([with_status(&defs, "pet-plain", status)]);
        let b = team(&defs, &[attacker]);
        let mut battle = Battle::new(&defs, &a, &b, &config);
        step(&mut battle, 1);
        assert_eq!(stats(battle.board(), Side::A), [(1, expected)], "{status}");
    }
}

#[test]
fn attack_modifiers_apply_to_primary_attacks() {
    let defs = arena_catalog();
    let config = logged(1);
    let cases = [("status-bone-attack", 45), ("status-steak-attack", 29)];
    for (status, expected) in cases {
        let a = Team::with_pets([with_status(&defs, "pet-plain", status)]);
        let b = team(&defs, &["pet-tank"]);
        let mut battle = Battle::new(&defs, &a, &b, &config);
        step(&mut battle, 1);
        assert_eq!(stats(battle.board(), Side::B), [(1, expected)], "{status}");
    }
}

#[test]
fn poison_knocks_out_unless_armor_absorbs_it() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = Team::with_pets([with_status(&defs, "pet-plain", "status-poison-attack")]);

    let report = Battle::new(&defs, &a, &team(&defs, &["pet-tank"]), &config).run().unwrap();
    assert_eq!(report.outcome, BattleOutcome::Team1Win);
    assert_eq!(report.rounds, 1);

    let armored = Team::with_pets([with_status(&defs, "pet-tank", "status-melon-armor")]);
    let mut battle = Battle::new(&defs, &a, &armored, &config);
    step(&mut battle, 1);
    assert_eq!(stats(battle.board(), Side::B), [(1, 50)]);
    let attacker = at(battle.board(), Side::A, 0);
    assert_eq!(battle.board().pet(attacker).unwrap().status(), None);
}

#[test]
fn splash_attack_hits_the_pet_behind_the_front() {
    let defs = arena_catalog();
    let config = logged(1);
    let a = Team::with_pets([with_status(&defs, "pet-plain", "status-splash-attack")]);
    let b = team(&defs, &["pet-dummy", "pet-dummy"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);

    step(&mut battle, 1);
    assert_eq!(stats(battle.board(), Side::B), [(1, 5), (1, 9)]);
}

// =============================================================================
// Errors and guards
// =============================================================================

#[test]
fn unknown_status_surfaces_from_run_battle() {
    let defs = arena_catalog();
    let mut a = Team::with_pets([with_status(&defs, "pet-plain", "status-missing")]);
    let mut b = team(&defs, &["pet-plain"]);
    let before = a.clone();

    let err = run_battle(&defs, &mut a, &mut b, &EngineConfig::default()).unwrap_err();
    assert_eq!(err, EngineError::UnknownStatus(StatusId::new("status-missing")));
    assert_eq!(a, before);
}

#[test]
fn random_summon_from_an_empty_tier_fails_the_battle() {
    let defs = Definitions::new(
        catalog()
            .pet_kinds()
            .filter(|kind| kind.tier != 3)
            .cloned()
            .chain([kind("pet-brute", 2, 50)]),
        [],
        [],
    );
    let err = Battle::new(
        &defs,
        &team(&defs, &["pet-spider"]),
        &team(&defs, &["pet-brute"]),
        &EngineConfig::default(),
    )
    .run()
    .unwrap_err();
    assert_eq!(err, EngineError::EmptyTier(3));
}

fn hydra_catalog() -> Definitions {
    let hydra = with_ability(
        kind("pet-hydra", 1, 1),
        ability(
            Trigger::Summoned,
            TriggeredBy::SelfPet,
            Effect::SummonPet {
                pet: PetKindId::new("pet-hydra"),
                team: SummonTeam::Friendly,
                with_attack: None,
                with_health: None,
            },
        ),
    );
    Definitions::new([hydra], [], [])
}

#[test]
fn runaway_nesting_hits_the_depth_guard() {
    let defs = hydra_catalog();
    let config = EngineConfig::default().with_max_dispatch_depth(3);
    let mut team = Team::new();
    let mut shop = ShopState::default();
    let mut phase = PurchasePhase::new(&defs, &mut team, &mut shop, &config);

    let err = phase
        .place_pet(pet(&defs, "pet-hydra"), None, false, false)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::DispatchDepthExceeded {
            trigger: Trigger::Summoned,
            limit: 3
        }
    );
}

#[test]
fn runaway_event_counts_hit_the_budget() {
    let defs = hydra_catalog();
    let config = EngineConfig::default().with_max_events(3);
    let mut team = Team::new();
    let mut shop = ShopState::default();
    let mut phase = PurchasePhase::new(&defs, &mut team, &mut shop, &config);

    let err = phase
        .place_pet(pet(&defs, "pet-hydra"), None, true, false)
        .unwrap_err();
    assert_eq!(err, EngineError::EventBudgetExceeded { limit: 3 });
}

#[test]
fn hydras_stop_when_the_roster_is_full() {
    let defs = hydra_catalog();
    let config = EngineConfig::default();
    let mut team = Team::new();
    let mut shop = ShopState::default();
    let mut phase = PurchasePhase::new(&defs, &mut team, &mut shop, &config);

    phase.place_pet(pet(&defs, "pet-hydra"), None, false, false).unwrap();
    drop(phase);
    assert_eq!(team.len(), 5);
}

// =============================================================================
// Purchase phase into battle
// =============================================================================

#[test]
fn shop_turn_prepares_a_team_for_battle() {
    let defs = arena_catalog();
    let config = logged(4);
    let mut a = team(&defs, &["pet-fish", "pet-turtle"]);
    let mut shop = ShopState::default();

    let mut phase = PurchasePhase::new(&defs, &mut a, &mut shop, &config);
    phase.feed(&FoodId::new("food-honey"), 1).unwrap();
    phase.end_turn().unwrap();
    drop(phase);
    assert_eq!(a.pets()[1].status(), Some(&StatusId::new("status-bone-attack")));

    let b = team(&defs, &["pet-brute"]);
    let mut battle = Battle::new(&defs, &a, &b, &config);
    step(&mut battle, 1);
    // The turtle hit for 1 + 4 and passed melon armor back before fainting.
    assert_eq!(stats(battle.board(), Side::B), [(2, 45)]);
    let fish = at(battle.board(), Side::A, 0);
    assert_eq!(
        battle.board().pet(fish).unwrap().status(),
        Some(&StatusId::new("status-melon-armor"))
    );
}
