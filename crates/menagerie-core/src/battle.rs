//! Battle state machine and attack resolution.
//!
//! A [`Battle`] copies two teams onto a [`Board`] and advances through
//! [`BattleState::NotStarted`], [`BattleState::Running`] and
//! [`BattleState::Finished`]. Each [`Battle::step`] runs one attack cycle:
//! the front pets trade primary attacks, then the secondary attacks queued by
//! abilities are played pairwise until both queues are empty.
//!
//! # Hit resolution
//!
//! Both sides' hits are computed and applied before any follow-up event, so
//! two front pets that kill each other both faint. Follow-ups run side `A`
//! first: `Hurt` for a survivor, or removal, `Faint` and `Knockout` for a
//! victim. Every follow-up event of one attack sees the roster order captured
//! just before the hits landed.
//!
//! # Example
//!
//! ```
//! use menagerie_core::battle::{run_battle, BattleOutcome};
//! use menagerie_core::config::EngineConfig;
//! use menagerie_core::definition::{Definitions, PetKindDefinition, PetKindId};
//! use menagerie_core::pet::Pet;
//! use menagerie_core::team::Team;
//!
//! let kind = |id: &str, attack, health| PetKindDefinition {
//!     id: PetKindId::new(id),
//!     name: id.to_string(),
//!     tier: 1,
//!     base_attack: attack,
//!     base_health: health,
//!     packs: Vec::new(),
//!     level1_ability: None,
//!     level2_ability: None,
//!     level3_ability: None,
//! };
//! let ant = kind("pet-ant", 2, 1);
//! let fish = kind("pet-fish", 2, 3);
//! let defs = Definitions::new([ant.clone(), fish.clone()], [], []);
//!
//! let mut team_a = Team::with_pets([Pet::new(&fish)]);
//! let mut team_b = Team::with_pets([Pet::new(&ant)]);
//! let outcome = run_battle(&defs, &mut team_a, &mut team_b, &EngineConfig::default()).unwrap();
//! assert_eq!(outcome, BattleOutcome::Team1Win);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::board::{Board, PetId, Side};
use crate::config::EngineConfig;
use crate::context::EventContext;
use crate::definition::{Definitions, Effect, Trigger};
use crate::dispatch::Engine;
use crate::error::EngineResult;
use crate::event_log::EventRecord;
use crate::pet::{Pet, MAX_HEALTH};
use crate::team::Team;

// =============================================================================
// Attacks
// =============================================================================

/// A pending application of damage from one pet to a list of targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    /// The pet dealing damage.
    pub attacker: PetId,
    /// The attacker's side.
    pub side: Side,
    /// Pets hit, in order.
    pub targets: Vec<PetId>,
    /// Base damage per target.
    pub damage: i32,
    /// True for the head-to-head exchange, false for ability damage.
    pub is_primary: bool,
}

/// One applied hit awaiting its follow-up events.
#[derive(Debug, Clone, Copy)]
struct Hit {
    attacker: PetId,
    side: Side,
    target: PetId,
    lost: i32,
}

// =============================================================================
// Outcome and state
// =============================================================================

/// Result of a finished battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// Side `A` has pets left.
    Team1Win,
    /// Side `B` has pets left.
    Team2Win,
    /// Both rosters emptied at once, or the round limit was reached.
    Draw,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team1Win => f.write_str("team 1 wins"),
            Self::Team2Win => f.write_str("team 2 wins"),
            Self::Draw => f.write_str("draw"),
        }
    }
}

/// Lifecycle of a [`Battle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    /// Teams are on the board; start-of-battle abilities have not run.
    NotStarted,
    /// Attack cycles are being played.
    Running,
    /// The battle is over.
    Finished(BattleOutcome),
}

/// Summary of a battle played to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// How the battle ended.
    pub outcome: BattleOutcome,
    /// Attack cycles played.
    pub rounds: u32,
    /// Live pets left on each side, back to front.
    pub survivors: [Vec<Pet>; 2],
    /// Dispatched events, if the config asked for them.
    pub events: Vec<EventRecord>,
}

// =============================================================================
// Battle
// =============================================================================

/// A battle between copies of two teams.
pub struct Battle<'a> {
    engine: Engine<'a>,
    state: BattleState,
    rounds: u32,
}

impl<'a> Battle<'a> {
    /// Copies both teams onto a fresh board.
    ///
    /// The teams themselves are not touched; see [`run_battle`] for the
    /// end-of-battle cleanup on the originals.
    #[must_use]
    pub fn new(defs: &'a Definitions, team_a: &Team, team_b: &Team, config: &'a EngineConfig) -> Self {
        Self {
            engine: Engine::new(defs, config, Board::from_teams(team_a, team_b), None),
            state: BattleState::NotStarted,
            rounds: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> BattleState {
        self.state
    }

    /// Returns the number of attack cycles played.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Returns the board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.engine.board
    }

    /// Returns the events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        self.engine.log.records()
    }

    /// Returns the number of events dispatched so far.
    #[must_use]
    pub fn dispatched(&self) -> usize {
        self.engine.dispatched()
    }

    /// Runs start-of-battle abilities for side `A`, then side `B`, then the
    /// secondary attacks they queued.
    ///
    /// Does nothing once the battle has started.
    ///
    /// # Errors
    ///
    /// Propagates lookup and guard errors from ability resolution.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.state != BattleState::NotStarted {
            return Ok(());
        }
        debug!(board = %self.engine.board, "battle start");
        for side in Side::ALL {
            self.engine
                .dispatch(&EventContext::battle(Trigger::StartOfBattle, side), true)?;
        }
        self.engine.drain_queues()?;
        self.state = BattleState::Running;
        Ok(())
    }

    /// Advances the battle by one attack cycle, starting it if needed.
    ///
    /// # Returns
    ///
    /// The state after the step. Calling `step` on a finished battle returns
    /// the same finished state.
    ///
    /// # Errors
    ///
    /// Propagates lookup and guard errors from ability resolution.
    pub fn step(&mut self) -> EngineResult<BattleState> {
        if let BattleState::Finished(_) = self.state {
            return Ok(self.state);
        }
        self.start()?;

        let board = &self.engine.board;
        let outcome = match (board.roster(Side::A).is_empty(), board.roster(Side::B).is_empty()) {
            (true, true) => Some(BattleOutcome::Draw),
            (false, true) => Some(BattleOutcome::Team1Win),
            (true, false) => Some(BattleOutcome::Team2Win),
            (false, false) => None,
        };
        if let Some(outcome) = outcome {
            debug!(%outcome, rounds = self.rounds, "battle finished");
            self.state = BattleState::Finished(outcome);
            return Ok(self.state);
        }
        if self.rounds >= self.engine.config.max_rounds {
            warn!(rounds = self.rounds, board = %board, "stalemate, calling the battle a draw");
            self.state = BattleState::Finished(BattleOutcome::Draw);
            return Ok(self.state);
        }

        self.rounds += 1;
        debug!(round = self.rounds, board = %self.engine.board, "attack cycle");
        self.engine.attack_cycle()?;
        Ok(self.state)
    }

    /// Plays the battle to completion.
    ///
    /// # Errors
    ///
    /// Propagates lookup and guard errors from ability resolution.
    pub fn run(mut self) -> EngineResult<BattleReport> {
        let outcome = loop {
            if let BattleState::Finished(outcome) = self.step()? {
                break outcome;
            }
        };
        Ok(BattleReport {
            outcome,
            rounds: self.rounds,
            survivors: [
                self.engine.board.roster_pets(Side::A),
                self.engine.board.roster_pets(Side::B),
            ],
            events: self.engine.log.take_events(),
        })
    }
}

/// Battles copies of two teams, then runs end-of-battle cleanup on the originals.
///
/// # Errors
///
/// Returns an [`EngineError`](crate::error::EngineError) for malformed
/// definition data or a runaway resolution. The teams are left untouched in
/// that case.
pub fn run_battle(
    defs: &Definitions,
    team_a: &mut Team,
    team_b: &mut Team,
    config: &EngineConfig,
) -> EngineResult<BattleOutcome> {
    let report = Battle::new(defs, team_a, team_b, config).run()?;
    team_a.end_of_battle();
    team_b.end_of_battle();
    Ok(report.outcome)
}

// =============================================================================
// Attack resolution
// =============================================================================

impl Engine<'_> {
    /// Plays the head-to-head exchange, then drains both queues.
    pub(crate) fn attack_cycle(&mut self) -> EngineResult<()> {
        let primaries = Side::ALL.map(|side| self.primary_attack(side));
        self.play_attack(primaries)?;
        self.drain_queues()
    }

    fn primary_attack(&self, side: Side) -> Option<Attack> {
        let attacker = self.board.front(side)?;
        let target = self.board.front(side.opponent())?;
        Some(Attack {
            attacker,
            side,
            targets: vec![target],
            damage: self.board.pet(attacker)?.attack(),
            is_primary: true,
        })
    }

    /// Plays queued secondary attacks pairwise until both queues are empty.
    pub(crate) fn drain_queues(&mut self) -> EngineResult<()> {
        loop {
            let pair = [self.queues[0].pop_front(), self.queues[1].pop_front()];
            if pair.iter().all(Option::is_none) {
                return Ok(());
            }
            self.play_attack(pair)?;
        }
    }

    /// Plays one attack right away, outside the queues.
    pub(crate) fn play_now(&mut self, attack: Attack) -> EngineResult<()> {
        let mut pair = [None, None];
        let slot = attack.side.index();
        pair[slot] = Some(attack);
        self.play_attack(pair)
    }

    /// Resolves one attack per side simultaneously. Slot 0 is side `A`.
    pub(crate) fn play_attack(&mut self, attacks: [Option<Attack>; 2]) -> EngineResult<()> {
        for attack in attacks.iter().flatten() {
            if attack.is_primary && self.board.is_alive(attack.attacker) && self.any_alive(&attack.targets) {
                let ctx = EventContext::battle(Trigger::BeforeAttack, attack.side).with_source(attack.attacker);
                self.dispatch(&ctx, true)?;
            }
        }

        let attacks: Vec<Attack> = attacks
            .into_iter()
            .flatten()
            .filter(|attack| self.any_alive(&attack.targets))
            .collect();
        let snapshots = Side::ALL.map(|side| self.board.roster(side).to_vec());

        let width = attacks.iter().map(|a| a.targets.len()).max().unwrap_or(0);
        for slot in 0..width {
            let mut hits = Vec::with_capacity(attacks.len());
            for attack in &attacks {
                let Some(&target) = attack.targets.get(slot) else {
                    continue;
                };
                if !self.board.is_alive(target) {
                    continue;
                }
                let damage = self.damage_for(attack, target)?;
                hits.push((attack, target, damage));
            }

            let mut applied = Vec::with_capacity(hits.len());
            for (attack, target, damage) in hits {
                let lost = self.board.pet_mut(target).map_or(0, |pet| pet.take_damage(damage));
                trace!(attacker = %attack.attacker, target = %target, damage, lost, "hit");
                applied.push(Hit {
                    attacker: attack.attacker,
                    side: attack.side,
                    target,
                    lost,
                });
            }
            for hit in applied {
                self.follow_up(hit, &snapshots)?;
            }
        }

        for attack in &attacks {
            if attack.is_primary && self.board.is_alive(attack.attacker) {
                let ctx = EventContext::battle(Trigger::AfterAttack, attack.side).with_source(attack.attacker);
                self.dispatch(&ctx, true)?;
            }
        }
        Ok(())
    }

    fn any_alive(&self, targets: &[PetId]) -> bool {
        targets.iter().any(|id| self.board.is_alive(*id))
    }

    /// Raises `Hurt`, or removes the victim and raises `Faint` and `Knockout`.
    fn follow_up(&mut self, hit: Hit, snapshots: &[Vec<PetId>; 2]) -> EngineResult<()> {
        if hit.lost <= 0 {
            return Ok(());
        }
        let Some(target_side) = self.board.side_of(hit.target) else {
            return Ok(());
        };
        let survived = self.board.pet(hit.target).is_some_and(Pet::is_alive);

        if survived {
            let hurt = EventContext::battle(Trigger::Hurt, target_side)
                .with_source(hit.target)
                .with_snapshot(snapshots[target_side.index()].clone());
            return self.dispatch(&hurt, true);
        }
        if !self.board.remove(hit.target) {
            return Ok(());
        }
        trace!(pet = %hit.target, side = %target_side, "faint");
        let faint = EventContext::battle(Trigger::Faint, target_side)
            .with_source(hit.target)
            .with_snapshot(snapshots[target_side.index()].clone());
        self.dispatch(&faint, true)?;

        let knockout = EventContext::battle(Trigger::Knockout, hit.side)
            .with_source(hit.attacker)
            .with_snapshot(snapshots[hit.side.index()].clone());
        self.dispatch(&knockout, true)
    }

    /// Computes the damage of one hit, consuming single-use statuses.
    fn damage_for(&mut self, attack: &Attack, target: PetId) -> EngineResult<i32> {
        let mut damage = attack.damage;
        let mut lethal = false;

        if attack.is_primary {
            if let Some((modifier, once)) = self.damage_modifier(attack.attacker, Trigger::WhenAttacking)? {
                match modifier {
                    Some(bonus) => damage += bonus,
                    None => lethal = true,
                }
                if once {
                    self.clear_status(attack.attacker);
                }
            }
        }

        if let Some((modifier, once)) = self.damage_modifier(target, Trigger::WhenDamaged)? {
            match modifier {
                Some(reduction) if !lethal => damage -= reduction,
                _ => {
                    damage = 0;
                    lethal = false;
                }
            }
            if once {
                self.clear_status(target);
            }
        }

        if lethal {
            damage = damage.max(MAX_HEALTH);
        }
        Ok(damage.max(0))
    }

    /// Returns the pet's status damage modifier for `trigger`, if any.
    fn damage_modifier(&self, id: PetId, trigger: Trigger) -> EngineResult<Option<(Option<i32>, bool)>> {
        let Some(pet) = self.board.pet(id) else {
            return Ok(None);
        };
        let Some(ability) = self.defs.status_ability(pet)? else {
            return Ok(None);
        };
        if ability.trigger != trigger {
            return Ok(None);
        }
        match ability.effect {
            Effect::ModifyDamage {
                damage_modifier,
                applies_once,
            } => Ok(Some((damage_modifier, applies_once))),
            _ => Ok(None),
        }
    }

    fn clear_status(&mut self, id: PetId) {
        if let Some(pet) = self.board.pet_mut(id) {
            pet.set_status(None);
        }
    }
}
