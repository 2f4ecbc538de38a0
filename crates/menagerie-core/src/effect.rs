//! Effect interpretation.
//!
//! [`Engine::perform`] executes one [`Effect`] for an actor in the context of
//! the event that triggered it and returns the pets it touched. Effects that
//! create pets or cross an experience threshold dispatch `Summoned` and
//! `LevelUp` themselves; damage effects either play their attack at once or
//! queue it for the current attack cycle.
//!
//! A few pet kinds summon in ways the effect data does not express; those
//! exceptions are listed in one quirk table next to the summon code.

use rand::seq::SliceRandom;
use tracing::trace;

use crate::battle::Attack;
use crate::board::{PetId, Placement, Side};
use crate::context::{EventContext, Phase};
use crate::definition::{Effect, PetKindId, SummonTeam, TargetSelector, Trigger};
use crate::dispatch::Engine;
use crate::error::{EngineError, EngineResult};
use crate::pet::{Pet, MAX_LEVEL};
use crate::targeting;

/// Kind-specific summon behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummonQuirk {
    /// Two copies are summoned.
    Twin,
    /// The summoned pet takes the summoner's attack.
    InheritAttack,
    /// Nothing is summoned when the event's source is of the summoned kind.
    NotFromSameKind,
    /// The pet enters at the back of the line.
    Backline,
}

fn summon_quirk(summoner: Option<&PetKindId>, summoned: &PetKindId, team: SummonTeam) -> Option<SummonQuirk> {
    match (summoner.map(PetKindId::as_str), summoned.as_str(), team) {
        (Some("pet-sheep"), _, SummonTeam::Friendly) => Some(SummonQuirk::Twin),
        (_, "pet-chick", SummonTeam::Friendly) => Some(SummonQuirk::InheritAttack),
        (_, "pet-zombie-fly", SummonTeam::Friendly) => Some(SummonQuirk::NotFromSameKind),
        (Some("pet-rat"), _, SummonTeam::Enemy) => Some(SummonQuirk::Backline),
        _ => None,
    }
}

/// A pet to be summoned, before quirks are applied.
struct SummonRequest<'p> {
    kind: &'p PetKindId,
    team: SummonTeam,
    attack: Option<i32>,
    health: Option<i32>,
    level: Option<u8>,
}

impl Engine<'_> {
    /// Performs an effect and returns the pets it touched.
    ///
    /// `actor` is the pet whose ability is running, or `None` for food.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for undefined kinds or statuses, an empty tier
    /// for random summons, and guard errors from nested dispatch.
    pub(crate) fn perform(
        &mut self,
        actor: Option<PetId>,
        effect: &Effect,
        ctx: &EventContext,
    ) -> EngineResult<Vec<PetId>> {
        match effect {
            Effect::OneOf { effects } => match effects.choose(&mut self.rng) {
                Some(chosen) => self.perform(actor, chosen, ctx),
                None => Ok(Vec::new()),
            },
            Effect::AllOf { effects } => {
                let mut touched = Vec::new();
                for effect in effects {
                    touched.extend(self.perform(actor, effect, ctx)?);
                }
                Ok(touched)
            }
            Effect::ModifyStats {
                attack_amount,
                health_amount,
                target,
                until_end_of_battle,
            } => Ok(self.modify_stats(actor, *attack_amount, *health_amount, target, *until_end_of_battle, ctx)),
            Effect::GainExperience { amount, target } => {
                let targets = self.targets(target, actor, ctx);
                for &id in &targets {
                    self.grant_experience(id, *amount, ctx)?;
                }
                Ok(targets)
            }
            Effect::ApplyStatus { status, target } => {
                self.defs.status(status)?;
                let targets = self.targets(target, actor, ctx);
                for &id in &targets {
                    if let Some(pet) = self.board.pet_mut(id) {
                        pet.set_status(Some(status.clone()));
                    }
                }
                Ok(targets)
            }
            Effect::DealDamage { amount, target } => {
                let Some(attacker) = actor.filter(|_| ctx.is_battle()) else {
                    return Ok(Vec::new());
                };
                let damage = self.board.pet(attacker).map_or(0, |pet| amount.resolve(pet.attack()));
                let targets = self.targets(target, actor, ctx);
                self.launch(attacker, targets.clone(), damage, ctx)?;
                Ok(targets)
            }
            Effect::SplashDamage { amount } => {
                let Some(attacker) = actor.filter(|_| ctx.is_battle()) else {
                    return Ok(Vec::new());
                };
                let Some(side) = self.board.side_of(attacker) else {
                    return Ok(Vec::new());
                };
                let enemies = self.board.roster(side.opponent());
                if enemies.len() < 2 {
                    return Ok(Vec::new());
                }
                let target = enemies[enemies.len() - 2];
                self.enqueue(Attack {
                    attacker,
                    side,
                    targets: vec![target],
                    damage: *amount,
                    is_primary: false,
                });
                Ok(vec![target])
            }
            Effect::ReduceHealth { percentage, target } => {
                let targets = self.targets(target, actor, ctx);
                for &id in &targets {
                    if let Some(pet) = self.board.pet_mut(id) {
                        let health = pet.health();
                        let cut = (health * percentage / 100).min(health - 1).max(0);
                        pet.set_health(health - cut);
                    }
                }
                Ok(targets)
            }
            Effect::SummonPet {
                pet,
                team,
                with_attack,
                with_health,
            } => self.summon(
                actor,
                &SummonRequest {
                    kind: pet,
                    team: *team,
                    attack: *with_attack,
                    health: *with_health,
                    level: None,
                },
                ctx,
            ),
            Effect::SummonRandomPet {
                tier,
                base_attack,
                base_health,
                level,
            } => {
                let defs = self.defs;
                let candidates = defs.pet_kinds_in_tier(*tier);
                let kind = candidates
                    .choose(&mut self.rng)
                    .ok_or(EngineError::EmptyTier(*tier))?;
                self.summon(
                    actor,
                    &SummonRequest {
                        kind: &kind.id,
                        team: SummonTeam::Friendly,
                        attack: *base_attack,
                        health: *base_health,
                        level: *level,
                    },
                    ctx,
                )
            }
            Effect::RespawnPet {
                base_attack,
                base_health,
            } => {
                let Some((kind, level)) = actor
                    .and_then(|id| self.board.pet(id))
                    .map(|pet| (pet.kind().clone(), pet.level()))
                else {
                    return Ok(Vec::new());
                };
                self.summon(
                    actor,
                    &SummonRequest {
                        kind: &kind,
                        team: SummonTeam::Friendly,
                        attack: Some(*base_attack),
                        health: Some(*base_health),
                        level: Some(level),
                    },
                    ctx,
                )
            }
            Effect::TransferStats {
                from,
                to,
                copy_attack,
                copy_health,
            } => {
                let Some(donor) = self.targets(from, actor, ctx).first().copied() else {
                    return Ok(Vec::new());
                };
                let Some((attack, health)) = self.board.pet(donor).map(|pet| (pet.attack(), pet.health())) else {
                    return Ok(Vec::new());
                };
                let targets = self.targets(to, actor, ctx);
                for &id in &targets {
                    if let Some(pet) = self.board.pet_mut(id) {
                        if *copy_attack {
                            pet.set_attack(attack);
                        }
                        if *copy_health {
                            pet.set_health(health);
                        }
                    }
                }
                Ok(targets)
            }
            Effect::TransferAbility { from, to, level } => {
                let Some(donor) = self.targets(from, actor, ctx).first().copied() else {
                    return Ok(Vec::new());
                };
                let Some((kind, donor_level)) = self
                    .board
                    .pet(donor)
                    .map(|pet| (pet.ability_kind().clone(), pet.ability_level()))
                else {
                    return Ok(Vec::new());
                };
                let targets = self.targets(to, actor, ctx);
                for &id in &targets {
                    if let Some(pet) = self.board.pet_mut(id) {
                        pet.borrow_ability(kind.clone(), level.unwrap_or(donor_level));
                    }
                }
                Ok(targets)
            }
            Effect::GainGold { amount } => {
                if let Some(shop) = self.shop.as_deref_mut() {
                    shop.add_gold(*amount);
                }
                Ok(Vec::new())
            }
            Effect::Evolve { into } => {
                let defs = self.defs;
                let kind = defs.pet_kind(into)?;
                let Some(id) = actor else {
                    return Ok(Vec::new());
                };
                Ok(self.board.replace(id, Pet::new(kind)).into_iter().collect())
            }
            Effect::RepeatAbility { target, level } => self.repeat_ability(actor, target, *level, ctx),
            Effect::ModifyDamage { .. } => Ok(Vec::new()),
        }
    }

    fn targets(&mut self, selector: &TargetSelector, actor: Option<PetId>, ctx: &EventContext) -> Vec<PetId> {
        targeting::resolve(selector, actor, ctx, &self.board, &mut self.rng)
    }

    fn modify_stats(
        &mut self,
        actor: Option<PetId>,
        attack: i32,
        health: i32,
        target: &TargetSelector,
        until_end_of_battle: bool,
        ctx: &EventContext,
    ) -> Vec<PetId> {
        if let TargetSelector::EachShopAnimal { including_future } = target {
            if let (Phase::Purchase { .. }, Some(shop)) = (&ctx.phase, self.shop.as_deref_mut()) {
                if *including_future {
                    shop.buff_all_current_and_future(attack, health);
                } else {
                    shop.buff_current(attack, health);
                }
            }
            return Vec::new();
        }
        let targets = self.targets(target, actor, ctx);
        for &id in &targets {
            if let Some(pet) = self.board.pet_mut(id) {
                pet.buff(attack, health, until_end_of_battle);
            }
        }
        targets
    }

    /// Grants experience one unit at a time, announcing each level up before
    /// it takes effect. Returns the units consumed.
    fn grant_experience(&mut self, id: PetId, amount: u32, ctx: &EventContext) -> EngineResult<u32> {
        let Some(side) = self.board.side_of(id) else {
            return Ok(0);
        };
        for consumed in 1..=amount {
            let Some(pet) = self.board.pet_mut(id) else {
                return Ok(consumed - 1);
            };
            if pet.level() >= MAX_LEVEL {
                return Ok(consumed - 1);
            }
            let Some(level) = pet.gain_experience_point() else {
                continue;
            };
            self.dispatch(&ctx.follow_up(Trigger::LevelUp, side, id), true)?;
            if let Some(pet) = self.board.pet_mut(id) {
                pet.promote(level);
            }
            if level >= MAX_LEVEL {
                return Ok(consumed);
            }
        }
        Ok(amount)
    }

    /// Plays ability damage now before attacks and at battle start, or
    /// queues it for the current cycle.
    fn launch(&mut self, attacker: PetId, targets: Vec<PetId>, damage: i32, ctx: &EventContext) -> EngineResult<()> {
        let Some(side) = self.board.side_of(attacker) else {
            return Ok(());
        };
        if targets.is_empty() {
            return Ok(());
        }
        let attack = Attack {
            attacker,
            side,
            targets,
            damage,
            is_primary: false,
        };
        if matches!(ctx.trigger, Trigger::BeforeAttack | Trigger::StartOfBattle) {
            self.play_now(attack)
        } else {
            self.enqueue(attack);
            Ok(())
        }
    }

    fn enqueue(&mut self, attack: Attack) {
        trace!(attacker = %attack.attacker, side = %attack.side, damage = attack.damage, "queued attack");
        self.queues[attack.side.index()].push_back(attack);
    }

    fn summon(&mut self, actor: Option<PetId>, request: &SummonRequest<'_>, ctx: &EventContext) -> EngineResult<Vec<PetId>> {
        let defs = self.defs;
        let definition = defs.pet_kind(request.kind)?;
        let summoner = actor.and_then(|id| self.board.pet(id));
        let summoner_kind = summoner.map(|pet| pet.kind().clone());
        let summoner_attack = summoner.map(Pet::attack);
        let home = actor.and_then(|id| self.board.side_of(id)).unwrap_or(ctx.side);
        let side = summon_side(home, request.team);

        let mut pet = Pet::new(definition);
        if let Some(level) = request.level {
            pet = pet.with_level(level);
        }
        if let Some(attack) = request.attack {
            pet.set_attack(attack);
        }
        if let Some(health) = request.health {
            pet.set_health(health);
        }

        let mut copies = 1;
        let mut placement = Placement::Front;
        match summon_quirk(summoner_kind.as_ref(), request.kind, request.team) {
            Some(SummonQuirk::Twin) => copies = 2,
            Some(SummonQuirk::InheritAttack) => {
                if let Some(attack) = summoner_attack {
                    pet.set_attack(attack);
                }
            }
            Some(SummonQuirk::NotFromSameKind) => {
                let source_kind = ctx.source.and_then(|id| self.board.pet(id)).map(Pet::kind);
                if source_kind == Some(request.kind) {
                    return Ok(Vec::new());
                }
            }
            Some(SummonQuirk::Backline) => placement = Placement::Back,
            None => {}
        }

        let mut summoned = Vec::with_capacity(copies);
        for _ in 0..copies {
            if let Some(id) = self.board.spawn(side, pet.clone(), placement) {
                trace!(pet = %id, kind = %request.kind, side = %side, "summoned");
                summoned.push(id);
            }
        }
        for &id in &summoned {
            self.dispatch(&ctx.follow_up(Trigger::Summoned, side, id), true)?;
        }
        Ok(summoned)
    }

    /// Makes each target perform the caster's ability against the caster's
    /// original event.
    fn repeat_ability(
        &mut self,
        actor: Option<PetId>,
        target: &TargetSelector,
        level: Option<u8>,
        ctx: &EventContext,
    ) -> EngineResult<Vec<PetId>> {
        let (Some(caster), Some(cause)) = (ctx.source, ctx.cause.as_deref()) else {
            return Ok(Vec::new());
        };
        let defs = self.defs;
        let Some(pet) = self.board.pet(caster) else {
            return Ok(Vec::new());
        };
        let kind = defs.pet_kind(pet.ability_kind())?;
        let Some(ability) = kind.ability(level.unwrap_or(pet.ability_level())) else {
            return Ok(Vec::new());
        };

        let targets = self.targets(target, actor, ctx);
        for &id in &targets {
            self.perform(Some(id), &ability.effect, cause)?;
        }
        Ok(targets)
    }
}

fn summon_side(home: Side, team: SummonTeam) -> Side {
    match team {
        SummonTeam::Friendly => home,
        SummonTeam::Enemy => home.opponent(),
    }
}
