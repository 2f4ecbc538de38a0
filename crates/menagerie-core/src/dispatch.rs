//! Trigger dispatch and the resolution state it runs on.
//!
//! [`Engine`] bundles everything one battle or purchase phase mutates: the
//! [`Board`], the seeded random source, the secondary-attack queues, the
//! optional shop collaborator and the event log. Dispatch, effects and the
//! attack pipeline are all `impl Engine` blocks spread over their own
//! modules.
//!
//! # Dispatch order
//!
//! An event walks the context's roster snapshot, or a copy of the live
//! roster of the notified side. For each pet the level ability is checked
//! before the status ability. Effects may raise further events, which are
//! dispatched depth-first before the walk continues.
//!
//! # Guards
//!
//! Every dispatch counts against [`EngineConfig::max_dispatch_depth`] while
//! it is on the stack and against [`EngineConfig::max_events`] for the whole
//! resolution. Crossing either aborts with an [`EngineError`].

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::battle::Attack;
use crate::board::{Board, PetId};
use crate::config::EngineConfig;
use crate::context::EventContext;
use crate::definition::{AbilityDefinition, Definitions, Effect, Trigger, TriggeredBy};
use crate::error::{EngineError, EngineResult};
use crate::event_log::{EventLog, EventRecord};
use crate::shop::Shop;

/// Mutable state of one resolution.
pub(crate) struct Engine<'a> {
    pub(crate) defs: &'a Definitions,
    pub(crate) config: &'a EngineConfig,
    pub(crate) board: Board,
    pub(crate) rng: ChaCha8Rng,
    /// Secondary attacks waiting to be played, one FIFO per side.
    pub(crate) queues: [VecDeque<Attack>; 2],
    pub(crate) shop: Option<&'a mut dyn Shop>,
    pub(crate) log: EventLog,
    depth: usize,
    dispatched: usize,
}

impl<'a> Engine<'a> {
    /// Creates the state for a resolution seeded from `config.seed`.
    pub(crate) fn new(
        defs: &'a Definitions,
        config: &'a EngineConfig,
        board: Board,
        shop: Option<&'a mut dyn Shop>,
    ) -> Self {
        Self {
            defs,
            config,
            board,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            queues: [VecDeque::new(), VecDeque::new()],
            shop,
            log: EventLog::new(config.record_events),
            depth: 0,
            dispatched: 0,
        }
    }
}

impl Engine<'_> {
    /// Returns the number of events dispatched so far.
    pub(crate) fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Broadcasts an event to the notified side.
    ///
    /// # Errors
    ///
    /// Returns a guard error if the nesting limit or event budget is
    /// exceeded, or a lookup error from any effect performed.
    pub(crate) fn dispatch(&mut self, ctx: &EventContext, include_source: bool) -> EngineResult<()> {
        if self.depth >= self.config.max_dispatch_depth {
            return Err(EngineError::DispatchDepthExceeded {
                trigger: ctx.trigger,
                limit: self.config.max_dispatch_depth,
            });
        }
        self.dispatched += 1;
        if self.dispatched > self.config.max_events {
            return Err(EngineError::EventBudgetExceeded {
                limit: self.config.max_events,
            });
        }

        self.depth += 1;
        let result = self.notify_all(ctx, include_source);
        self.depth -= 1;
        result
    }

    fn notify_all(&mut self, ctx: &EventContext, include_source: bool) -> EngineResult<()> {
        let order = ctx
            .snapshot
            .clone()
            .unwrap_or_else(|| self.board.roster(ctx.side).to_vec());
        trace!(
            trigger = %ctx.trigger,
            side = %ctx.side,
            source = ?ctx.source,
            depth = self.depth,
            "dispatch"
        );
        let slot = self.log.open(EventRecord {
            trigger: ctx.trigger,
            side: ctx.side,
            source: ctx.source,
            notified: Vec::new(),
            depth: self.depth,
        });

        let index = self.defs.trigger_index();
        let mut notified = Vec::new();
        for &id in &order {
            let is_source = ctx.source == Some(id);
            if is_source && !include_source {
                continue;
            }
            if !is_source && !self.board.is_alive(id) {
                continue;
            }
            let Some(pet) = self.board.pet(id) else {
                continue;
            };
            if !index.may_react(ctx.trigger, pet) {
                continue;
            }
            notified.push(id);
            self.notify(id, ctx, &order)?;
        }

        if let Some(slot) = slot {
            self.log.set_notified(slot, notified);
        }
        Ok(())
    }

    /// Runs the pet's level ability, then its status ability, if they react.
    fn notify(&mut self, id: PetId, ctx: &EventContext, order: &[PetId]) -> EngineResult<()> {
        let defs = self.defs;
        let Some(pet) = self.board.pet(id) else {
            return Ok(());
        };
        let level_ability = defs.level_ability(pet)?;
        let status_ability = defs.status_ability(pet)?;

        if let Some(ability) = level_ability {
            if self.should_fire(id, ability, "ability", ctx, order) {
                self.perform(Some(id), &ability.effect, ctx)?;
                self.announce_cast(id, &ability.effect, ctx)?;
            }
        }
        if let Some(ability) = status_ability {
            if self.should_fire(id, ability, "status", ctx, order) {
                self.perform(Some(id), &ability.effect, ctx)?;
            }
        }
        Ok(())
    }

    /// Checks trigger, predicate and trigger cap, counting the firing.
    fn should_fire(
        &mut self,
        id: PetId,
        ability: &AbilityDefinition,
        holder: &str,
        ctx: &EventContext,
        order: &[PetId],
    ) -> bool {
        if ability.trigger != ctx.trigger || !predicate_holds(ability.triggered_by, id, ctx, order) {
            return false;
        }
        let Some(max) = ability.max_triggers else {
            return true;
        };
        let Some(pet) = self.board.pet_mut(id) else {
            return false;
        };
        let key = format!("{holder}:{}", ability.trigger);
        if pet.transient(&key) >= i64::from(max) {
            return false;
        }
        pet.bump_transient(&key);
        true
    }

    /// Raises `CastsAbility` after a pet's own ability resolved in battle.
    ///
    /// Repeats, and abilities answering a cast, are not announced.
    fn announce_cast(&mut self, caster: PetId, effect: &Effect, ctx: &EventContext) -> EngineResult<()> {
        if !ctx.is_battle()
            || ctx.repeated
            || ctx.trigger == Trigger::CastsAbility
            || matches!(effect, Effect::RepeatAbility { .. })
        {
            return Ok(());
        }
        let Some(side) = self.board.side_of(caster) else {
            return Ok(());
        };
        let cause = EventContext {
            repeated: true,
            cause: None,
            ..ctx.clone()
        };
        let cast = EventContext {
            trigger: Trigger::CastsAbility,
            source: Some(caster),
            side,
            snapshot: ctx.snapshot.clone().filter(|_| ctx.side == side),
            phase: ctx.phase.clone(),
            repeated: false,
            cause: Some(Box::new(cause)),
        };
        self.dispatch(&cast, true)
    }
}

/// Returns true if `pet` may react to an event caused by `ctx.source`.
fn predicate_holds(triggered_by: TriggeredBy, pet: PetId, ctx: &EventContext, order: &[PetId]) -> bool {
    match triggered_by {
        TriggeredBy::Player => true,
        TriggeredBy::SelfPet => ctx.source == Some(pet),
        TriggeredBy::EachFriend => ctx.source != Some(pet),
        TriggeredBy::FriendAhead => ctx
            .source
            .and_then(|source| order.iter().position(|id| *id == source))
            .is_some_and(|index| index > 0 && order[index - 1] == pet),
    }
}
