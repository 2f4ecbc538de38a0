//! The shop collaborator and purchase-phase resolution.
//!
//! The engine never rolls or prices a shop. It only talks to one through the
//! [`Shop`] trait: `ModifyStats` on `EachShopAnimal` buffs the stocked pets
//! and `GainGold` pays out. [`ShopState`] is the in-memory implementation
//! used by the simulator and the tests.
//!
//! [`PurchasePhase`] resolves shop-turn events (buying, feeding, selling and
//! ending the turn) through the same dispatcher as battles, with a
//! purchase-phase [`EventContext`]. Every operation writes the resulting
//! roster back into the team, so the team is always current.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, PetId, Placement, Side};
use crate::config::EngineConfig;
use crate::context::EventContext;
use crate::definition::{Definitions, FoodId, Trigger};
use crate::dispatch::Engine;
use crate::error::{EngineError, EngineResult};
use crate::event_log::EventRecord;
use crate::pet::{Pet, StatBuff, MAX_LEVEL};
use crate::team::Team;

/// Gold a fresh shop starts the turn with.
pub const STARTING_GOLD: i32 = 10;

// =============================================================================
// Shop collaborator
// =============================================================================

/// What the engine may do to a shop.
pub trait Shop {
    /// Buffs every stocked pet and every pet stocked later this game.
    fn buff_all_current_and_future(&mut self, attack: i32, health: i32);

    /// Buffs the pets currently stocked.
    fn buff_current(&mut self, attack: i32, health: i32);

    /// Adds gold. Negative amounts spend it.
    fn add_gold(&mut self, amount: i32);

    /// Returns the gold balance.
    fn gold(&self) -> i32;
}

/// A shop holding gold, stocked pets and pending buffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopState {
    gold: i32,
    pets: Vec<Pet>,
    future_buffs: Vec<StatBuff>,
}

impl ShopState {
    /// Creates an empty shop with `gold`.
    #[must_use]
    pub fn new(gold: i32) -> Self {
        Self {
            gold,
            pets: Vec::new(),
            future_buffs: Vec::new(),
        }
    }

    /// Creates a shop for a team's turn, carrying over the team's pending
    /// shop buffs.
    #[must_use]
    pub fn for_team(team: &Team, gold: i32) -> Self {
        Self {
            future_buffs: team.shop_buffs().to_vec(),
            ..Self::new(gold)
        }
    }

    /// Stocks a pet, applying every pending buff to it.
    pub fn stock(&mut self, mut pet: Pet) {
        for buff in &self.future_buffs {
            pet.buff(buff.attack, buff.health, false);
        }
        self.pets.push(pet);
    }

    /// Removes a stocked pet.
    pub fn take(&mut self, index: usize) -> Option<Pet> {
        (index < self.pets.len()).then(|| self.pets.remove(index))
    }

    /// Returns the stocked pets.
    #[must_use]
    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    /// Returns the buffs applied to every pet stocked from now on.
    #[must_use]
    pub fn future_buffs(&self) -> &[StatBuff] {
        &self.future_buffs
    }
}

impl Default for ShopState {
    fn default() -> Self {
        Self::new(STARTING_GOLD)
    }
}

impl Shop for ShopState {
    fn buff_all_current_and_future(&mut self, attack: i32, health: i32) {
        self.buff_current(attack, health);
        self.future_buffs.push(StatBuff { attack, health });
    }

    fn buff_current(&mut self, attack: i32, health: i32) {
        for pet in &mut self.pets {
            pet.buff(attack, health, false);
        }
    }

    fn add_gold(&mut self, amount: i32) {
        self.gold += amount;
    }

    fn gold(&self) -> i32 {
        self.gold
    }
}

// =============================================================================
// Purchase phase
// =============================================================================

/// Resolves shop-turn events for one team.
///
/// The team is mirrored onto side `A` of a board for the duration of the
/// phase; side `B` stays empty.
///
/// # Example
///
/// ```
/// use menagerie_core::config::EngineConfig;
/// use menagerie_core::definition::{Definitions, Trigger};
/// use menagerie_core::shop::{PurchasePhase, ShopState};
/// use menagerie_core::team::Team;
///
/// let defs = Definitions::new([], [], []);
/// let config = EngineConfig::default();
/// let mut team = Team::new();
/// let mut shop = ShopState::default();
///
/// let mut phase = PurchasePhase::new(&defs, &mut team, &mut shop, &config);
/// phase.trigger(Trigger::StartOfTurn, None).unwrap();
/// phase.end_turn().unwrap();
/// ```
pub struct PurchasePhase<'a> {
    engine: Engine<'a>,
    team: &'a mut Team,
}

impl<'a> PurchasePhase<'a> {
    /// Opens a purchase phase over a team and a shop.
    pub fn new(
        defs: &'a Definitions,
        team: &'a mut Team,
        shop: &'a mut dyn Shop,
        config: &'a EngineConfig,
    ) -> Self {
        let board = Board::from_team(team);
        Self {
            engine: Engine::new(defs, config, board, Some(shop)),
            team,
        }
    }

    /// Returns the board the phase resolves on.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.engine.board
    }

    /// Returns the events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        self.engine.log.records()
    }

    /// Dispatches a purchase-phase event to the team.
    ///
    /// # Arguments
    ///
    /// * `trigger` - The event to raise
    /// * `source` - Roster index of the pet causing it, if any
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RosterIndex`] for a bad index, or any error
    /// raised while the event resolves.
    pub fn trigger(&mut self, trigger: Trigger, source: Option<usize>) -> EngineResult<()> {
        let mut ctx = EventContext::purchase(trigger);
        if let Some(index) = source {
            ctx = ctx.with_source(self.pet_at(index)?);
        }
        self.engine.dispatch(&ctx, true)?;
        self.commit();
        Ok(())
    }

    /// Places a bought pet on the team and announces it.
    ///
    /// Fires "Buy", then "BuyTier1Animal" for `tier_one` pets and
    /// "BuyAfterLoss" when `after_loss` is set, then "Summoned".
    ///
    /// # Returns
    ///
    /// The pet's roster index, or `None` if the team is full.
    ///
    /// # Errors
    ///
    /// Returns any error raised while the events resolve.
    pub fn place_pet(
        &mut self,
        pet: Pet,
        index: Option<usize>,
        tier_one: bool,
        after_loss: bool,
    ) -> EngineResult<Option<usize>> {
        let placement = index.map_or(Placement::Front, Placement::At);
        let Some(id) = self.engine.board.spawn(Side::A, pet, placement) else {
            return Ok(None);
        };
        debug!(pet = %id, "placed pet");

        let mut triggers = vec![Trigger::Buy];
        if tier_one {
            triggers.push(Trigger::BuyTier1Animal);
        }
        if after_loss {
            triggers.push(Trigger::BuyAfterLoss);
        }
        triggers.push(Trigger::Summoned);
        for trigger in triggers {
            let ctx = EventContext::purchase(trigger).with_source(id);
            self.engine.dispatch(&ctx, true)?;
        }

        self.commit();
        Ok(self.engine.board.position(id))
    }

    /// Feeds a food to the pet at `target`.
    ///
    /// Runs the food's ability with the pet as purchase target, then raises
    /// "EatsShopFood" for every pet the food affected.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownFood`] for an undefined food,
    /// [`EngineError::RosterIndex`] for a bad index, or any error raised
    /// while the food resolves.
    pub fn feed(&mut self, food: &FoodId, target: usize) -> EngineResult<Vec<PetId>> {
        let defs = self.engine.defs;
        let definition = defs.food(food)?;
        let id = self.pet_at(target)?;
        debug!(food = %food, pet = %id, "feeding");

        let ctx = EventContext::purchase(definition.ability.trigger).with_purchase(id, food.clone());
        let affected = self.engine.perform(None, &definition.ability.effect, &ctx)?;
        for &pet in &affected {
            self.engine
                .dispatch(&ctx.follow_up(Trigger::EatsShopFood, Side::A, pet), true)?;
        }

        self.commit();
        Ok(affected)
    }

    /// Sells the pet at `index` for gold equal to its level.
    ///
    /// The sold pet is the source of the "Sell" event and still hears it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RosterIndex`] for a bad index, or any error
    /// raised while the event resolves.
    pub fn sell(&mut self, index: usize) -> EngineResult<Pet> {
        let id = self.pet_at(index)?;
        let snapshot = self.engine.board.roster(Side::A).to_vec();
        self.engine.board.remove(id);

        let sold = self.engine.board.pet(id).cloned().ok_or(EngineError::RosterIndex {
            index,
            len: snapshot.len(),
        })?;
        if let Some(shop) = self.engine.shop.as_deref_mut() {
            shop.add_gold(i32::from(sold.level()));
        }
        debug!(pet = %id, gold = i32::from(sold.level()), "sold pet");

        let ctx = EventContext::purchase(Trigger::Sell)
            .with_source(id)
            .with_snapshot(snapshot);
        self.engine.dispatch(&ctx, true)?;

        self.commit();
        Ok(sold)
    }

    /// Ends the turn.
    ///
    /// Raises "EndOfTurn", then each conditional end-of-turn event whose
    /// condition holds once the previous events resolved.
    ///
    /// # Errors
    ///
    /// Returns any error raised while the events resolve.
    pub fn end_turn(&mut self) -> EngineResult<()> {
        self.engine.dispatch(&EventContext::purchase(Trigger::EndOfTurn), true)?;

        let conditional = [
            Trigger::EndOfTurnWith3PlusGold,
            Trigger::EndOfTurnWith2PlusGold,
            Trigger::EndOfTurnWith4OrLessAnimals,
            Trigger::EndOfTurnWithLvl3Friend,
        ];
        for trigger in conditional {
            if self.holds(trigger) {
                self.engine.dispatch(&EventContext::purchase(trigger), true)?;
            }
        }

        self.commit();
        Ok(())
    }

    fn holds(&self, trigger: Trigger) -> bool {
        let gold = self.engine.shop.as_deref().map_or(0, |shop| shop.gold());
        let board = &self.engine.board;
        match trigger {
            Trigger::EndOfTurnWith3PlusGold => gold >= 3,
            Trigger::EndOfTurnWith2PlusGold => gold >= 2,
            Trigger::EndOfTurnWith4OrLessAnimals => board.roster(Side::A).len() <= 4,
            Trigger::EndOfTurnWithLvl3Friend => board.live_pets(Side::A).any(|pet| pet.level() >= MAX_LEVEL),
            _ => false,
        }
    }

    fn pet_at(&self, index: usize) -> EngineResult<PetId> {
        let roster = self.engine.board.roster(Side::A);
        roster.get(index).copied().ok_or(EngineError::RosterIndex {
            index,
            len: roster.len(),
        })
    }

    fn commit(&mut self) {
        self.team.replace_pets(self.engine.board.roster_pets(Side::A));
    }
}
