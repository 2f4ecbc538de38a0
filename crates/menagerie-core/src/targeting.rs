//! Target resolution.
//!
//! [`resolve`] turns a [`TargetSelector`] into the ordered list of pets an
//! effect applies to. It reads the board and may draw from the random
//! source, but never changes a pet.
//!
//! # Pools
//!
//! The friend side is the actor's side, or the context's side when the
//! effect has no actor (food abilities). The friend pool never contains the
//! actor itself; the enemy pool is the opposing roster. Both are in roster
//! order, back to front.
//!
//! # Positional selectors
//!
//! Selectors relative to the actor (`AdjacentFriends`, `FriendBehind`,
//! `FriendAhead`, `AdjacentAnimals`) read the line from the context's
//! snapshot when it covers the actor, so that a fainted actor still finds
//! its former neighbors. From the snapshot only pets that are still alive,
//! the actor and the context's source are kept.

use std::collections::BTreeSet;

use rand::seq::index::sample;
use rand::Rng;

use crate::board::{Board, PetId, Side};
use crate::context::EventContext;
use crate::definition::TargetSelector;

/// Resolves a selector to the pets it designates.
///
/// Returns an empty list when nothing matches; resolution never fails.
///
/// # Arguments
///
/// * `selector` - The rule to apply
/// * `actor` - The pet performing the effect, if any
/// * `ctx` - The event being reacted to
/// * `board` - The board to read
/// * `rng` - Random source for sampling selectors
pub fn resolve(
    selector: &TargetSelector,
    actor: Option<PetId>,
    ctx: &EventContext,
    board: &Board,
    rng: &mut impl Rng,
) -> Vec<PetId> {
    let side = actor.and_then(|id| board.side_of(id)).unwrap_or(ctx.side);
    let enemies = board.roster(side.opponent());
    let friends = || {
        board
            .roster(side)
            .iter()
            .copied()
            .filter(move |id| Some(*id) != actor)
    };

    match selector {
        TargetSelector::SelfPet => actor.into_iter().collect(),
        TargetSelector::TriggeringEntity => ctx.source.into_iter().collect(),
        TargetSelector::PurchaseTarget => ctx.purchase_target().into_iter().collect(),
        TargetSelector::RandomFriend { n } => pick(&friends().collect::<Vec<_>>(), *n, rng),
        TargetSelector::RandomEnemy { n } => pick(enemies, *n, rng),
        TargetSelector::EachFriend => friends().collect(),
        TargetSelector::EachEnemy => enemies.to_vec(),
        TargetSelector::All => friends().chain(enemies.iter().copied()).collect(),
        TargetSelector::Level2And3Friends => friends()
            .filter(|id| board.pet(*id).is_some_and(|pet| pet.level() >= 2))
            .collect(),
        TargetSelector::DifferentTierAnimals => {
            let mut tiers = BTreeSet::new();
            board
                .roster(side)
                .iter()
                .copied()
                .filter(|id| board.pet(*id).is_some_and(|pet| tiers.insert(pet.tier())))
                .collect()
        }
        TargetSelector::AdjacentFriends => {
            let mut targets = behind(actor, 1, ctx, board, side);
            targets.extend(ahead(actor, 1, ctx, board, side));
            targets
        }
        TargetSelector::LeftMostFriend => board.roster(side).first().copied().into_iter().collect(),
        TargetSelector::RightMostFriend => board.roster(side).last().copied().into_iter().collect(),
        TargetSelector::FirstEnemy => enemies.last().copied().into_iter().collect(),
        TargetSelector::LastEnemy => enemies.first().copied().into_iter().collect(),
        TargetSelector::LowestHealthEnemy => extreme_health(enemies, board, |a, b| a < b),
        TargetSelector::HighestHealthEnemy => extreme_health(enemies, board, |a, b| a > b),
        TargetSelector::FriendBehind { n } => behind(actor, *n, ctx, board, side),
        TargetSelector::FriendAhead { n } => ahead(actor, *n, ctx, board, side),
        TargetSelector::AdjacentAnimals => {
            let mut targets: Vec<_> = enemies.last().copied().into_iter().collect();
            targets.extend(behind(actor, 1, ctx, board, side));
            targets
        }
        TargetSelector::StrongestFriend => {
            let mut best: Option<(PetId, i32)> = None;
            for id in friends() {
                let Some(pet) = board.pet(id) else { continue };
                let strength = pet.attack() + pet.health();
                if best.map_or(true, |(_, top)| strength > top) {
                    best = Some((id, strength));
                }
            }
            best.map(|(id, _)| id).into_iter().collect()
        }
        TargetSelector::EachShopAnimal { .. } => Vec::new(),
    }
}

/// Samples up to `n` distinct pets from `pool`.
fn pick(pool: &[PetId], n: usize, rng: &mut impl Rng) -> Vec<PetId> {
    let amount = n.min(pool.len());
    if amount == 0 {
        return Vec::new();
    }
    sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// Returns the first pet whose health beats every earlier one under `better`.
fn extreme_health(pool: &[PetId], board: &Board, better: impl Fn(i32, i32) -> bool) -> Vec<PetId> {
    let mut best: Option<(PetId, i32)> = None;
    for &id in pool {
        let Some(pet) = board.pet(id) else { continue };
        if best.map_or(true, |(_, health)| better(pet.health(), health)) {
            best = Some((id, pet.health()));
        }
    }
    best.map(|(id, _)| id).into_iter().collect()
}

/// The actor's line and its index in it.
fn line_of(actor: PetId, ctx: &EventContext, board: &Board, side: Side) -> Option<(Vec<PetId>, usize)> {
    let snapshot = ctx
        .snapshot
        .as_ref()
        .filter(|snapshot| ctx.side == side && snapshot.contains(&actor));
    let line: Vec<PetId> = match snapshot {
        Some(snapshot) => snapshot
            .iter()
            .copied()
            .filter(|id| *id == actor || board.is_alive(*id) || ctx.source == Some(*id))
            .collect(),
        None => board.roster(side).to_vec(),
    };
    let index = line.iter().position(|id| *id == actor)?;
    Some((line, index))
}

/// Up to `n` pets behind the actor, nearest first.
fn behind(actor: Option<PetId>, n: usize, ctx: &EventContext, board: &Board, side: Side) -> Vec<PetId> {
    let Some((line, index)) = actor.and_then(|actor| line_of(actor, ctx, board, side)) else {
        return Vec::new();
    };
    line[..index].iter().rev().take(n).copied().collect()
}

/// Up to `n` pets ahead of the actor, nearest first.
fn ahead(actor: Option<PetId>, n: usize, ctx: &EventContext, board: &Board, side: Side) -> Vec<PetId> {
    let Some((line, index)) = actor.and_then(|actor| line_of(actor, ctx, board, side)) else {
        return Vec::new();
    };
    line[index + 1..].iter().take(n).copied().collect()
}
