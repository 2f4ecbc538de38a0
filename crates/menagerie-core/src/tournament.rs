//! Round-robin tournaments.
//!
//! Every pair of teams battles once. Battles are independent, each owning its
//! board and random source, so they run in parallel with `rayon`. Each
//! pairing gets its own seed derived from the master seed and the pair's
//! indices, which keeps the standings reproducible regardless of scheduling.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::battle::{Battle, BattleOutcome};
use crate::config::EngineConfig;
use crate::definition::Definitions;
use crate::error::EngineResult;
use crate::team::Team;

/// Points for a win.
pub const WIN_POINTS: u32 = 3;

/// Points for a draw.
pub const DRAW_POINTS: u32 = 1;

/// One team's record over a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Standing {
    /// Index of the team in the input slice.
    pub team: usize,
    /// Battles won.
    pub wins: u32,
    /// Battles drawn.
    pub draws: u32,
    /// Battles lost.
    pub losses: u32,
}

impl Standing {
    /// Returns the table points: three per win, one per draw.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.wins * WIN_POINTS + self.draws * DRAW_POINTS
    }

    /// Returns the number of battles played.
    #[must_use]
    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// The result of one pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    /// Index of the team on side `A`.
    pub first: usize,
    /// Index of the team on side `B`.
    pub second: usize,
    /// Outcome from the first team's point of view.
    pub outcome: BattleOutcome,
    /// Attack cycles played.
    pub rounds: u32,
}

/// Derives the seed of a pairing from the master seed.
#[must_use]
pub fn pairing_seed(master_seed: u64, first: usize, second: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    master_seed.hash(&mut hasher);
    first.hash(&mut hasher);
    second.hash(&mut hasher);
    hasher.finish()
}

/// Battles every pair of teams once, in parallel.
///
/// The lower-indexed team of each pair fights on side `A`. Results come back
/// ordered by `(first, second)`.
///
/// # Errors
///
/// Returns the first error any battle raised.
pub fn play_pairings(defs: &Definitions, teams: &[Team], config: &EngineConfig) -> EngineResult<Vec<Pairing>> {
    let pairs: Vec<(usize, usize)> = (0..teams.len())
        .flat_map(|first| (first + 1..teams.len()).map(move |second| (first, second)))
        .collect();

    pairs
        .par_iter()
        .map(|&(first, second)| {
            let config = config.clone().with_seed(pairing_seed(config.seed, first, second));
            let report = Battle::new(defs, &teams[first], &teams[second], &config).run()?;
            debug!(first, second, outcome = %report.outcome, rounds = report.rounds, "pairing played");
            Ok(Pairing {
                first,
                second,
                outcome: report.outcome,
                rounds: report.rounds,
            })
        })
        .collect()
}

/// Plays a round robin and returns the standings.
///
/// Standings are sorted by points, highest first, then by team index.
///
/// # Errors
///
/// Returns the first error any battle raised.
///
/// # Example
///
/// ```
/// use menagerie_core::config::EngineConfig;
/// use menagerie_core::definition::Definitions;
/// use menagerie_core::team::Team;
/// use menagerie_core::tournament::round_robin;
///
/// let defs = Definitions::new([], [], []);
/// let teams = vec![Team::new(), Team::new()];
/// let standings = round_robin(&defs, &teams, &EngineConfig::default()).unwrap();
/// assert_eq!(standings[0].draws, 1);
/// ```
pub fn round_robin(defs: &Definitions, teams: &[Team], config: &EngineConfig) -> EngineResult<Vec<Standing>> {
    let pairings = play_pairings(defs, teams, config)?;

    let mut standings: Vec<Standing> = (0..teams.len())
        .map(|team| Standing {
            team,
            ..Standing::default()
        })
        .collect();
    for pairing in &pairings {
        match pairing.outcome {
            BattleOutcome::Team1Win => {
                standings[pairing.first].wins += 1;
                standings[pairing.second].losses += 1;
            }
            BattleOutcome::Team2Win => {
                standings[pairing.first].losses += 1;
                standings[pairing.second].wins += 1;
            }
            BattleOutcome::Draw => {
                standings[pairing.first].draws += 1;
                standings[pairing.second].draws += 1;
            }
        }
    }

    standings.sort_by(|a, b| b.points().cmp(&a.points()).then(a.team.cmp(&b.team)));
    info!(teams = teams.len(), battles = pairings.len(), "round robin finished");
    Ok(standings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn points_weigh_wins_over_draws() {
        let standing = Standing {
            team: 0,
            wins: 2,
            draws: 1,
            losses: 4,
        };
        assert_eq!(standing.points(), 7);
        assert_eq!(standing.played(), 7);
    }

    #[test]
    fn pairing_seeds_depend_on_order_and_master() {
        assert_eq!(pairing_seed(7, 0, 1), pairing_seed(7, 0, 1));
        assert_ne!(pairing_seed(7, 0, 1), pairing_seed(7, 1, 0));
        assert_ne!(pairing_seed(7, 0, 1), pairing_seed(8, 0, 1));
    }

    #[test]
    fn every_pair_plays_once() {
        let defs = catalog();
        let teams: Vec<Team> = ["pet-ant", "pet-fish", "pet-beaver", "pet-pig"]
            .into_iter()
            .map(|id| team(&defs, &[id]))
            .collect();
        let pairings = play_pairings(&defs, &teams, &EngineConfig::default()).unwrap();

        let pairs: Vec<_> = pairings.iter().map(|p| (p.first, p.second)).collect();
        assert_eq!(pairs, [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn stronger_team_tops_the_table() {
        let defs = catalog_with([kind("pet-giant", 50, 50), kind("pet-mouse", 1, 1)]);
        let teams = vec![
            team(&defs, &["pet-mouse"]),
            team(&defs, &["pet-giant"]),
            team(&defs, &["pet-mouse"]),
        ];
        let standings = round_robin(&defs, &teams, &EngineConfig::default()).unwrap();

        assert_eq!(standings[0].team, 1);
        assert_eq!(standings[0].points(), 6);
        // The mice draw each other and are ordered by index.
        assert_eq!((standings[1].team, standings[1].draws), (0, 1));
        assert_eq!((standings[2].team, standings[2].draws), (2, 1));
        assert!(standings.iter().all(|standing| standing.played() == 2));
    }

    #[test]
    fn standings_are_reproducible() {
        let defs = catalog();
        let teams = vec![
            team(&defs, &["pet-ant", "pet-mosquito", "pet-cricket"]),
            team(&defs, &["pet-blowfish", "pet-fish"]),
            team(&defs, &["pet-hedgehog", "pet-sheep"]),
        ];
        let config = EngineConfig::default().with_seed(99);
        assert_eq!(
            play_pairings(&defs, &teams, &config).unwrap(),
            play_pairings(&defs, &teams, &config).unwrap()
        );
    }
}
