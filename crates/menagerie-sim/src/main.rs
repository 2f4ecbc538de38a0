//! Menagerie battle runner.
//!
//! Loads pet definitions and named rosters from JSON, then plays one battle
//! or a round robin between every roster and prints the result.
//!
//! ```text
//! menagerie-sim battle swarm bulwark --seed 7 --events
//! menagerie-sim round-robin --seed 7
//! ```
//!
//! Set `RUST_LOG=menagerie_core=debug` to follow a battle round by round.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use menagerie_core::definition::{PetKindId, StatusId};
use menagerie_core::tournament::round_robin;
use menagerie_core::{Battle, Definitions, EngineConfig, Pet, Team};
use serde::Deserialize;
use tracing::info;

/// Menagerie battle runner
#[derive(Parser, Debug)]
#[command(name = "menagerie-sim")]
#[command(about = "Run pet auto-battler battles from JSON definitions")]
struct Args {
    /// Pet, status and food definitions
    #[arg(long, global = true, default_value = "data/definitions.json")]
    definitions: PathBuf,

    /// Named rosters
    #[arg(long, global = true, default_value = "data/teams.json")]
    teams: PathBuf,

    /// Random seed for deterministic runs
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,

    /// Attack cycles before a battle is called a draw
    #[arg(long, global = true, default_value_t = 200)]
    max_rounds: u32,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Battle two rosters
    Battle {
        /// Roster on side A
        first: String,
        /// Roster on side B
        second: String,
        /// Print every dispatched event
        #[arg(long)]
        events: bool,
    },
    /// Battle every pair of rosters once
    RoundRobin,
}

/// One pet in a roster file.
#[derive(Deserialize, Debug)]
struct PetSpec {
    kind: PetKindId,
    level: Option<u8>,
    attack: Option<i32>,
    health: Option<i32>,
    status: Option<StatusId>,
}

/// A named roster, back to front.
#[derive(Deserialize, Debug)]
struct TeamSpec {
    name: String,
    pets: Vec<PetSpec>,
}

impl TeamSpec {
    fn build(&self, defs: &Definitions) -> Result<Team> {
        let mut pets = Vec::with_capacity(self.pets.len());
        for spec in &self.pets {
            let kind = defs
                .pet_kind(&spec.kind)
                .with_context(|| format!("Roster '{}' uses an unknown pet", self.name))?;
            let mut pet = Pet::new(kind).with_level(spec.level.unwrap_or(1));
            if let Some(attack) = spec.attack {
                pet.set_attack(attack);
            }
            if let Some(health) = spec.health {
                pet.set_health(health);
            }
            if let Some(status) = &spec.status {
                defs.status(status)
                    .with_context(|| format!("Roster '{}' uses an unknown status", self.name))?;
                pet = pet.with_status(status.clone());
            }
            pets.push(pet);
        }
        Ok(Team::with_pets(pets))
    }
}

fn load_definitions(path: &Path) -> Result<Definitions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read definitions: {}", path.display()))?;
    Definitions::from_json(&text)
        .with_context(|| format!("Failed to parse definitions: {}", path.display()))
}

fn load_teams(path: &Path) -> Result<Vec<TeamSpec>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rosters: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse rosters: {}", path.display()))
}

fn find<'s>(specs: &'s [TeamSpec], name: &str) -> Result<&'s TeamSpec> {
    match specs.iter().find(|spec| spec.name == name) {
        Some(spec) => Ok(spec),
        None => bail!("No roster named '{name}'"),
    }
}

fn run_one(
    defs: &Definitions,
    specs: &[TeamSpec],
    args: &Args,
    first: &str,
    second: &str,
    events: bool,
) -> Result<()> {
    let config = EngineConfig::default()
        .with_seed(args.seed)
        .with_max_rounds(args.max_rounds);
    let config = if events { config.with_event_log() } else { config };

    let team_a = find(specs, first)?.build(defs)?;
    let team_b = find(specs, second)?.build(defs)?;
    info!(first, second, seed = args.seed, "battle");
    let report = Battle::new(defs, &team_a, &team_b, &config)
        .run()
        .context("Battle aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for record in &report.events {
        let source = record.source.map_or_else(|| "-".to_string(), |id| id.to_string());
        println!(
            "{:indent$}{} on {} from {} -> {:?}",
            "",
            record.trigger,
            record.side,
            source,
            record.notified,
            indent = record.depth * 2
        );
    }
    println!("{first} vs {second}: {} after {} rounds", report.outcome, report.rounds);
    for (name, survivors) in [(first, &report.survivors[0]), (second, &report.survivors[1])] {
        let line: Vec<String> = survivors.iter().map(ToString::to_string).collect();
        println!("  {name}: [{}]", line.join(", "));
    }
    Ok(())
}

fn run_round_robin(defs: &Definitions, specs: &[TeamSpec], args: &Args) -> Result<()> {
    let config = EngineConfig::default()
        .with_seed(args.seed)
        .with_max_rounds(args.max_rounds);
    let teams = specs
        .iter()
        .map(|spec| spec.build(defs))
        .collect::<Result<Vec<_>>>()?;

    let standings = round_robin(defs, &teams, &config).context("Round robin aborted")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&standings)?);
        return Ok(());
    }
    println!("{:<12} {:>3} {:>3} {:>3} {:>4}", "team", "W", "D", "L", "pts");
    for standing in &standings {
        println!(
            "{:<12} {:>3} {:>3} {:>3} {:>4}",
            specs[standing.team].name,
            standing.wins,
            standing.draws,
            standing.losses,
            standing.points()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let defs = load_definitions(&args.definitions)?;
    let specs = load_teams(&args.teams)?;
    info!(pets = defs.pet_kinds().count(), rosters = specs.len(), "loaded");

    match &args.command {
        Command::Battle {
            first,
            second,
            events,
        } => run_one(&defs, &specs, &args, first, second, *events),
        Command::RoundRobin => run_round_robin(&defs, &specs, &args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITIONS: &str = include_str!("../../../data/definitions.json");
    const TEAMS: &str = include_str!("../../../data/teams.json");

    #[test]
    fn sample_rosters_build() {
        let defs = Definitions::from_json(DEFINITIONS).unwrap();
        let specs: Vec<TeamSpec> = serde_json::from_str(TEAMS).unwrap();
        assert!(specs.len() >= 2);
        for spec in &specs {
            let team = spec.build(&defs).unwrap();
            assert_eq!(team.len(), spec.pets.len(), "{}", spec.name);
        }
    }

    #[test]
    fn unknown_pet_is_reported_with_the_roster_name() {
        let defs = Definitions::from_json(DEFINITIONS).unwrap();
        let spec: TeamSpec =
            serde_json::from_str(r#"{"name": "bad", "pets": [{"kind": "pet-unicorn"}]}"#).unwrap();
        let err = spec.build(&defs).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn sample_round_robin_finishes() {
        let defs = Definitions::from_json(DEFINITIONS).unwrap();
        let specs: Vec<TeamSpec> = serde_json::from_str(TEAMS).unwrap();
        let teams: Vec<Team> = specs.iter().map(|spec| spec.build(&defs).unwrap()).collect();
        let standings = round_robin(&defs, &teams, &EngineConfig::default()).unwrap();
        let played: u32 = standings.iter().map(|s| s.wins + s.draws + s.losses).sum();
        assert_eq!(played as usize, teams.len() * (teams.len() - 1));
    }
}
