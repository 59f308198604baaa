#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Cavern Skirmish combats from grid files.

mod config;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use cavern_skirmish_core::{CombatReport, Faction};
use cavern_skirmish_system_combat::{calibrate_elf_attack_power, run_combat};
use clap::{Args, Parser, Subcommand};
use config::{CalibrationOverrides, CombatOverrides, FileConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Simulates Elf and Goblin skirmishes inside a cavern map.
#[derive(Debug, Parser)]
#[command(name = "cavern-skirmish", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a single combat and print its outcome
    Run(RunArgs),
    /// Find the weakest elf attack power that wins without losing an elf
    Calibrate(CalibrateArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Grid file to simulate
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Attack power every elf fights with
    #[arg(long, value_name = "N")]
    elf_attack_power: Option<u32>,

    /// Stop as soon as an elf dies
    #[arg(long)]
    require_no_elf_losses: bool,

    /// Abort when the combat lasts longer than this many rounds
    #[arg(long, value_name = "N")]
    max_rounds: Option<u32>,

    /// TOML file with default settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct CalibrateArgs {
    /// Grid file to simulate
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// First elf attack power to try
    #[arg(long, value_name = "N")]
    start_power: Option<u32>,

    /// Last elf attack power to try
    #[arg(long, value_name = "N")]
    max_power: Option<u32>,

    /// Abort an attempt that lasts longer than this many rounds
    #[arg(long, value_name = "N")]
    max_rounds: Option<u32>,

    /// TOML file with default settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CalibrationOutput {
    elf_attack_power: u32,
    report: CombatReport,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Calibrate(args) => calibrate(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let file = FileConfig::load(args.config.as_deref())?;
    let config = CombatOverrides {
        elf_attack_power: args.elf_attack_power,
        require_no_elf_losses: args.require_no_elf_losses,
        max_rounds: args.max_rounds,
    }
    .apply(file.combat);

    let grid = read_grid(&args.file)?;
    let report = run_combat(&grid, &config)
        .with_context(|| format!("combat in {} failed", args.file.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn calibrate(args: CalibrateArgs) -> Result<()> {
    let file = FileConfig::load(args.config.as_deref())?;
    let config = CalibrationOverrides {
        start_power: args.start_power,
        max_power: args.max_power,
        max_rounds: args.max_rounds,
    }
    .apply(file.calibration);

    let grid = read_grid(&args.file)?;
    let calibration = calibrate_elf_attack_power(&grid, &config)
        .with_context(|| format!("calibration of {} failed", args.file.display()))?;

    if args.json {
        let output = CalibrationOutput {
            elf_attack_power: calibration.elf_attack_power,
            report: calibration.report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Elf attack power: {}", calibration.elf_attack_power);
        print_report(&calibration.report);
    }
    Ok(())
}

fn read_grid(path: &std::path::Path) -> Result<String> {
    let grid = fs::read_to_string(path)
        .with_context(|| format!("failed to read grid file {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = grid.len(), "read grid");
    Ok(grid)
}

fn print_report(report: &CombatReport) {
    println!("Combat ends after {} full rounds", report.completed_rounds);
    match report.surviving_faction {
        Some(faction) => println!(
            "{} win with {} total hit points left",
            faction_name(faction),
            report.surviving_hit_point_total
        ),
        None => println!(
            "No faction prevailed; {} total hit points left",
            report.surviving_hit_point_total
        ),
    }
    if report.elf_died {
        println!("At least one elf died");
    }
    println!("Outcome: {}", report.outcome_score);
}

fn faction_name(faction: Faction) -> &'static str {
    match faction {
        Faction::Elf => "Elves",
        Faction::Goblin => "Goblins",
    }
}
