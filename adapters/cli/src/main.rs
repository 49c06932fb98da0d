#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Path Defence game.

mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use config::Preset;
use log::info;
use path_defence_core::{ClickOutcome, LifecyclePhase, Point};
use path_defence_system_simulation::{Simulation, SimulationSnapshot};

/// Command-line arguments accepted by the headless driver.
#[derive(Debug, Parser)]
#[command(name = "path-defence", version, about = "Runs a headless Path Defence game")]
struct CliArgs {
    /// Balance preset the game starts from.
    #[arg(long, value_enum, default_value_t = Preset::Straight)]
    preset: Preset,
    /// TOML file whose values override the preset.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for path generation.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(
        long = "tick-ms",
        default_value_t = 16,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    tick_ms: u64,
    /// Tower placement applied at start, as canvas coordinates.
    #[arg(long = "place", value_name = "X,Y", value_parser = parse_point)]
    placements: Vec<Point>,
    /// Print the final snapshot as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Path Defence command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();
    let snapshot = run(&args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&snapshot).context("failed to encode snapshot")?;
        println!("{json}");
    } else {
        print_summary(&snapshot);
    }
    Ok(())
}

fn run(args: &CliArgs) -> Result<SimulationSnapshot> {
    let profile = config::load(args.preset, args.config.as_deref()).with_context(|| {
        format!("failed to load {:?} balance profile", args.preset)
    })?;
    let mut simulation =
        Simulation::new(profile, args.seed).context("failed to build simulation")?;
    simulation
        .start(Duration::ZERO)
        .context("failed to start game")?;

    for point in &args.placements {
        match simulation.placement_click(*point) {
            ClickOutcome::Placed { tower, cell } => info!(
                "placed {tower:?} at column {} row {}",
                cell.column(),
                cell.row()
            ),
            outcome => info!(
                "placement at ({}, {}) not applied: {outcome:?}",
                point.x(),
                point.y()
            ),
        }
    }

    let step = Duration::from_millis(args.tick_ms);
    let mut now = Duration::ZERO;
    for _ in 0..args.ticks {
        now += step;
        simulation.tick(now);
        if !simulation.lifecycle().is_running() {
            break;
        }
    }

    Ok(simulation.snapshot())
}

fn print_summary(snapshot: &SimulationSnapshot) {
    let outcome = match snapshot.lifecycle {
        LifecyclePhase::NotStarted => "not started".to_owned(),
        LifecyclePhase::Running => "running".to_owned(),
        LifecyclePhase::Ended(outcome) => format!("ended ({outcome:?})"),
    };
    let statistics = &snapshot.statistics;

    println!("game {outcome} after {:.1}s", snapshot.now.as_secs_f64());
    println!(
        "wave {} ({:?}), {}/{} spawned",
        snapshot.wave_number,
        snapshot.wave_phase,
        snapshot.enemies_spawned,
        snapshot.enemies_per_wave
    );
    println!(
        "money {}, base health {}, kills {}",
        snapshot.money, snapshot.base_health, snapshot.kills
    );
    println!(
        "towers {}, live enemies {}, projectiles in flight {}",
        snapshot.towers.len(),
        snapshot.enemies.len(),
        snapshot.projectiles.len()
    );
    println!(
        "spent {}, earned {}, breaches {}, shots {} ({} whiffed)",
        statistics.money_spent,
        statistics.money_earned,
        statistics.enemies_breached,
        statistics.projectiles_fired,
        statistics.projectiles_whiffed
    );
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but found `{value}`"))?;
    let coordinate = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|error| format!("invalid coordinate `{part}`: {error}"))
    };
    Ok(Point::new(coordinate(x)?, coordinate(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn points_parse_with_optional_spaces() {
        assert_eq!(parse_point("100,60.5"), Ok(Point::new(100.0, 60.5)));
        assert_eq!(parse_point(" 3 , 4 "), Ok(Point::new(3.0, 4.0)));
        assert!(parse_point("12").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn repeated_place_flags_accumulate() {
        let args = CliArgs::try_parse_from([
            "path-defence",
            "--preset",
            "winding",
            "--place",
            "20,20",
            "--place",
            "60,20",
            "--tick-ms",
            "33",
        ])
        .expect("arguments parse");

        assert_eq!(args.preset, Preset::Winding);
        assert_eq!(args.placements.len(), 2);
        assert_eq!(args.tick_ms, 33);
    }

    #[test]
    fn zero_tick_length_is_rejected() {
        assert!(CliArgs::try_parse_from(["path-defence", "--tick-ms", "0"]).is_err());
    }

    #[test]
    fn short_run_places_towers_and_spawns() {
        let args = CliArgs::try_parse_from([
            "path-defence",
            "--ticks",
            "400",
            "--place",
            "420,260",
            "--place",
            "420,300",
        ])
        .expect("arguments parse");

        let snapshot = run(&args).expect("run completes");
        assert_eq!(snapshot.lifecycle, LifecyclePhase::Running);
        assert_eq!(snapshot.towers.len(), 1);
        assert!(snapshot.enemies_spawned > 0);
    }
}
