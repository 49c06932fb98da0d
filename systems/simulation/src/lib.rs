#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation loop that wires the world to every Path Defence system.
//!
//! A [`Simulation`] owns the authoritative world and the pure systems. Each
//! call to [`Simulation::tick`] runs one discrete step in a fixed order:
//!
//! 1. advance the clock and let the wave scheduler open waves and spawn,
//! 2. let ready towers pick targets and fire,
//! 3. move enemies, resolving breaches,
//! 4. move projectiles, resolving hits, kills and whiffs,
//! 5. evaluate the wave-clear condition,
//! 6. evaluate the game-over condition.
//!
//! Every event the world emits is forwarded to the scheduler and the builder
//! before the next command batch is produced.

mod snapshot;

use std::time::Duration;

use log::{debug, info};
use path_defence_core::{
    BalanceError, BalanceProfile, ClickOutcome, Command, Event, LifecyclePhase, PlacementError,
    Point, Rejection, TowerTarget, UpgradeError,
};
use path_defence_system_builder::{Builder, BuilderInput, ClickKind};
use path_defence_system_path_generation::{PathGeneration, PathGenerationError};
use path_defence_system_tower_combat::TowerCombat;
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_system_wave_scheduler::{Config as WaveConfig, WaveScheduler};
use path_defence_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use snapshot::SimulationSnapshot;

/// Failures that prevent a simulation from being built or started.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SimulationError {
    /// The balance profile failed validation.
    #[error("invalid balance profile: {0}")]
    Balance(#[from] BalanceError),
    /// No path could be laid out for the arena.
    #[error("path generation failed: {0}")]
    Path(#[from] PathGenerationError),
}

/// Owns the world and the systems and advances them one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    path_generation: PathGeneration,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    combat: TowerCombat,
    builder: Builder,
    rng: ChaCha8Rng,
    targets: Vec<TowerTarget>,
    last_events: Vec<Event>,
}

impl Simulation {
    /// Builds a simulation for the provided profile.
    ///
    /// `seed` drives every random choice, so equal seeds and equal inputs
    /// replay identically.
    pub fn new(profile: BalanceProfile, seed: u64) -> Result<Self, SimulationError> {
        profile.validate()?;

        let path_generation = PathGeneration::new(profile.arena, profile.path);
        let scheduler = WaveScheduler::new(WaveConfig::from_balance(&profile.wave));
        Ok(Self {
            world: World::new(profile),
            path_generation,
            scheduler,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            builder: Builder::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            targets: Vec::new(),
            last_events: Vec::new(),
        })
    }

    /// Starts a fresh game at `now` on a newly generated path.
    ///
    /// Any running game is replaced: money, health, waves, entities and
    /// selection are all reset, and work scheduled for the previous game is
    /// discarded.
    pub fn start(&mut self, now: Duration) -> Result<(), SimulationError> {
        let path_seed = self.rng.gen::<u64>();
        let path = self.path_generation.generate(path_seed)?;
        info!(
            "starting game on a {}-waypoint path (seed {path_seed:#x})",
            path.len()
        );

        self.last_events.clear();
        self.dispatch(vec![Command::StartGame { path, now }]);
        Ok(())
    }

    /// Alias of [`Simulation::start`] for callers that model a restart button.
    pub fn restart(&mut self, now: Duration) -> Result<(), SimulationError> {
        self.start(now)
    }

    /// Abandons the running game. Pending spawns never happen.
    pub fn stop(&mut self) {
        self.last_events.clear();
        self.dispatch(vec![Command::StopGame]);
    }

    /// Advances the simulation to the injected monotonic timestamp.
    pub fn tick(&mut self, now: Duration) {
        self.last_events.clear();
        if !query::lifecycle(&self.world).is_running() {
            return;
        }

        self.dispatch(vec![Command::Tick { now }]);

        self.targeting.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            query::profile(&self.world).targeting,
            &mut self.targets,
        );
        let mut fire = Vec::new();
        self.combat.handle(
            &query::tower_cooldown_view(&self.world),
            &self.targets,
            &mut fire,
        );
        self.dispatch(fire);

        self.dispatch(vec![Command::AdvanceEnemies]);
        self.dispatch(vec![Command::AdvanceProjectiles]);

        let mut clear = Vec::new();
        self.scheduler
            .evaluate_clear(&query::wave(&self.world), &mut clear);
        self.dispatch(clear);

        self.dispatch(vec![Command::EvaluateLifecycle]);
    }

    /// Handles a click on the combined surface: acts on a tower when one is
    /// present, otherwise tries to place one.
    pub fn click(&mut self, point: Point) -> ClickOutcome {
        self.handle_click(BuilderInput::new(ClickKind::Any, point))
    }

    /// Handles a click that always requests a new tower.
    pub fn placement_click(&mut self, point: Point) -> ClickOutcome {
        self.handle_click(BuilderInput::new(ClickKind::Placement, point))
    }

    /// Handles a click that selects or upgrades an existing tower.
    pub fn tower_click(&mut self, point: Point) -> ClickOutcome {
        self.handle_click(BuilderInput::new(ClickKind::Tower, point))
    }

    /// Injects a raw command, as an adapter or a late timer would.
    pub fn submit(&mut self, command: Command) {
        self.last_events.clear();
        self.dispatch(vec![command]);
    }

    /// Events produced by the most recent operation.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.last_events
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn lifecycle(&self) -> LifecyclePhase {
        query::lifecycle(&self.world)
    }

    /// Captures everything a renderer needs to draw the current state.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot::capture(&self.world, self.scheduler.phase())
    }

    fn handle_click(&mut self, input: BuilderInput) -> ClickOutcome {
        self.last_events.clear();

        let mut commands = Vec::new();
        let world = &self.world;
        self.builder.handle(
            &[],
            Some(input),
            |point| query::tower_at(world, point),
            &mut commands,
        );
        self.dispatch(commands);

        let outcome = click_outcome(&self.last_events).unwrap_or_else(|| {
            let running = query::lifecycle(&self.world).is_running();
            let rejection = match (running, input.kind) {
                (false, ClickKind::Tower) => Rejection::Upgrade(UpgradeError::NotRunning),
                (false, _) => Rejection::Placement(PlacementError::NotRunning),
                (true, _) => Rejection::NoTower,
            };
            ClickOutcome::Rejected(rejection)
        });
        debug!(
            "{:?} click at ({}, {}): {outcome:?}",
            input.kind,
            input.point.x(),
            input.point.y()
        );
        outcome
    }

    /// Applies commands, then feeds the resulting events to the reactive
    /// systems until no further commands are produced.
    fn dispatch(&mut self, commands: Vec<Command>) {
        let mut pending = commands;
        let mut ignored = Vec::new();
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            if events.is_empty() {
                break;
            }

            let wave = query::wave(&self.world);
            self.scheduler.handle(&events, &wave, &mut pending);
            self.builder.handle(&events, None, |_| None, &mut ignored);
            self.last_events.extend(events);
        }
    }
}

fn click_outcome(events: &[Event]) -> Option<ClickOutcome> {
    events.iter().find_map(|event| match *event {
        Event::TowerPlaced { tower, cell, .. } => Some(ClickOutcome::Placed { tower, cell }),
        Event::TowerSelected { tower } => Some(ClickOutcome::Selected { tower }),
        Event::TowerUpgraded { tower, level, .. } => {
            Some(ClickOutcome::Upgraded { tower, level })
        }
        Event::TowerPlacementRejected { reason, .. } => {
            Some(ClickOutcome::Rejected(Rejection::Placement(reason)))
        }
        Event::TowerUpgradeRejected { reason, .. } => {
            Some(ClickOutcome::Rejected(Rejection::Upgrade(reason)))
        }
        _ => None,
    })
}
