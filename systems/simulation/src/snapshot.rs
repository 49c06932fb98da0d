use std::time::Duration;

use path_defence_core::{
    EnemySnapshot, GameStatistics, Generation, LifecyclePhase, Path, ProjectileSnapshot,
    TowerId, TowerSnapshot, WavePhase,
};
use path_defence_world::{query, World};
use serde::Serialize;

/// Complete read-only picture of a simulation at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    /// Lifecycle phase of the game.
    pub lifecycle: LifecyclePhase,
    /// Generation of the current game.
    pub generation: Generation,
    /// Simulation clock.
    pub now: Duration,
    /// Spendable money.
    pub money: u32,
    /// Remaining base health. May be negative after the final breach.
    pub base_health: i32,
    /// Enemies destroyed by towers.
    pub kills: u32,
    /// Number of the current or next wave.
    pub wave_number: u32,
    /// Phase of the wave cycle.
    pub wave_phase: WavePhase,
    /// Enemies spawned in the current wave.
    pub enemies_spawned: u32,
    /// Enemies the current wave will spawn in total.
    pub enemies_per_wave: u32,
    /// Tower currently selected for upgrades.
    pub selected_tower: Option<TowerId>,
    /// Path enemies walk, once a game has started.
    pub path: Option<Path>,
    /// Placed towers in id order.
    pub towers: Vec<TowerSnapshot>,
    /// Live enemies in id order.
    pub enemies: Vec<EnemySnapshot>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Running totals for the current game.
    pub statistics: GameStatistics,
}

impl SimulationSnapshot {
    pub(crate) fn capture(world: &World, wave_phase: WavePhase) -> Self {
        let economy = query::economy(world);
        let wave = query::wave(world);
        Self {
            lifecycle: query::lifecycle(world),
            generation: query::generation(world),
            now: query::now(world),
            money: economy.money,
            base_health: economy.base_health,
            kills: economy.kills,
            wave_number: wave.number,
            wave_phase,
            enemies_spawned: wave.enemies_spawned,
            enemies_per_wave: wave.enemies_per_wave,
            selected_tower: query::selected_tower(world),
            path: query::path(world).cloned(),
            towers: query::tower_view(world).into_vec(),
            enemies: query::enemy_view(world).into_vec(),
            projectiles: query::projectiles(world),
            statistics: query::statistics(world),
        }
    }
}
