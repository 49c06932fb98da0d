//! Data-driven balance tables.
//!
//! Every game variant is a [`BalanceProfile`]: arena layout, path policy,
//! economy, tower and enemy growth curves, and wave pacing. Variants differ
//! only in data, never in code.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, Point, TargetingPolicy};

/// Complete set of tuning values for one game variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceProfile {
    /// Playable area and grid.
    pub arena: ArenaBalance,
    /// How the enemy route is generated.
    pub path: PathPolicy,
    /// Starting money and base health.
    pub economy: EconomyBalance,
    /// Tower prices and stat curves.
    pub tower: TowerBalance,
    /// Rule towers use to pick targets.
    pub targeting: TargetingPolicy,
    /// Enemy stat curves.
    pub enemy: EnemyBalance,
    /// Wave sizing, pacing and rewards.
    pub wave: WaveBalance,
    /// Distance a projectile covers per tick.
    pub projectile_speed: f32,
}

impl Default for BalanceProfile {
    fn default() -> Self {
        Self::straight_lane()
    }
}

impl BalanceProfile {
    /// Straight lane across the middle row, towers that chase the leading enemy,
    /// and a level cap of three.
    #[must_use]
    pub fn straight_lane() -> Self {
        Self {
            arena: ArenaBalance::default(),
            path: PathPolicy::Straight { waypoints: 5 },
            economy: EconomyBalance::default(),
            tower: TowerBalance::default(),
            targeting: TargetingPolicy::FurthestProgress,
            enemy: EnemyBalance::default(),
            wave: WaveBalance::default(),
            projectile_speed: 8.0,
        }
    }

    /// Randomly winding lane, towers that shoot whatever is closest, and no
    /// level cap.
    #[must_use]
    pub fn winding_lane() -> Self {
        Self {
            arena: ArenaBalance::default(),
            path: PathPolicy::Branching {
                turn_probability: 0.3,
            },
            economy: EconomyBalance {
                starting_money: 250,
                base_health: 20,
            },
            tower: TowerBalance {
                cost: 60,
                base_range: 100.0,
                range_per_level: 15.0,
                base_damage: 20.0,
                damage_per_level: 10.0,
                base_fire_interval_ms: 800,
                fire_interval_step_ms: 100,
                min_fire_interval_ms: 200,
                upgrade_base_cost: 50,
                max_level: None,
            },
            targeting: TargetingPolicy::NearestToTower,
            enemy: EnemyBalance {
                base_health: 80.0,
                health_per_wave: 30.0,
                base_speed: 1.2,
                speed_per_wave: 0.15,
                base_reward: 8,
                reward_per_wave: 2,
                breach_damage: 2,
            },
            wave: WaveBalance {
                base_enemies: 6,
                enemies_per_wave: 3,
                spawn_interval_ms: 800,
                first_wave_delay_ms: 3_000,
                inter_wave_delay_ms: 4_000,
                clear_bonus_base: 25,
                clear_bonus_per_wave: 15,
            },
            projectile_speed: 7.0,
        }
    }

    /// Rejects values that would stall or break the simulation.
    pub fn validate(&self) -> Result<(), BalanceError> {
        if !(self.arena.cell_size > 0.0) {
            return Err(BalanceError::CellSize);
        }
        if self.arena.columns() < 2 || self.arena.rows() < 1 {
            return Err(BalanceError::ArenaTooSmall);
        }
        match self.path {
            PathPolicy::Straight { waypoints } if waypoints < 2 => {
                return Err(BalanceError::TooFewWaypoints);
            }
            PathPolicy::Branching { turn_probability }
                if !(0.0..=1.0).contains(&turn_probability) =>
            {
                return Err(BalanceError::TurnProbability);
            }
            _ => {}
        }
        if self.tower.min_fire_interval_ms == 0 {
            return Err(BalanceError::FireIntervalFloor);
        }
        if self.tower.max_level == Some(0) {
            return Err(BalanceError::MaxLevel);
        }
        if !(self.tower.range_per_level >= 0.0) || !(self.tower.damage_per_level >= 0.0) {
            return Err(BalanceError::TowerGrowth);
        }
        if !(self.enemy.base_health > 0.0) || !(self.enemy.health_per_wave >= 0.0) {
            return Err(BalanceError::EnemyHealth);
        }
        if !(self.enemy.base_speed > 0.0) || self.enemy.speed_per_wave < 0.0 {
            return Err(BalanceError::EnemySpeed);
        }
        if !(self.projectile_speed > 0.0) {
            return Err(BalanceError::ProjectileSpeed);
        }
        if self.wave.base_enemies == 0 {
            return Err(BalanceError::EmptyWave);
        }
        if self.wave.spawn_interval_ms == 0 {
            return Err(BalanceError::SpawnInterval);
        }
        Ok(())
    }
}

/// Reasons a balance profile is unusable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// The grid cell size is not positive.
    #[error("cell size must be positive")]
    CellSize,
    /// The arena cannot hold a path.
    #[error("arena must span at least two columns and one row")]
    ArenaTooSmall,
    /// A straight path needs a start and an end.
    #[error("a straight path needs at least two waypoints")]
    TooFewWaypoints,
    /// The branching turn probability is not a probability.
    #[error("turn probability must lie in [0, 1]")]
    TurnProbability,
    /// Towers could fire every tick without bound.
    #[error("minimum fire interval must be positive")]
    FireIntervalFloor,
    /// A level cap below one leaves no valid level.
    #[error("maximum tower level must be at least one")]
    MaxLevel,
    /// Upgrades would weaken a tower.
    #[error("tower range and damage growth per level must not be negative")]
    TowerGrowth,
    /// Enemies would spawn already dead.
    #[error("enemy health must be positive and non-decreasing")]
    EnemyHealth,
    /// Enemies would never reach the base.
    #[error("enemy speed must be positive and non-decreasing")]
    EnemySpeed,
    /// Projectiles would never reach their targets.
    #[error("projectile speed must be positive")]
    ProjectileSpeed,
    /// Waves must contain enemies.
    #[error("waves must contain at least one enemy")]
    EmptyWave,
    /// Enemies of a wave would all spawn in the same tick.
    #[error("spawn interval must be positive")]
    SpawnInterval,
}

/// Playable area split into square grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaBalance {
    /// Width of the playable area.
    pub width: f32,
    /// Height of the playable area.
    pub height: f32,
    /// Side length of one grid cell.
    pub cell_size: f32,
}

impl Default for ArenaBalance {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            cell_size: 40.0,
        }
    }
}

impl ArenaBalance {
    /// Number of whole columns in the grid.
    #[must_use]
    pub fn columns(&self) -> u32 {
        if self.cell_size <= 0.0 {
            return 0;
        }
        (self.width / self.cell_size).floor() as u32
    }

    /// Number of whole rows in the grid.
    #[must_use]
    pub fn rows(&self) -> u32 {
        if self.cell_size <= 0.0 {
            return 0;
        }
        (self.height / self.cell_size).floor() as u32
    }

    /// Cell enclosing the provided point, if it lies inside the grid.
    #[must_use]
    pub fn cell_at(&self, point: Point) -> Option<CellCoord> {
        if self.cell_size <= 0.0 || point.x() < 0.0 || point.y() < 0.0 {
            return None;
        }
        let column = (point.x() / self.cell_size).floor();
        let row = (point.y() / self.cell_size).floor();
        if column >= self.columns() as f32 || row >= self.rows() as f32 {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Point {
        Point::new(
            (cell.column() as f32 + 0.5) * self.cell_size,
            (cell.row() as f32 + 0.5) * self.cell_size,
        )
    }
}

/// Policy used to lay out the enemy route.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathPolicy {
    /// Evenly spaced waypoints along the middle row.
    Straight {
        /// Number of waypoints, including both ends.
        waypoints: usize,
    },
    /// Random walk that may shift one row up or down at every column.
    Branching {
        /// Chance of shifting rows after each column.
        turn_probability: f64,
    },
}

/// Starting resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyBalance {
    /// Money available when a game starts.
    pub starting_money: u32,
    /// Base health when a game starts.
    pub base_health: i32,
}

impl Default for EconomyBalance {
    fn default() -> Self {
        Self {
            starting_money: 200,
            base_health: 20,
        }
    }
}

/// Tower prices and per-level stat growth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerBalance {
    /// Price of a new tower.
    pub cost: u32,
    /// Range at level one.
    pub base_range: f32,
    /// Range gained per level.
    pub range_per_level: f32,
    /// Damage at level one.
    pub base_damage: f32,
    /// Damage gained per level.
    pub damage_per_level: f32,
    /// Fire interval at level one, in milliseconds.
    pub base_fire_interval_ms: u64,
    /// Fire interval shed per level, in milliseconds.
    pub fire_interval_step_ms: u64,
    /// Fire interval floor, in milliseconds.
    pub min_fire_interval_ms: u64,
    /// Upgrade price per current level.
    pub upgrade_base_cost: u32,
    /// Highest reachable level, or `None` for no cap.
    pub max_level: Option<u32>,
}

impl Default for TowerBalance {
    fn default() -> Self {
        Self {
            cost: 50,
            base_range: 120.0,
            range_per_level: 20.0,
            base_damage: 25.0,
            damage_per_level: 15.0,
            base_fire_interval_ms: 1_000,
            fire_interval_step_ms: 150,
            min_fire_interval_ms: 250,
            upgrade_base_cost: 40,
            max_level: Some(3),
        }
    }
}

impl TowerBalance {
    /// Targeting radius at the provided level.
    #[must_use]
    pub fn range(&self, level: u32) -> f32 {
        self.base_range + levels_gained(level) as f32 * self.range_per_level
    }

    /// Projectile damage at the provided level.
    #[must_use]
    pub fn damage(&self, level: u32) -> f32 {
        self.base_damage + levels_gained(level) as f32 * self.damage_per_level
    }

    /// Time between shots at the provided level, never below the floor.
    #[must_use]
    pub fn fire_interval(&self, level: u32) -> Duration {
        let reduction = self
            .fire_interval_step_ms
            .saturating_mul(u64::from(levels_gained(level)));
        let millis = self
            .base_fire_interval_ms
            .saturating_sub(reduction)
            .max(self.min_fire_interval_ms)
            .max(1);
        Duration::from_millis(millis)
    }

    /// Price of upgrading a tower that currently sits at `level`.
    #[must_use]
    pub fn upgrade_cost(&self, level: u32) -> u32 {
        self.upgrade_base_cost.saturating_mul(level)
    }

    /// Reports whether a tower at `level` may gain another level.
    #[must_use]
    pub fn can_upgrade(&self, level: u32) -> bool {
        self.max_level.map_or(true, |cap| level < cap)
    }
}

fn levels_gained(level: u32) -> u32 {
    level.saturating_sub(1)
}

/// Enemy stats and per-wave growth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyBalance {
    /// Health of a first-wave enemy.
    pub base_health: f32,
    /// Health added per wave.
    pub health_per_wave: f32,
    /// Speed of a first-wave enemy, per tick.
    pub base_speed: f32,
    /// Speed added per wave.
    pub speed_per_wave: f32,
    /// Reward for killing a first-wave enemy.
    pub base_reward: u32,
    /// Reward added per wave.
    pub reward_per_wave: u32,
    /// Base health lost when an enemy breaches.
    pub breach_damage: i32,
}

impl Default for EnemyBalance {
    fn default() -> Self {
        Self {
            base_health: 100.0,
            health_per_wave: 25.0,
            base_speed: 1.5,
            speed_per_wave: 0.1,
            base_reward: 10,
            reward_per_wave: 2,
            breach_damage: 1,
        }
    }
}

impl EnemyBalance {
    /// Stats of an enemy spawned during `wave`.
    #[must_use]
    pub fn stats_for_wave(&self, wave: u32) -> EnemyStats {
        let waves_elapsed = wave.saturating_sub(1);
        EnemyStats {
            health: self.base_health + waves_elapsed as f32 * self.health_per_wave,
            speed: self.base_speed + waves_elapsed as f32 * self.speed_per_wave,
            reward: self
                .base_reward
                .saturating_add(self.reward_per_wave.saturating_mul(waves_elapsed)),
        }
    }
}

/// Stats assigned to an enemy at spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: f32,
    /// Distance covered per tick.
    pub speed: f32,
    /// Money credited on kill.
    pub reward: u32,
}

/// Wave sizing, timing and clear bonus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveBalance {
    /// Enemies in the first wave.
    pub base_enemies: u32,
    /// Enemies added per wave.
    pub enemies_per_wave: u32,
    /// Delay between consecutive spawns, in milliseconds.
    pub spawn_interval_ms: u64,
    /// Delay between game start and the first wave, in milliseconds.
    pub first_wave_delay_ms: u64,
    /// Delay between a wave clear and the next wave, in milliseconds.
    pub inter_wave_delay_ms: u64,
    /// Flat part of the clear bonus.
    pub clear_bonus_base: u32,
    /// Clear bonus added per wave number.
    pub clear_bonus_per_wave: u32,
}

impl Default for WaveBalance {
    fn default() -> Self {
        Self {
            base_enemies: 5,
            enemies_per_wave: 2,
            spawn_interval_ms: 1_000,
            first_wave_delay_ms: 2_000,
            inter_wave_delay_ms: 3_000,
            clear_bonus_base: 20,
            clear_bonus_per_wave: 10,
        }
    }
}

impl WaveBalance {
    /// Number of enemies spawned during `wave`.
    #[must_use]
    pub fn enemies_for_wave(&self, wave: u32) -> u32 {
        self.base_enemies
            .saturating_add(self.enemies_per_wave.saturating_mul(wave.saturating_sub(1)))
    }

    /// Money awarded for clearing `wave`.
    #[must_use]
    pub fn clear_bonus(&self, wave: u32) -> u32 {
        self.clear_bonus_base
            .saturating_add(self.clear_bonus_per_wave.saturating_mul(wave))
    }

    /// Delay between consecutive spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Delay between game start and the first wave.
    #[must_use]
    pub const fn first_wave_delay(&self) -> Duration {
        Duration::from_millis(self.first_wave_delay_ms)
    }

    /// Delay between a wave clear and the next wave.
    #[must_use]
    pub const fn inter_wave_delay(&self) -> Duration {
        Duration::from_millis(self.inter_wave_delay_ms)
    }
}
