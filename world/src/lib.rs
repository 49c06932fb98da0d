#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Path Defence.
//!
//! The world owns every entity and all bookkeeping. It is mutated exclusively
//! through [`apply`], which validates each [`Command`] against the current
//! state and reports what happened as [`Event`] values. Read access goes
//! through the [`query`] module.

mod economy;
mod enemies;
mod projectiles;
mod towers;

use std::time::Duration;

use log::{debug, info, trace};
use path_defence_core::{
    BalanceProfile, Command, EnemyId, Event, GameOutcome, Generation, LifecyclePhase, Path,
    PlacementError, Point, TowerId, UpgradeError,
};

use economy::Economy;
use enemies::{EnemyRoster, Movement};
use projectiles::{Flight, ProjectileRegistry};
use towers::TowerRegistry;

/// Represents the authoritative Path Defence world state.
#[derive(Debug)]
pub struct World {
    profile: BalanceProfile,
    lifecycle: LifecyclePhase,
    generation: Generation,
    path: Option<Path>,
    towers: TowerRegistry,
    enemies: EnemyRoster,
    projectiles: ProjectileRegistry,
    economy: Economy,
    wave: WaveCounters,
    selected: Option<TowerId>,
    now: Duration,
}

#[derive(Clone, Copy, Debug)]
struct WaveCounters {
    number: u32,
    spawned: u32,
    per_wave: u32,
    in_progress: bool,
}

impl WaveCounters {
    fn first(profile: &BalanceProfile) -> Self {
        Self {
            number: 1,
            spawned: 0,
            per_wave: profile.wave.enemies_for_wave(1),
            in_progress: false,
        }
    }
}

impl World {
    /// Creates a world governed by the provided balance profile.
    ///
    /// The world starts in [`LifecyclePhase::NotStarted`] and holds no path
    /// until a [`Command::StartGame`] arrives.
    #[must_use]
    pub fn new(profile: BalanceProfile) -> Self {
        Self {
            lifecycle: LifecyclePhase::NotStarted,
            generation: Generation::default(),
            path: None,
            towers: TowerRegistry::new(),
            enemies: EnemyRoster::new(),
            projectiles: ProjectileRegistry::new(),
            economy: Economy::new(&profile.economy),
            wave: WaveCounters::first(&profile),
            selected: None,
            now: Duration::ZERO,
            profile,
        }
    }

    fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    fn accepts_scheduled(&self, generation: Generation, command: &'static str) -> bool {
        if !self.is_running() {
            debug!("ignoring {command}: game is not running");
            return false;
        }
        if generation != self.generation {
            debug!(
                "ignoring {command}: stale generation {} (current {})",
                generation.get(),
                self.generation.get()
            );
            return false;
        }
        true
    }

    fn start(&mut self, path: Path, now: Duration, out_events: &mut Vec<Event>) {
        self.generation = self.generation.next();
        self.lifecycle = LifecyclePhase::Running;
        self.path = Some(path);
        self.towers = TowerRegistry::new();
        self.enemies = EnemyRoster::new();
        self.projectiles = ProjectileRegistry::new();
        self.economy = Economy::new(&self.profile.economy);
        self.wave = WaveCounters::first(&self.profile);
        self.selected = None;
        self.now = now;

        info!("game {} started", self.generation.get());
        out_events.push(Event::GameStarted {
            generation: self.generation,
            at: now,
        });
    }

    fn end(&mut self, outcome: GameOutcome, out_events: &mut Vec<Event>) {
        self.lifecycle = LifecyclePhase::Ended(outcome);
        info!(
            "game {} ended ({outcome:?}) at wave {}",
            self.generation.get(),
            self.wave.number
        );
        out_events.push(Event::GameEnded {
            generation: self.generation,
            outcome,
        });
    }

    fn begin_wave(&mut self, generation: Generation, out_events: &mut Vec<Event>) {
        if !self.accepts_scheduled(generation, "BeginWave") {
            return;
        }
        if self.wave.in_progress {
            debug!("ignoring BeginWave: wave {} in progress", self.wave.number);
            return;
        }

        self.wave.per_wave = self.profile.wave.enemies_for_wave(self.wave.number);
        self.wave.spawned = 0;
        self.wave.in_progress = true;
        info!(
            "wave {} started with {} enemies",
            self.wave.number, self.wave.per_wave
        );
        out_events.push(Event::WaveStarted {
            wave: self.wave.number,
            enemies: self.wave.per_wave,
            at: self.now,
        });
    }

    fn spawn_enemy(&mut self, generation: Generation, out_events: &mut Vec<Event>) {
        if !self.accepts_scheduled(generation, "SpawnEnemy") {
            return;
        }
        if !self.wave.in_progress || self.wave.spawned >= self.wave.per_wave {
            debug!("ignoring SpawnEnemy: wave {} is not spawning", self.wave.number);
            return;
        }
        let Some(path) = self.path.as_ref() else {
            return;
        };

        let stats = self.profile.enemy.stats_for_wave(self.wave.number);
        let enemy = self.enemies.spawn(path, stats);
        self.wave.spawned += 1;
        debug!(
            "enemy {} spawned ({}/{})",
            enemy.get(),
            self.wave.spawned,
            self.wave.per_wave
        );
        out_events.push(Event::EnemySpawned {
            enemy,
            wave: self.wave.number,
        });
    }

    fn complete_wave(&mut self, generation: Generation, out_events: &mut Vec<Event>) {
        if !self.accepts_scheduled(generation, "CompleteWave") {
            return;
        }
        if !self.wave.in_progress
            || self.wave.spawned < self.wave.per_wave
            || !self.enemies.is_empty()
        {
            debug!("ignoring CompleteWave: wave {} not drained", self.wave.number);
            return;
        }

        let cleared = self.wave.number;
        let bonus = self.profile.wave.clear_bonus(cleared);
        self.economy.earn(bonus);
        self.wave.number = cleared.saturating_add(1);
        self.wave.spawned = 0;
        self.wave.per_wave = self.profile.wave.enemies_for_wave(self.wave.number);
        self.wave.in_progress = false;

        info!("wave {cleared} cleared, bonus {bonus}");
        out_events.push(Event::WaveCleared {
            wave: cleared,
            bonus,
            at: self.now,
        });
    }

    fn fire_projectile(
        &mut self,
        tower_id: TowerId,
        target: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        if !self.is_running() {
            return;
        }
        let Some(tower) = self.towers.get_mut(tower_id) else {
            debug!("ignoring FireProjectile: missing tower {}", tower_id.get());
            return;
        };
        if tower.ready_in(self.now) > Duration::ZERO {
            debug!("ignoring FireProjectile: tower {} cooling down", tower_id.get());
            return;
        }
        let Some(target_position) = self.enemies.live_position(target) else {
            debug!("ignoring FireProjectile: enemy {} not live", target.get());
            return;
        };
        if tower.position().distance(target_position) > tower.range() {
            debug!("ignoring FireProjectile: enemy {} out of range", target.get());
            return;
        }

        tower.record_shot(self.now);
        let projectile = self.projectiles.launch(
            tower.position(),
            target,
            tower.damage(),
            self.profile.projectile_speed,
        );
        self.economy.record_shot();
        trace!(
            "tower {} fired projectile {} at enemy {}",
            tower_id.get(),
            projectile.get(),
            target.get()
        );
        out_events.push(Event::ProjectileFired {
            projectile,
            tower: tower_id,
            target,
        });
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }
        let Some(path) = self.path.as_ref() else {
            return;
        };

        let mut breached = Vec::new();
        for enemy in self.enemies.iter_mut() {
            match enemy.advance(path) {
                Movement::Travelling => {}
                Movement::ReachedWaypoint(path_index) => {
                    out_events.push(Event::EnemyReachedWaypoint {
                        enemy: enemy.id(),
                        path_index,
                    });
                }
                Movement::Breached => breached.push(enemy.id()),
            }
        }

        let damage = self.profile.enemy.breach_damage;
        for enemy in breached {
            if self.enemies.remove(enemy).is_none() {
                continue;
            }
            let base_health = self.economy.breach(damage);
            debug!(
                "enemy {} breached the base, health now {base_health}",
                enemy.get()
            );
            out_events.push(Event::EnemyBreached {
                enemy,
                damage,
                base_health,
            });
        }
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }

        for id in self.projectiles.ids() {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            let target = projectile.target();
            let damage = projectile.damage();
            match projectile.advance(self.enemies.live_position(target)) {
                Flight::InFlight => {}
                Flight::Lost => {
                    let _ = self.projectiles.remove(id);
                    self.economy.record_whiff();
                    trace!("projectile {} whiffed", id.get());
                    out_events.push(Event::ProjectileWhiffed {
                        projectile: id,
                        target,
                    });
                }
                Flight::Arrived => {
                    let _ = self.projectiles.remove(id);
                    let Some(enemy) = self.enemies.get_mut(target) else {
                        continue;
                    };
                    let killed = enemy.take_damage(damage);
                    out_events.push(Event::ProjectileLanded {
                        projectile: id,
                        target,
                        damage,
                    });
                    if killed {
                        let reward = enemy.reward();
                        let _ = self.enemies.remove(target);
                        self.economy.credit_kill(reward);
                        debug!("enemy {} killed, reward {reward}", target.get());
                        out_events.push(Event::EnemyKilled {
                            enemy: target,
                            reward,
                        });
                    }
                }
            }
        }
    }

    fn place_tower(&mut self, point: Point, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.try_place_tower(point, out_events) {
            debug!(
                "placement at ({}, {}) rejected: {reason}",
                point.x(),
                point.y()
            );
            out_events.push(Event::TowerPlacementRejected { point, reason });
        }
    }

    fn try_place_tower(
        &mut self,
        point: Point,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        if !self.is_running() {
            return Err(PlacementError::NotRunning);
        }
        let arena = self.profile.arena;
        let cell = arena.cell_at(point).ok_or(PlacementError::OutOfBounds)?;
        let center = arena.cell_center(cell);
        let on_path = self
            .path
            .as_ref()
            .is_some_and(|path| path.distance_to(center) <= arena.cell_size / 2.0);
        if on_path {
            return Err(PlacementError::OnPath);
        }
        if self.towers.at_cell(cell).is_some() {
            return Err(PlacementError::Occupied);
        }
        let cost = self.profile.tower.cost;
        if !self.economy.spend(cost) {
            return Err(PlacementError::InsufficientFunds);
        }

        let tower = self.towers.build(cell, center, &self.profile.tower);
        self.selected = None;
        debug!(
            "tower {} placed at cell ({}, {})",
            tower.get(),
            cell.column(),
            cell.row()
        );
        out_events.push(Event::TowerPlaced { tower, cell, cost });
        Ok(())
    }

    fn select_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        if !self.is_running() || self.towers.get(tower).is_none() {
            debug!("ignoring SelectTower for tower {}", tower.get());
            return;
        }
        self.selected = Some(tower);
        out_events.push(Event::TowerSelected { tower });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        match self.try_upgrade_tower(tower) {
            Ok((level, cost)) => {
                debug!("tower {} upgraded to level {level}", tower.get());
                out_events.push(Event::TowerUpgraded { tower, level, cost });
            }
            Err(reason) => {
                debug!("upgrade of tower {} rejected: {reason}", tower.get());
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
            }
        }
    }

    fn try_upgrade_tower(&mut self, tower: TowerId) -> Result<(u32, u32), UpgradeError> {
        if !self.is_running() {
            return Err(UpgradeError::NotRunning);
        }
        let entry = self
            .towers
            .get_mut(tower)
            .ok_or(UpgradeError::MissingTower)?;
        let cost = entry.upgrade(&self.profile.tower, &mut self.economy)?;
        Ok((entry.level(), cost))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(BalanceProfile::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame { path, now } => world.start(path, now, out_events),
        Command::StopGame => {
            if world.is_running() {
                world.end(GameOutcome::Abandoned, out_events);
            }
        }
        Command::Tick { now } => {
            if !world.is_running() {
                return;
            }
            let dt = now.saturating_sub(world.now);
            world.now = world.now.max(now);
            trace!("tick at {:?} (dt {:?})", world.now, dt);
            out_events.push(Event::TimeAdvanced {
                now: world.now,
                dt,
            });
        }
        Command::BeginWave { generation } => world.begin_wave(generation, out_events),
        Command::SpawnEnemy { generation } => world.spawn_enemy(generation, out_events),
        Command::CompleteWave { generation } => world.complete_wave(generation, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::AdvanceEnemies => world.advance_enemies(out_events),
        Command::AdvanceProjectiles => world.advance_projectiles(out_events),
        Command::EvaluateLifecycle => {
            if world.is_running() && world.economy.base_destroyed() {
                world.end(GameOutcome::Defeated, out_events);
            }
        }
        Command::PlaceTower { point } => world.place_tower(point, out_events),
        Command::SelectTower { tower } => world.select_tower(tower, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use path_defence_core::{
        BalanceProfile, EconomySnapshot, EnemyId, EnemyView, GameStatistics, Generation,
        LifecyclePhase, Path, Point, ProjectileSnapshot, TowerCooldownView, TowerId, TowerView,
        WaveSnapshot,
    };

    /// Balance profile the world was created with.
    #[must_use]
    pub fn profile(world: &World) -> &BalanceProfile {
        &world.profile
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn lifecycle(world: &World) -> LifecyclePhase {
        world.lifecycle
    }

    /// Generation of the current (or most recent) game.
    #[must_use]
    pub fn generation(world: &World) -> Generation {
        world.generation
    }

    /// Route enemies follow, absent before the first start.
    #[must_use]
    pub fn path(world: &World) -> Option<&Path> {
        world.path.as_ref()
    }

    /// Timestamp of the most recent tick.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Money, base health and kill count.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.economy.snapshot()
    }

    /// Cumulative counters of the current game.
    #[must_use]
    pub fn statistics(world: &World) -> GameStatistics {
        world.economy.statistics()
    }

    /// Wave counters together with the live enemy count.
    #[must_use]
    pub fn wave(world: &World) -> WaveSnapshot {
        WaveSnapshot {
            generation: world.generation,
            number: world.wave.number,
            enemies_spawned: world.wave.spawned,
            enemies_per_wave: world.wave.per_wave,
            in_progress: world.wave.in_progress,
            live_enemies: u32::try_from(world.enemies.len()).unwrap_or(u32::MAX),
        }
    }

    /// Captures a read-only view of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let balance = &world.profile.tower;
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.snapshot(balance))
                .collect(),
        )
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Snapshots of the projectiles in flight, in launch order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Cooldown of every tower relative to the most recent tick.
    #[must_use]
    pub fn tower_cooldown_view(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.cooldown(world.now))
                .collect(),
        )
    }

    /// Tower occupying the grid cell that encloses `point`, if any.
    #[must_use]
    pub fn tower_at(world: &World, point: Point) -> Option<TowerId> {
        world
            .profile
            .arena
            .cell_at(point)
            .and_then(|cell| world.towers.at_cell(cell))
    }

    /// Tower whose range is currently presented, if any.
    #[must_use]
    pub fn selected_tower(world: &World) -> Option<TowerId> {
        world.selected
    }

    /// Reports whether the enemy is in the live set with positive health.
    #[must_use]
    pub fn is_enemy_live(world: &World, enemy: EnemyId) -> bool {
        world.enemies.live_position(enemy).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::CellCoord;

    fn lane() -> Path {
        Path::from_waypoints(vec![Point::new(0.0, 300.0), Point::new(800.0, 300.0)])
            .expect("valid path")
    }

    fn started_world() -> (World, Vec<Event>) {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                path: lane(),
                now: Duration::ZERO,
            },
            &mut events,
        );
        (world, events)
    }

    fn begin_and_spawn(world: &mut World) -> EnemyId {
        let generation = query::generation(world);
        let mut events = Vec::new();
        apply(world, Command::BeginWave { generation }, &mut events);
        apply(world, Command::SpawnEnemy { generation }, &mut events);
        events
            .iter()
            .find_map(|event| match event {
                Event::EnemySpawned { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .expect("enemy spawned")
    }

    #[test]
    fn start_resets_state_and_bumps_generation() {
        let (mut world, events) = started_world();
        assert_eq!(
            events,
            vec![Event::GameStarted {
                generation: Generation::new(1),
                at: Duration::ZERO,
            }]
        );
        assert_eq!(query::lifecycle(&world), LifecyclePhase::Running);
        assert_eq!(query::wave(&world).number, 1);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(100.0, 100.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::StartGame {
                path: lane(),
                now: Duration::from_secs(5),
            },
            &mut events,
        );
        assert_eq!(query::generation(&world), Generation::new(2));
        assert!(query::tower_view(&world).into_vec().is_empty());
        assert_eq!(query::economy(&world).money, 200);
    }

    #[test]
    fn ticks_are_ignored_until_started() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(16),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::now(&world), Duration::ZERO);
    }

    #[test]
    fn placement_checks_path_occupancy_and_funds() {
        let (mut world, _) = started_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(100.0, 305.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(85.0, 250.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(95.0, 270.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(900.0, 10.0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::TowerPlacementRejected {
                    point: Point::new(100.0, 305.0),
                    reason: PlacementError::OnPath,
                },
                Event::TowerPlaced {
                    tower: TowerId::new(0),
                    cell: CellCoord::new(2, 6),
                    cost: 50,
                },
                Event::TowerPlacementRejected {
                    point: Point::new(95.0, 270.0),
                    reason: PlacementError::Occupied,
                },
                Event::TowerPlacementRejected {
                    point: Point::new(900.0, 10.0),
                    reason: PlacementError::OutOfBounds,
                },
            ]
        );
        assert_eq!(query::economy(&world).money, 150);

        events.clear();
        for column in 0..3 {
            apply(
                &mut world,
                Command::PlaceTower {
                    point: Point::new(column as f32 * 40.0 + 20.0, 20.0),
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(620.0, 20.0),
            },
            &mut events,
        );
        assert_eq!(query::economy(&world).money, 0);
        assert_eq!(
            events.last(),
            Some(&Event::TowerPlacementRejected {
                point: Point::new(620.0, 20.0),
                reason: PlacementError::InsufficientFunds,
            })
        );
    }

    #[test]
    fn stale_generation_cannot_spawn() {
        let (mut world, _) = started_world();
        let stale = query::generation(&world);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                path: lane(),
                now: Duration::ZERO,
            },
            &mut events,
        );
        events.clear();

        apply(&mut world, Command::BeginWave { generation: stale }, &mut events);
        apply(&mut world, Command::SpawnEnemy { generation: stale }, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::wave(&world).enemies_spawned, 0);
    }

    #[test]
    fn spawning_stops_at_wave_size() {
        let (mut world, _) = started_world();
        let generation = query::generation(&world);
        let mut events = Vec::new();
        apply(&mut world, Command::BeginWave { generation }, &mut events);
        for _ in 0..10 {
            apply(&mut world, Command::SpawnEnemy { generation }, &mut events);
        }
        let wave = query::wave(&world);
        assert_eq!(wave.enemies_spawned, 5);
        assert_eq!(wave.live_enemies, 5);
        assert!(wave.spawning_complete());
    }

    #[test]
    fn breach_removes_enemy_and_damages_base() {
        let (mut world, _) = started_world();
        let enemy = begin_and_spawn(&mut world);
        let mut events = Vec::new();
        for _ in 0..1_000 {
            apply(&mut world, Command::AdvanceEnemies, &mut events);
        }
        assert!(events.contains(&Event::EnemyBreached {
            enemy,
            damage: 1,
            base_health: 19,
        }));
        assert!(!query::is_enemy_live(&world, enemy));
        assert_eq!(query::statistics(&world).enemies_breached, 1);
    }

    #[test]
    fn fire_requires_range_and_cooldown() {
        let (mut world, _) = started_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(20.0, 260.0),
            },
            &mut events,
        );
        let enemy = begin_and_spawn(&mut world);
        events.clear();

        let fire = Command::FireProjectile {
            tower: TowerId::new(0),
            target: enemy,
        };
        apply(&mut world, fire.clone(), &mut events);
        apply(&mut world, fire.clone(), &mut events);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::ProjectileFired { .. }));

        apply(
            &mut world,
            Command::Tick {
                now: Duration::from_secs(1),
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, fire, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(query::statistics(&world).projectiles_fired, 2);
    }

    #[test]
    fn lethal_hits_credit_reward_once() {
        let (mut world, _) = started_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(20.0, 260.0),
            },
            &mut events,
        );
        let enemy = begin_and_spawn(&mut world);

        let mut now = Duration::ZERO;
        for _ in 0..4 {
            apply(
                &mut world,
                Command::FireProjectile {
                    tower: TowerId::new(0),
                    target: enemy,
                },
                &mut events,
            );
            now += Duration::from_secs(1);
            apply(&mut world, Command::Tick { now }, &mut events);
        }
        events.clear();
        for _ in 0..20 {
            apply(&mut world, Command::AdvanceProjectiles, &mut events);
        }

        let kills = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyKilled { .. }))
            .count();
        let whiffs = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileWhiffed { .. }))
            .count();
        assert_eq!(kills, 1);
        assert_eq!(whiffs, 0);
        assert_eq!(query::economy(&world).kills, 1);
        assert_eq!(query::economy(&world).money, 150 + 10);
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn overkill_shot_whiffs_without_second_reward() {
        let mut profile = BalanceProfile::default();
        profile.enemy.base_health = 25.0;
        let mut world = World::new(profile);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                path: lane(),
                now: Duration::ZERO,
            },
            &mut events,
        );
        for x in [20.0, 60.0] {
            apply(
                &mut world,
                Command::PlaceTower {
                    point: Point::new(x, 260.0),
                },
                &mut events,
            );
        }
        let enemy = begin_and_spawn(&mut world);

        events.clear();
        for tower in [TowerId::new(0), TowerId::new(1)] {
            apply(
                &mut world,
                Command::FireProjectile {
                    tower,
                    target: enemy,
                },
                &mut events,
            );
        }
        assert_eq!(query::projectiles(&world).len(), 2);
        for _ in 0..20 {
            apply(&mut world, Command::AdvanceProjectiles, &mut events);
        }

        let outcomes: Vec<&str> = events
            .iter()
            .filter_map(|event| match event {
                Event::ProjectileLanded { .. } => Some("landed"),
                Event::EnemyKilled { .. } => Some("killed"),
                Event::ProjectileWhiffed { .. } => Some("whiffed"),
                _ => None,
            })
            .collect();
        assert_eq!(outcomes, vec!["landed", "killed", "whiffed"]);

        let economy = query::economy(&world);
        assert_eq!(economy.kills, 1);
        assert_eq!(economy.money, 200 - 2 * 50 + 10);
        assert_eq!(query::statistics(&world).projectiles_whiffed, 1);
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn stop_ends_game_and_blocks_clicks() {
        let (mut world, _) = started_world();
        let mut events = Vec::new();
        apply(&mut world, Command::StopGame, &mut events);
        apply(
            &mut world,
            Command::PlaceTower {
                point: Point::new(20.0, 20.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::UpgradeTower {
                tower: TowerId::new(0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::GameEnded {
                    generation: Generation::new(1),
                    outcome: GameOutcome::Abandoned,
                },
                Event::TowerPlacementRejected {
                    point: Point::new(20.0, 20.0),
                    reason: PlacementError::NotRunning,
                },
                Event::TowerUpgradeRejected {
                    tower: TowerId::new(0),
                    reason: UpgradeError::NotRunning,
                },
            ]
        );
    }
}
