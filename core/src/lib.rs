#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod balance;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use balance::{
    ArenaBalance, BalanceError, BalanceProfile, EconomyBalance, EnemyBalance, EnemyStats,
    PathPolicy, TowerBalance, WaveBalance,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets every piece of game state and enters the running phase.
    StartGame {
        /// Route that enemies traverse for the whole session.
        path: Path,
        /// Monotonic timestamp at which the game starts.
        now: Duration,
    },
    /// Abandons the running game. Pending scheduled work becomes stale.
    StopGame,
    /// Advances the simulation clock to the provided monotonic timestamp.
    Tick {
        /// Timestamp injected by the clock collaborator.
        now: Duration,
    },
    /// Opens the spawning phase of the current wave.
    BeginWave {
        /// Game generation the scheduler issued the command for.
        generation: Generation,
    },
    /// Emits one enemy of the current wave at the path spawn point.
    SpawnEnemy {
        /// Game generation the scheduler issued the command for.
        generation: Generation,
    },
    /// Closes a drained wave, awarding the clear bonus.
    CompleteWave {
        /// Game generation the scheduler issued the command for.
        generation: Generation,
    },
    /// Requests that a tower launch a projectile at an enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile homes in on.
        target: EnemyId,
    },
    /// Moves every live enemy one tick along the path.
    AdvanceEnemies,
    /// Moves every in-flight projectile one tick toward its target.
    AdvanceProjectiles,
    /// Checks whether the base has fallen and ends the game if so.
    EvaluateLifecycle,
    /// Requests a tower at the grid cell enclosing the provided point.
    PlaceTower {
        /// Canvas-space point that was clicked.
        point: Point,
    },
    /// Marks a tower as selected so its range can be presented.
    SelectTower {
        /// Tower to select.
        tower: TowerId,
    },
    /// Attempts to raise a tower by one level.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a new game began.
    GameStarted {
        /// Generation allocated to the game.
        generation: Generation,
        /// Timestamp at which the game started.
        at: Duration,
    },
    /// Announces that the running game ended.
    GameEnded {
        /// Generation of the game that ended.
        generation: Generation,
        /// How the game ended.
        outcome: GameOutcome,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Timestamp of the tick.
        now: Duration,
        /// Time elapsed since the previous tick.
        dt: Duration,
    },
    /// Confirms that a wave entered its spawning phase.
    WaveStarted {
        /// Number of the wave, starting at one.
        wave: u32,
        /// Number of enemies the wave will spawn.
        enemies: u32,
        /// Timestamp at which the wave started.
        at: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Wave the enemy belongs to.
        wave: u32,
    },
    /// Reports that an enemy reached a waypoint.
    EnemyReachedWaypoint {
        /// Enemy that advanced.
        enemy: EnemyId,
        /// Index of the waypoint now behind the enemy.
        path_index: usize,
    },
    /// Reports that an enemy reached the base.
    EnemyBreached {
        /// Enemy that breached. It is no longer live.
        enemy: EnemyId,
        /// Health the base lost.
        damage: i32,
        /// Base health remaining after the breach.
        base_health: i32,
    },
    /// Reports that an enemy was destroyed.
    EnemyKilled {
        /// Enemy that died. It is no longer live.
        enemy: EnemyId,
        /// Money credited for the kill.
        reward: u32,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy targeted by the projectile.
        target: EnemyId,
    },
    /// Reports that a projectile struck its target.
    ProjectileLanded {
        /// Projectile that landed.
        projectile: ProjectileId,
        /// Enemy that was struck.
        target: EnemyId,
        /// Damage applied.
        damage: f32,
    },
    /// Reports that a projectile lost its target before arriving.
    ProjectileWhiffed {
        /// Projectile that was discarded.
        projectile: ProjectileId,
        /// Enemy that was no longer live.
        target: EnemyId,
    },
    /// Confirms that a wave was fully resolved.
    WaveCleared {
        /// Number of the wave that was cleared.
        wave: u32,
        /// Money awarded for the clear.
        bonus: u32,
        /// Timestamp at which the wave cleared.
        at: Duration,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Grid cell the tower occupies.
        cell: CellCoord,
        /// Money spent on the tower.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Canvas-space point provided in the request.
        point: Point,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower became the selected tower.
    TowerSelected {
        /// Tower that was selected.
        tower: TowerId,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level reached after the upgrade.
        level: u32,
        /// Money spent on the upgrade.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Tower targeted by the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Counter identifying one game session.
///
/// The world bumps the generation on every start. Scheduled work carries the
/// generation it was issued for, so work left over from a stopped game can be
/// recognised and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// Creates a generation with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the generation.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Position in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        self.to_vec2().distance(other.to_vec2())
    }

    /// Moves at most `step` units toward `target`, never overshooting it.
    #[must_use]
    pub fn step_toward(self, target: Point, step: f32) -> Point {
        let from = self.to_vec2();
        let delta = target.to_vec2() - from;
        let length = delta.length();
        if length <= step || length <= f32::EPSILON {
            return target;
        }
        Point::from_vec2(from + delta / length * step)
    }

    /// Converts the point into a `glam` vector.
    #[must_use]
    pub const fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Creates a point from a `glam` vector.
    #[must_use]
    pub const fn from_vec2(vector: Vec2) -> Self {
        Self {
            x: vector.x,
            y: vector.y,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Ordered waypoint sequence traversed by every enemy.
///
/// The first waypoint is the spawn point and the last one is the base. A path
/// always holds at least two waypoints and is never mutated once built.
/// Deserialization applies the same check as [`Path::from_waypoints`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PathWaypoints")]
pub struct Path {
    waypoints: Vec<Point>,
}

#[derive(Deserialize)]
struct PathWaypoints {
    waypoints: Vec<Point>,
}

impl TryFrom<PathWaypoints> for Path {
    type Error = PathError;

    fn try_from(raw: PathWaypoints) -> Result<Self, Self::Error> {
        let found = raw.waypoints.len();
        Self::from_waypoints(raw.waypoints).ok_or(PathError::TooFewWaypoints { found })
    }
}

/// Reasons a waypoint list cannot form a [`Path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// Spawn and base need distinct waypoints.
    #[error("a path needs at least two waypoints, found {found}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        found: usize,
    },
}

impl Path {
    /// Builds a path, returning `None` when fewer than two waypoints are given.
    #[must_use]
    pub fn from_waypoints(waypoints: Vec<Point>) -> Option<Self> {
        if waypoints.len() < 2 {
            return None;
        }
        Some(Self { waypoints })
    }

    /// Waypoints in traversal order.
    #[must_use]
    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Number of waypoints in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Present for parity with `len`. Construction and deserialization both
    /// require two waypoints, so this is `false` for every path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Index of the final waypoint.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Waypoint stored at the provided index.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Point> {
        self.waypoints.get(index).copied()
    }

    /// Point where enemies enter the path.
    #[must_use]
    pub fn spawn(&self) -> Point {
        self.waypoints[0]
    }

    /// Point enemies attempt to reach.
    #[must_use]
    pub fn base(&self) -> Point {
        self.waypoints[self.last_index()]
    }

    /// Shortest distance from `point` to any segment of the path.
    #[must_use]
    pub fn distance_to(&self, point: Point) -> f32 {
        self.waypoints
            .windows(2)
            .map(|segment| distance_to_segment(point, segment[0], segment[1]))
            .fold(f32::INFINITY, f32::min)
    }
}

fn distance_to_segment(point: Point, start: Point, end: Point) -> f32 {
    let p = point.to_vec2();
    let a = start.to_vec2();
    let ab = end.to_vec2() - a;
    let length_sq = ab.length_squared();
    if length_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Rule a tower uses to pick among enemies within range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingPolicy {
    /// Prefer the enemy that reached the highest waypoint index.
    FurthestProgress,
    /// Prefer the enemy closest to the tower.
    NearestToTower,
}

/// Lifecycle of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecyclePhase {
    /// No game has been started yet.
    NotStarted,
    /// The simulation is advancing.
    Running,
    /// The game is over; only a restart leaves this phase.
    Ended(GameOutcome),
}

impl LifecyclePhase {
    /// Reports whether the game is running.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Describes how a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Base health dropped to zero.
    Defeated,
    /// The game was stopped before the base fell.
    Abandoned,
}

/// Phase of the wave scheduler state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// Waiting for the next wave to begin.
    Idle,
    /// Emitting enemies of the current wave.
    Spawning,
    /// All enemies spawned; waiting for the live set to empty.
    Draining,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// No game is running.
    #[error("the game is not running")]
    NotRunning,
    /// The point lies outside the playable area.
    #[error("the cell lies outside the arena")]
    OutOfBounds,
    /// The cell overlaps the enemy path.
    #[error("the cell overlaps the path")]
    OnPath,
    /// The cell already holds a tower.
    #[error("the cell already holds a tower")]
    Occupied,
    /// The player cannot afford a tower.
    #[error("not enough money for a tower")]
    InsufficientFunds,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No game is running.
    #[error("the game is not running")]
    NotRunning,
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The tower reached its level cap.
    #[error("the tower is already at its maximum level")]
    MaxLevel,
    /// The player cannot afford the upgrade.
    #[error("not enough money for the upgrade")]
    InsufficientFunds,
}

/// Why a click produced no change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum Rejection {
    /// Placement was refused.
    #[error("placement rejected: {0}")]
    Placement(PlacementError),
    /// Upgrade was refused.
    #[error("upgrade rejected: {0}")]
    Upgrade(UpgradeError),
    /// A tower click landed on a cell without a tower.
    #[error("no tower at the clicked cell")]
    NoTower,
}

/// Action taken in response to a click, reported back to the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    /// A new tower was built.
    Placed {
        /// Tower that was created.
        tower: TowerId,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// An existing tower became selected.
    Selected {
        /// Tower that was selected.
        tower: TowerId,
    },
    /// The selected tower gained a level.
    Upgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level reached.
        level: u32,
    },
    /// Nothing changed.
    Rejected(Rejection),
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Grid cell occupied by the tower.
    pub cell: CellCoord,
    /// Centre of the occupied cell.
    pub position: Point,
    /// Current level, starting at one.
    pub level: u32,
    /// Targeting radius.
    pub range: f32,
    /// Damage dealt by each projectile.
    pub damage: f32,
    /// Minimum time between consecutive shots.
    pub fire_interval: Duration,
    /// Timestamp of the last shot, if any.
    pub last_fire: Option<Duration>,
    /// Cost of the next upgrade, or `None` at the level cap.
    pub upgrade_cost: Option<u32>,
}

/// Read-only snapshot describing all towers in deterministic order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Current position.
    pub position: Point,
    /// Index of the last waypoint reached.
    pub path_index: usize,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Distance covered per tick.
    pub speed: f32,
    /// Money credited when the enemy is killed.
    pub reward: u32,
}

/// Read-only snapshot describing all live enemies in spawn order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemy is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Current position.
    pub position: Point,
    /// Enemy the projectile homes in on.
    pub target: EnemyId,
    /// Damage applied on arrival.
    pub damage: f32,
    /// Distance covered per tick.
    pub speed: f32,
}

/// Cooldown state of a tower relative to the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower described by the snapshot.
    pub tower: TowerId,
    /// Time remaining before the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only view of tower cooldowns ordered by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the snapshots in tower order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Remaining cooldown of `tower`, or `None` if the view does not know it.
    #[must_use]
    pub fn ready_in(&self, tower: TowerId) -> Option<Duration> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.tower)
            .ok()
            .map(|index| self.snapshots[index].ready_in)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Target assignment computed for a tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that would fire.
    pub tower: TowerId,
    /// Enemy selected by the tower's targeting policy.
    pub enemy: EnemyId,
}

/// Money, health and score bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EconomySnapshot {
    /// Money available for towers and upgrades.
    pub money: u32,
    /// Remaining base health. The game is lost at zero or below.
    pub base_health: i32,
    /// Enemies killed this game.
    pub kills: u32,
}

/// Wave counters maintained by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WaveSnapshot {
    /// Generation of the current game.
    pub generation: Generation,
    /// Number of the current wave, starting at one.
    pub number: u32,
    /// Enemies spawned so far in the current wave.
    pub enemies_spawned: u32,
    /// Enemies the current wave spawns in total.
    pub enemies_per_wave: u32,
    /// Whether the current wave has begun and not yet been cleared.
    pub in_progress: bool,
    /// Enemies currently live.
    pub live_enemies: u32,
}

impl WaveSnapshot {
    /// Reports whether every enemy of the wave has been spawned.
    #[must_use]
    pub const fn spawning_complete(&self) -> bool {
        self.in_progress && self.enemies_spawned >= self.enemies_per_wave
    }
}

/// Cumulative counters collected over one game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GameStatistics {
    /// Money spent on towers and upgrades.
    pub money_spent: u32,
    /// Money earned from kills and wave bonuses.
    pub money_earned: u32,
    /// Enemies that reached the base.
    pub enemies_breached: u32,
    /// Projectiles launched by towers.
    pub projectiles_fired: u32,
    /// Projectiles discarded because their target vanished.
    pub projectiles_whiffed: u32,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        CellCoord, ClickOutcome, Generation, Path, PathError, PlacementError, Point, Rejection,
        TowerCooldownSnapshot, TowerCooldownView, TowerId, UpgradeError,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn click_outcome_round_trips_through_bincode() {
        assert_round_trip(&ClickOutcome::Placed {
            tower: TowerId::new(3),
            cell: CellCoord::new(4, 1),
        });
        assert_round_trip(&ClickOutcome::Rejected(Rejection::Upgrade(
            UpgradeError::MaxLevel,
        )));
    }

    #[test]
    fn path_requires_two_waypoints() {
        assert!(Path::from_waypoints(Vec::new()).is_none());
        assert!(Path::from_waypoints(vec![Point::new(0.0, 0.0)]).is_none());
        let path = Path::from_waypoints(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
            .expect("two waypoints form a path");
        assert_eq!(path.len(), 2);
        assert_eq!(path.last_index(), 1);
        assert_eq!(path.spawn(), Point::new(0.0, 0.0));
        assert_eq!(path.base(), Point::new(10.0, 0.0));
    }

    #[test]
    fn decoding_rejects_short_paths() {
        let path = Path::from_waypoints(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
            .expect("two waypoints form a path");
        assert_round_trip(&path);

        // A path is encoded as its waypoint list.
        for waypoints in [Vec::new(), vec![Point::new(4.0, 4.0)]] {
            let bytes = bincode::serialize(&waypoints).expect("serialize");
            let decoded = bincode::deserialize::<Path>(&bytes);
            assert!(decoded.is_err(), "{} waypoints decoded", waypoints.len());
        }
    }

    #[test]
    fn short_path_error_reports_count() {
        let error = PathError::TooFewWaypoints { found: 1 };
        assert_eq!(
            error.to_string(),
            "a path needs at least two waypoints, found 1"
        );
    }

    #[test]
    fn path_distance_measures_to_nearest_segment() {
        let path = Path::from_waypoints(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ])
        .expect("valid path");

        assert!((path.distance_to(Point::new(5.0, 3.0)) - 3.0).abs() < 1e-5);
        assert!((path.distance_to(Point::new(13.0, 5.0)) - 3.0).abs() < 1e-5);
        assert!((path.distance_to(Point::new(-4.0, 3.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn step_toward_never_overshoots() {
        let origin = Point::new(0.0, 0.0);
        let target = Point::new(3.0, 4.0);

        let partial = origin.step_toward(target, 2.5);
        assert!((partial.distance(origin) - 2.5).abs() < 1e-5);
        assert!((partial.distance(target) - 2.5).abs() < 1e-5);

        assert_eq!(origin.step_toward(target, 7.0), target);
    }

    #[test]
    fn generation_advances_monotonically() {
        let first = Generation::default();
        assert_eq!(first.next().get(), 1);
        assert!(first.next() > first);
    }

    #[test]
    fn rejection_messages_name_the_cause() {
        let rejection = Rejection::Placement(PlacementError::OnPath);
        assert_eq!(
            rejection.to_string(),
            "placement rejected: the cell overlaps the path"
        );
    }

    #[test]
    fn cooldown_lookup_uses_tower_order() {
        let view = TowerCooldownView::from_snapshots(vec![
            TowerCooldownSnapshot {
                tower: TowerId::new(4),
                ready_in: Duration::from_millis(300),
            },
            TowerCooldownSnapshot {
                tower: TowerId::new(1),
                ready_in: Duration::ZERO,
            },
        ]);

        assert_eq!(view.ready_in(TowerId::new(1)), Some(Duration::ZERO));
        assert_eq!(
            view.ready_in(TowerId::new(4)),
            Some(Duration::from_millis(300))
        );
        assert_eq!(view.ready_in(TowerId::new(2)), None);
    }
}
