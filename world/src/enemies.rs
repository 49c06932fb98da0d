//! Enemy roster and per-tick movement along the path.

use std::collections::BTreeMap;

use path_defence_core::{EnemyId, EnemySnapshot, EnemyStats, Path, Point};

/// Result of moving an enemy for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Movement {
    /// Still between waypoints.
    Travelling,
    /// Snapped onto the waypoint with the given index.
    ReachedWaypoint(usize),
    /// Snapped onto the final waypoint.
    Breached,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    position: Point,
    path_index: usize,
    health: f32,
    max_health: f32,
    speed: f32,
    reward: u32,
}

impl Enemy {
    fn spawn(id: EnemyId, path: &Path, stats: EnemyStats) -> Self {
        Self {
            id,
            position: path.spawn(),
            path_index: 0,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            reward: stats.reward,
        }
    }

    pub(crate) fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) fn position(&self) -> Point {
        self.position
    }

    pub(crate) fn reward(&self) -> u32 {
        self.reward
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Moves toward the next waypoint.
    ///
    /// An enemy within `speed` of its next waypoint lands exactly on it and
    /// spends the rest of the tick there, so at most one waypoint is consumed
    /// per tick regardless of speed.
    pub(crate) fn advance(&mut self, path: &Path) -> Movement {
        let next_index = self.path_index + 1;
        let Some(target) = path.waypoint(next_index) else {
            return Movement::Breached;
        };

        if self.position.distance(target) <= self.speed {
            self.position = target;
            self.path_index = next_index;
            if next_index == path.last_index() {
                return Movement::Breached;
            }
            return Movement::ReachedWaypoint(next_index);
        }

        self.position = self.position.step_toward(target, self.speed);
        Movement::Travelling
    }

    /// Subtracts `amount` from health. Returns `true` only on the hit that
    /// takes health from above zero to zero or below.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        self.health -= amount;
        was_alive && !self.is_alive()
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            path_index: self.path_index,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            reward: self.reward,
        }
    }
}

/// Live enemies keyed by identifier, iterated in spawn order.
#[derive(Debug)]
pub(crate) struct EnemyRoster {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRoster {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, path: &Path, stats: EnemyStats) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, Enemy::spawn(id, path, stats));
        id
    }

    pub(crate) fn get(&self, enemy: EnemyId) -> Option<&Enemy> {
        self.entries.get(&enemy)
    }

    pub(crate) fn get_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&enemy)
    }

    /// Position of the enemy if it is still live.
    pub(crate) fn live_position(&self, enemy: EnemyId) -> Option<Point> {
        self.get(enemy)
            .filter(|enemy| enemy.is_alive())
            .map(Enemy::position)
    }

    pub(crate) fn remove(&mut self, enemy: EnemyId) -> Option<Enemy> {
        self.entries.remove(&enemy)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
