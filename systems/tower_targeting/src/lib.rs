#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target selection for towers.
//!
//! Range is inclusive. Under [`TargetingPolicy::FurthestProgress`] a tower
//! picks the enemy with the highest path index, and under
//! [`TargetingPolicy::NearestToTower`] the closest one.

use path_defence_core::{
    EnemyId, EnemyView, Point, TargetingPolicy, TowerId, TowerTarget, TowerView,
};

/// Picks at most one enemy per tower each tick.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `out` with this tick's assignments, in tower id order.
    ///
    /// Towers without an enemy in range receive no entry. Ties go to the
    /// enemy that appears first in the view, which is spawn order.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        policy: TargetingPolicy,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.load_towers(towers);
        self.load_enemies(enemies);

        for tower in &self.tower_workspace {
            let mut chosen: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance = tower.position.distance(candidate.position);
                if distance > tower.range {
                    continue;
                }

                let current = BestCandidate {
                    enemy: candidate.id,
                    path_index: candidate.path_index,
                    distance,
                };

                if chosen.map_or(true, |incumbent| current.precedes(&incumbent, policy)) {
                    chosen = Some(current);
                }
            }

            out.extend(chosen.map(|candidate| TowerTarget {
                tower: tower.id,
                enemy: candidate.enemy,
            }));
        }
    }

    fn load_towers(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        self.tower_workspace
            .extend(towers.iter().map(|snapshot| TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.range,
            }));
    }

    fn load_enemies(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        self.enemy_workspace.extend(
            enemies
                .iter()
                .filter(|snapshot| snapshot.health > 0.0)
                .map(|snapshot| EnemyCandidate {
                    id: snapshot.id,
                    position: snapshot.position,
                    path_index: snapshot.path_index,
                }),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Point,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Point,
    path_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    enemy: EnemyId,
    path_index: usize,
    distance: f32,
}

impl BestCandidate {
    /// Strict comparison: an equal candidate never displaces the incumbent.
    fn precedes(&self, other: &Self, policy: TargetingPolicy) -> bool {
        match policy {
            TargetingPolicy::FurthestProgress => self.path_index > other.path_index,
            TargetingPolicy::NearestToTower => self.distance < other.distance,
        }
    }
}
