//! Homing projectiles in flight.

use std::collections::BTreeMap;

use path_defence_core::{EnemyId, Point, ProjectileId, ProjectileSnapshot};

/// Result of moving a projectile for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    /// Still closing in.
    InFlight,
    /// Within one step of the target; damage is due.
    Arrived,
    /// Target is gone; the projectile is discarded without effect.
    Lost,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    id: ProjectileId,
    position: Point,
    target: EnemyId,
    damage: f32,
    speed: f32,
}

impl Projectile {
    pub(crate) fn target(&self) -> EnemyId {
        self.target
    }

    pub(crate) fn damage(&self) -> f32 {
        self.damage
    }

    /// Steps toward the target's current position, or reports the target lost
    /// when `target_position` is `None`.
    pub(crate) fn advance(&mut self, target_position: Option<Point>) -> Flight {
        let Some(target) = target_position else {
            return Flight::Lost;
        };

        if self.position.distance(target) < self.speed {
            self.position = target;
            return Flight::Arrived;
        }

        self.position = self.position.step_toward(target, self.speed);
        Flight::InFlight
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            damage: self.damage,
            speed: self.speed,
        }
    }
}

/// Projectiles keyed by identifier, iterated in launch order.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn launch(
        &mut self,
        origin: Point,
        target: EnemyId,
        damage: f32,
        speed: f32,
    ) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            Projectile {
                id,
                position: origin,
                target,
                damage,
                speed,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, projectile: ProjectileId) -> Option<&mut Projectile> {
        self.entries.get_mut(&projectile)
    }

    pub(crate) fn remove(&mut self, projectile: ProjectileId) -> Option<Projectile> {
        self.entries.remove(&projectile)
    }

    /// Identifiers in launch order, detached from the registry borrow.
    pub(crate) fn ids(&self) -> Vec<ProjectileId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projectile_homes_on_moving_target() {
        let mut registry = ProjectileRegistry::new();
        let id = registry.launch(Point::new(0.0, 0.0), EnemyId::new(1), 10.0, 5.0);
        let projectile = registry.get_mut(id).expect("projectile exists");

        assert_eq!(
            projectile.advance(Some(Point::new(20.0, 0.0))),
            Flight::InFlight
        );
        assert_eq!(projectile.snapshot().position, Point::new(5.0, 0.0));

        assert_eq!(
            projectile.advance(Some(Point::new(5.0, 20.0))),
            Flight::InFlight
        );
        assert_eq!(projectile.snapshot().position, Point::new(5.0, 5.0));
    }

    #[test]
    fn projectile_arrives_within_one_step() {
        let mut registry = ProjectileRegistry::new();
        let id = registry.launch(Point::new(0.0, 0.0), EnemyId::new(1), 10.0, 5.0);
        let projectile = registry.get_mut(id).expect("projectile exists");

        assert_eq!(
            projectile.advance(Some(Point::new(4.9, 0.0))),
            Flight::Arrived
        );
    }

    #[test]
    fn projectile_without_target_is_lost() {
        let mut registry = ProjectileRegistry::new();
        let id = registry.launch(Point::new(0.0, 0.0), EnemyId::new(1), 10.0, 5.0);
        let projectile = registry.get_mut(id).expect("projectile exists");

        assert_eq!(projectile.advance(None), Flight::Lost);
        assert!(registry.remove(id).is_some());
        assert!(registry.ids().is_empty());
    }
}
