//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use path_defence_core::{
    CellCoord, Point, TowerBalance, TowerCooldownSnapshot, TowerId, TowerSnapshot, UpgradeError,
};

use crate::economy::Economy;

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    id: TowerId,
    cell: CellCoord,
    position: Point,
    level: u32,
    range: f32,
    damage: f32,
    fire_interval: Duration,
    last_fire: Option<Duration>,
}

impl Tower {
    fn new(id: TowerId, cell: CellCoord, position: Point, balance: &TowerBalance) -> Self {
        Self {
            id,
            cell,
            position,
            level: 1,
            range: balance.range(1),
            damage: balance.damage(1),
            fire_interval: balance.fire_interval(1),
            last_fire: None,
        }
    }

    pub(crate) fn position(&self) -> Point {
        self.position
    }

    pub(crate) fn range(&self) -> f32 {
        self.range
    }

    pub(crate) fn damage(&self) -> f32 {
        self.damage
    }

    /// Time left before the tower may fire at `now`. A tower that never fired
    /// is ready immediately.
    pub(crate) fn ready_in(&self, now: Duration) -> Duration {
        match self.last_fire {
            None => Duration::ZERO,
            Some(fired_at) => self
                .fire_interval
                .saturating_sub(now.saturating_sub(fired_at)),
        }
    }

    pub(crate) fn record_shot(&mut self, now: Duration) {
        self.last_fire = Some(now);
    }

    /// Raises the tower one level, paying from `economy`.
    ///
    /// Returns the amount paid. Nothing changes on failure.
    pub(crate) fn upgrade(
        &mut self,
        balance: &TowerBalance,
        economy: &mut Economy,
    ) -> Result<u32, UpgradeError> {
        if !balance.can_upgrade(self.level) {
            return Err(UpgradeError::MaxLevel);
        }

        let cost = balance.upgrade_cost(self.level);
        if !economy.spend(cost) {
            return Err(UpgradeError::InsufficientFunds);
        }

        self.level += 1;
        self.range = balance.range(self.level);
        self.damage = balance.damage(self.level);
        self.fire_interval = balance.fire_interval(self.level);
        Ok(cost)
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    pub(crate) fn snapshot(&self, balance: &TowerBalance) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            cell: self.cell,
            position: self.position,
            level: self.level,
            range: self.range,
            damage: self.damage,
            fire_interval: self.fire_interval,
            last_fire: self.last_fire,
            upgrade_cost: balance
                .can_upgrade(self.level)
                .then(|| balance.upgrade_cost(self.level)),
        }
    }

    pub(crate) fn cooldown(&self, now: Duration) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: self.id,
            ready_in: self.ready_in(now),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Builds a level-one tower on the provided cell.
    pub(crate) fn build(
        &mut self,
        cell: CellCoord,
        position: Point,
        balance: &TowerBalance,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self
            .entries
            .insert(id, Tower::new(id, cell, position, balance));
        id
    }

    pub(crate) fn get(&self, tower: TowerId) -> Option<&Tower> {
        self.entries.get(&tower)
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&tower)
    }

    /// Tower occupying the provided cell, if any.
    pub(crate) fn at_cell(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .values()
            .find(|tower| tower.cell == cell)
            .map(|tower| tower.id)
    }

    /// Towers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }
}
