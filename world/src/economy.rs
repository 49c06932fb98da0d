//! Money, base health and score bookkeeping.

use path_defence_core::{EconomyBalance, EconomySnapshot, GameStatistics};

/// Wallet and scoreboard of one game.
///
/// Money is unsigned and only leaves through [`Economy::spend`], which refuses
/// to overdraw.
#[derive(Clone, Debug)]
pub(crate) struct Economy {
    money: u32,
    base_health: i32,
    kills: u32,
    statistics: GameStatistics,
}

impl Economy {
    pub(crate) fn new(balance: &EconomyBalance) -> Self {
        Self {
            money: balance.starting_money,
            base_health: balance.base_health,
            kills: 0,
            statistics: GameStatistics::default(),
        }
    }

    /// Deducts `cost`, returning `false` without change when unaffordable.
    pub(crate) fn spend(&mut self, cost: u32) -> bool {
        let Some(remaining) = self.money.checked_sub(cost) else {
            return false;
        };
        self.money = remaining;
        self.statistics.money_spent = self.statistics.money_spent.saturating_add(cost);
        true
    }

    pub(crate) fn earn(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
        self.statistics.money_earned = self.statistics.money_earned.saturating_add(amount);
    }

    pub(crate) fn credit_kill(&mut self, reward: u32) {
        self.kills = self.kills.saturating_add(1);
        self.earn(reward);
    }

    /// Applies breach damage and returns the remaining base health.
    pub(crate) fn breach(&mut self, damage: i32) -> i32 {
        self.base_health = self.base_health.saturating_sub(damage);
        self.statistics.enemies_breached = self.statistics.enemies_breached.saturating_add(1);
        self.base_health
    }

    pub(crate) fn base_destroyed(&self) -> bool {
        self.base_health <= 0
    }

    pub(crate) fn record_shot(&mut self) {
        self.statistics.projectiles_fired = self.statistics.projectiles_fired.saturating_add(1);
    }

    pub(crate) fn record_whiff(&mut self) {
        self.statistics.projectiles_whiffed =
            self.statistics.projectiles_whiffed.saturating_add(1);
    }

    pub(crate) fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            money: self.money,
            base_health: self.base_health,
            kills: self.kills,
        }
    }

    pub(crate) fn statistics(&self) -> GameStatistics {
        self.statistics
    }
}
