#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooldown gate between target selection and the world.
//!
//! Each tick the targeting system proposes at most one enemy per tower. This
//! system forwards a proposal as `FireProjectile` only when the tower's
//! cooldown has elapsed. Towers with no proposal are left alone, so a tower
//! that sat idle fires the moment an enemy walks into range.

use log::trace;
use path_defence_core::{Command, TowerCooldownView, TowerId, TowerTarget};

/// Pure system that turns ready towers with targets into firing commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    fired: Vec<TowerId>,
}

impl TowerCombat {
    /// Creates a combat system with an empty per-tick ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::FireProjectile` per ready tower, in proposal order.
    ///
    /// A tower that appears more than once in `targets` fires at its first
    /// proposal only. Towers missing from `cooldowns` never fire.
    pub fn handle(
        &mut self,
        cooldowns: &TowerCooldownView,
        targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        self.fired.clear();

        for proposal in targets {
            if self.fired.contains(&proposal.tower) {
                continue;
            }
            match cooldowns.ready_in(proposal.tower) {
                Some(remaining) if remaining.is_zero() => {
                    self.fired.push(proposal.tower);
                    out.push(Command::FireProjectile {
                        tower: proposal.tower,
                        target: proposal.enemy,
                    });
                }
                Some(remaining) => trace!(
                    "tower {} holds fire for {remaining:?}",
                    proposal.tower.get()
                ),
                None => trace!("tower {} has no cooldown entry", proposal.tower.get()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use path_defence_core::{EnemyId, TowerCooldownSnapshot};

    use super::*;

    fn cooldowns(entries: &[(u32, u64)]) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            entries
                .iter()
                .map(|&(tower, millis)| TowerCooldownSnapshot {
                    tower: TowerId::new(tower),
                    ready_in: Duration::from_millis(millis),
                })
                .collect(),
        )
    }

    fn proposal(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
        }
    }

    fn fire(tower: u32, enemy: u32) -> Command {
        Command::FireProjectile {
            tower: TowerId::new(tower),
            target: EnemyId::new(enemy),
        }
    }

    #[test]
    fn idle_towers_emit_nothing() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();
        combat.handle(&cooldowns(&[(1, 0)]), &[], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn ready_towers_fire_in_proposal_order() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();
        combat.handle(
            &cooldowns(&[(5, 0), (2, 0)]),
            &[proposal(2, 4), proposal(5, 1)],
            &mut out,
        );
        assert_eq!(out, vec![fire(2, 4), fire(5, 1)]);
    }

    #[test]
    fn cooling_and_unknown_towers_hold_fire() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();
        combat.handle(
            &cooldowns(&[(3, 250), (8, 0)]),
            &[proposal(3, 9), proposal(8, 2), proposal(42, 3)],
            &mut out,
        );
        assert_eq!(out, vec![fire(8, 2)]);
    }

    #[test]
    fn duplicate_proposals_fire_once() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();
        combat.handle(
            &cooldowns(&[(0, 0)]),
            &[proposal(0, 7), proposal(0, 1)],
            &mut out,
        );
        assert_eq!(out, vec![fire(0, 7)]);

        out.clear();
        combat.handle(&cooldowns(&[(0, 0)]), &[proposal(0, 1)], &mut out);
        assert_eq!(out, vec![fire(0, 1)], "ledger resets every tick");
    }
}
