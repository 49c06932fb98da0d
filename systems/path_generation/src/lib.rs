#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that lays out the route enemies follow from the left edge of
//! the arena to the right edge.
//!
//! Two layouts are supported. A straight lane runs along the middle row with
//! evenly spaced waypoints. A winding lane is a seeded random walk that visits
//! every column once and may drift one row up or down after each column; the
//! column counter only ever increases, so generation always terminates.

use log::debug;
use path_defence_core::{ArenaBalance, CellCoord, Path, PathPolicy, Point};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Reasons a path cannot be generated for the provided arena and policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathGenerationError {
    /// The arena has no room for a route.
    #[error("arena must span at least one column and one row")]
    ArenaTooSmall,
    /// A straight lane needs a start and an end.
    #[error("a straight path needs at least two waypoints")]
    TooFewWaypoints,
    /// The turn probability is not a probability.
    #[error("turn probability must lie in [0, 1]")]
    TurnProbability,
}

/// Path generator bound to one arena layout and policy.
#[derive(Clone, Copy, Debug)]
pub struct PathGeneration {
    arena: ArenaBalance,
    policy: PathPolicy,
}

impl PathGeneration {
    /// Creates a generator for the provided arena and policy.
    #[must_use]
    pub const fn new(arena: ArenaBalance, policy: PathPolicy) -> Self {
        Self { arena, policy }
    }

    /// Produces a path. The seed only matters for the branching policy, and
    /// the same seed always yields the same path.
    pub fn generate(&self, seed: u64) -> Result<Path, PathGenerationError> {
        let columns = self.arena.columns();
        let rows = self.arena.rows();
        if columns == 0 || rows == 0 {
            return Err(PathGenerationError::ArenaTooSmall);
        }

        let waypoints = match self.policy {
            PathPolicy::Straight { waypoints } => self.straight(rows, waypoints)?,
            PathPolicy::Branching { turn_probability } => {
                self.branching(columns, rows, turn_probability, seed)?
            }
        };

        debug!(
            "generated {:?} path with {} waypoints",
            self.policy,
            waypoints.len()
        );
        Path::from_waypoints(waypoints).ok_or(PathGenerationError::TooFewWaypoints)
    }

    fn straight(&self, rows: u32, count: usize) -> Result<Vec<Point>, PathGenerationError> {
        if count < 2 {
            return Err(PathGenerationError::TooFewWaypoints);
        }

        let y = self.row_center_y(rows / 2);
        let spacing = self.arena.width / (count - 1) as f32;
        Ok((0..count)
            .map(|index| Point::new(index as f32 * spacing, y))
            .collect())
    }

    fn branching(
        &self,
        columns: u32,
        rows: u32,
        turn_probability: f64,
        seed: u64,
    ) -> Result<Vec<Point>, PathGenerationError> {
        if !(0.0..=1.0).contains(&turn_probability) {
            return Err(PathGenerationError::TurnProbability);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut row = rows / 2;
        let mut waypoints = Vec::with_capacity(columns as usize * 2 + 2);
        waypoints.push(Point::new(0.0, self.row_center_y(row)));

        for column in 0..columns {
            waypoints.push(self.arena.cell_center(CellCoord::new(column, row)));

            if !rng.gen_bool(turn_probability) {
                continue;
            }
            let shifted = if rng.gen_bool(0.5) {
                row.saturating_sub(1)
            } else {
                (row + 1).min(rows - 1)
            };
            if shifted != row {
                row = shifted;
                waypoints.push(self.arena.cell_center(CellCoord::new(column, row)));
            }
        }

        waypoints.push(Point::new(self.arena.width, self.row_center_y(row)));
        Ok(waypoints)
    }

    fn row_center_y(&self, row: u32) -> f32 {
        (row as f32 + 0.5) * self.arena.cell_size
    }
}
