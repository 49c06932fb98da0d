#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that translates player clicks into tower commands.
//!
//! A click on an empty cell asks for a tower there. A click on a tower selects
//! it, and a click on the tower that is already selected asks for an upgrade.
//! Whether any of these requests succeeds is decided by the world.

use path_defence_core::{Command, Event, Point, TowerId};

/// Which click surface the input arrived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClickKind {
    /// Placement surface: always requests a new tower.
    Placement,
    /// Tower surface: only selects or upgrades existing towers.
    Tower,
    /// Combined surface: acts on a tower if one is present, otherwise places.
    Any,
}

/// Click delivered by the input collaborator in canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuilderInput {
    /// Surface the click arrived from.
    pub kind: ClickKind,
    /// Clicked point, already translated into canvas coordinates.
    pub point: Point,
}

impl BuilderInput {
    /// Creates a new input descriptor.
    #[must_use]
    pub const fn new(kind: ClickKind, point: Point) -> Self {
        Self { kind, point }
    }
}

/// Click interpretation system that mirrors the world's tower selection.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    selected: Option<TowerId>,
}

impl Builder {
    /// Creates a new builder system instance with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Tower the builder believes is selected.
    #[must_use]
    pub const fn selected(&self) -> Option<TowerId> {
        self.selected
    }

    /// Consumes world events and an optional click to emit tower commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at` helper so the system can identify the clicked tower.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: Option<BuilderInput>,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(Point) -> Option<TowerId>,
    {
        for event in events {
            match event {
                Event::GameStarted { .. } | Event::GameEnded { .. } | Event::TowerPlaced { .. } => {
                    self.selected = None;
                }
                Event::TowerSelected { tower } => self.selected = Some(*tower),
                _ => {}
            }
        }

        let Some(input) = input else {
            return;
        };

        let point = input.point;
        let clicked = match input.kind {
            ClickKind::Placement => None,
            ClickKind::Tower | ClickKind::Any => tower_at(point),
        };

        match (input.kind, clicked) {
            (_, Some(tower)) if self.selected == Some(tower) => {
                out.push(Command::UpgradeTower { tower });
            }
            (_, Some(tower)) => out.push(Command::SelectTower { tower }),
            (ClickKind::Placement | ClickKind::Any, None) => {
                out.push(Command::PlaceTower { point });
            }
            (ClickKind::Tower, None) => {}
        }
    }
}
