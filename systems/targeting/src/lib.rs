#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides what a unit does with its turn.
//!
//! A unit next to an enemy attacks the weakest one. Otherwise it picks the
//! nearest reachable cell next to any enemy and takes the first step of a
//! shortest path toward it. Every tie is broken in reading order.

use cavern_skirmish_core::{Action, CellCoord, OccupancyView, UnitId, UnitSnapshot, UnitView};
use cavern_skirmish_system_pathfinding::{PathError, PathFinder};
use cavern_skirmish_world::Cavern;
use thiserror::Error;

/// Failures that indicate the selector was handed an inconsistent world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TargetingError {
    /// The distance search rejected its input.
    #[error(transparent)]
    Path(#[from] PathError),
    /// The acting unit is missing from the unit view.
    #[error("unit {} is not part of the combat", unit.get())]
    UnknownUnit {
        /// Identifier of the acting unit.
        unit: UnitId,
    },
    /// The acting unit already died.
    #[error("unit {} cannot act because it is dead", unit.get())]
    UnitNotAlive {
        /// Identifier of the acting unit.
        unit: UnitId,
    },
    /// The destination was reachable yet no neighbour lies on a shortest path.
    #[error("unit {} has no step toward reachable cell {destination:?}", unit.get())]
    NoShortestStep {
        /// Identifier of the acting unit.
        unit: UnitId,
        /// Cell the unit was heading for.
        destination: CellCoord,
    },
}

/// Target selector that reuses its search and scratch buffers between turns.
#[derive(Debug, Default)]
pub struct TargetSelector {
    path_finder: PathFinder,
    in_range: Vec<CellCoord>,
}

impl TargetSelector {
    /// Creates a new target selector with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses the acting unit's action for the current turn.
    ///
    /// Attacking takes priority over moving. The caller is expected to give a
    /// unit that moved a second chance to attack via [`select_attack`].
    pub fn select(
        &mut self,
        unit: UnitId,
        cavern: &Cavern,
        occupancy: OccupancyView<'_>,
        units: &UnitView,
    ) -> Result<Action, TargetingError> {
        let actor = acting_unit(units, unit)?;

        if let Some(target) = select_attack(actor, cavern, occupancy, units) {
            return Ok(Action::Attack { target });
        }

        Ok(match self.plan_move(actor, cavern, occupancy, units)? {
            Some(to) => Action::Move { to },
            None => Action::Idle,
        })
    }

    /// Plans a single step toward the nearest cell adjacent to an enemy.
    ///
    /// Returns `Ok(None)` when no such cell exists or none is reachable.
    pub fn plan_move(
        &mut self,
        actor: &UnitSnapshot,
        cavern: &Cavern,
        occupancy: OccupancyView<'_>,
        units: &UnitView,
    ) -> Result<Option<CellCoord>, TargetingError> {
        self.collect_in_range(actor, cavern, occupancy, units);
        if self.in_range.is_empty() {
            return Ok(None);
        }

        let distances = self
            .path_finder
            .shortest_distances(cavern, occupancy, actor.cell)?;
        let nearest = self
            .in_range
            .iter()
            .filter_map(|&cell| distances.distance(cell).map(|distance| (distance, cell)))
            .min();

        let Some((distance, destination)) = nearest else {
            return Ok(None);
        };

        let remaining = distance.saturating_sub(1);
        let from_destination = self
            .path_finder
            .shortest_distances(cavern, occupancy, destination)?;

        cavern
            .neighbors(actor.cell)
            .iter()
            .copied()
            .filter(|&cell| occupancy.is_free(cell))
            .find(|&cell| from_destination.distance(cell) == Some(remaining))
            .map(Some)
            .ok_or(TargetingError::NoShortestStep {
                unit: actor.id,
                destination,
            })
    }

    fn collect_in_range(
        &mut self,
        actor: &UnitSnapshot,
        cavern: &Cavern,
        occupancy: OccupancyView<'_>,
        units: &UnitView,
    ) {
        self.in_range.clear();

        for enemy in units.living().filter(|unit| unit.faction != actor.faction) {
            self.in_range.extend(
                cavern
                    .neighbors(enemy.cell)
                    .iter()
                    .copied()
                    .filter(|&cell| occupancy.is_free(cell)),
            );
        }

        self.in_range.sort_unstable();
        self.in_range.dedup();
    }
}

/// Picks the adjacent enemy with the fewest hit points, if any.
///
/// Candidates are visited in the fixed neighbour order, which is reading
/// order, so the first candidate wins among equally wounded enemies.
#[must_use]
pub fn select_attack(
    actor: &UnitSnapshot,
    cavern: &Cavern,
    occupancy: OccupancyView<'_>,
    units: &UnitView,
) -> Option<UnitId> {
    let mut best: Option<AttackCandidate> = None;

    for &cell in cavern.neighbors(actor.cell) {
        let Some(occupant) = occupancy.occupant(cell) else {
            continue;
        };
        let Some(enemy) = units.get(occupant) else {
            continue;
        };
        if !enemy.alive || enemy.faction == actor.faction {
            continue;
        }

        let candidate = AttackCandidate {
            unit: enemy.id,
            hit_points: enemy.hit_points,
            cell,
        };

        match &mut best {
            Some(existing) => {
                if candidate.precedes(existing) {
                    *existing = candidate;
                }
            }
            None => best = Some(candidate),
        }
    }

    best.map(|candidate| candidate.unit)
}

fn acting_unit(units: &UnitView, unit: UnitId) -> Result<&UnitSnapshot, TargetingError> {
    let actor = units
        .get(unit)
        .ok_or(TargetingError::UnknownUnit { unit })?;
    if actor.alive {
        Ok(actor)
    } else {
        Err(TargetingError::UnitNotAlive { unit })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct AttackCandidate {
    unit: UnitId,
    hit_points: u32,
    cell: CellCoord,
}

impl AttackCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.hit_points != other.hit_points {
            return self.hit_points < other.hit_points;
        }

        self.cell < other.cell
    }
}
