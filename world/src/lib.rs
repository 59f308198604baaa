#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cavern Skirmish.
//!
//! The world owns the static [`Cavern`], every unit and the occupancy map. It
//! is mutated exclusively through [`apply`], which validates each command and
//! reports what changed as [`Event`] values. Commands that would break an
//! invariant are rejected with an [`InvariantViolation`] instead of being
//! silently ignored, since continuing would corrupt the final score.

mod cavern;

use cavern_skirmish_core::{
    CellCoord, Command, Event, Faction, UnitId, GOBLIN_ATTACK_POWER, STARTING_HIT_POINTS,
};
use thiserror::Error;

pub use cavern::{Cavern, CellKind, MalformedGridError, ParsedCavern, UnitSeed};

/// Commands that were rejected because executing them would corrupt the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The command referenced a unit the world never loaded.
    #[error("unit {} does not exist", unit.get())]
    UnknownUnit {
        /// Identifier named by the command.
        unit: UnitId,
    },
    /// The command referenced a unit that already died.
    #[error("unit {} is dead", unit.get())]
    UnitNotAlive {
        /// Identifier named by the command.
        unit: UnitId,
    },
    /// A move targeted a cell that does not share an edge with the unit.
    #[error("unit {} cannot step from {from:?} to {to:?}", unit.get())]
    DestinationNotAdjacent {
        /// Unit attempting the move.
        unit: UnitId,
        /// Cell the unit occupies.
        from: CellCoord,
        /// Requested destination.
        to: CellCoord,
    },
    /// A move targeted a wall or a cell outside the grid.
    #[error("unit {} cannot step into non-floor cell {to:?}", unit.get())]
    DestinationNotOpen {
        /// Unit attempting the move.
        unit: UnitId,
        /// Requested destination.
        to: CellCoord,
    },
    /// A move targeted a cell another unit stands on.
    #[error("unit {} cannot step into {to:?} held by unit {}", unit.get(), occupant.get())]
    DestinationOccupied {
        /// Unit attempting the move.
        unit: UnitId,
        /// Requested destination.
        to: CellCoord,
        /// Unit already standing in the destination.
        occupant: UnitId,
    },
    /// An attack targeted a unit of the attacker's own faction.
    #[error("unit {} cannot attack ally {}", attacker.get(), target.get())]
    FriendlyFire {
        /// Unit attempting the attack.
        attacker: UnitId,
        /// Ally named as the target.
        target: UnitId,
    },
    /// An attack targeted a unit that is not adjacent to the attacker.
    #[error("unit {} cannot reach unit {}", attacker.get(), target.get())]
    TargetNotAdjacent {
        /// Unit attempting the attack.
        attacker: UnitId,
        /// Unit named as the target.
        target: UnitId,
    },
}

/// Represents the authoritative Cavern Skirmish world state.
#[derive(Clone, Debug)]
pub struct World {
    cavern: Cavern,
    units: Vec<Unit>,
    occupancy: OccupancyGrid,
    completed_rounds: u32,
}

impl World {
    /// Creates a world from a parsed cavern, arming elves with the given power.
    ///
    /// Units receive identifiers in the reading order of their starting cells.
    #[must_use]
    pub fn new(parsed: ParsedCavern, elf_attack_power: u32) -> Self {
        let ParsedCavern { cavern, seeds } = parsed;
        let units: Vec<Unit> = (0_u32..)
            .zip(seeds)
            .map(|(index, seed)| Unit::from_seed(UnitId::new(index), seed, elf_attack_power))
            .collect();
        let mut occupancy = OccupancyGrid::new(cavern.columns(), cavern.rows());
        occupancy.fill_with(&units);

        Self {
            cavern,
            units,
            occupancy,
            completed_rounds: 0,
        }
    }

    /// Parses grid text and creates a world from it.
    pub fn from_grid_text(text: &str, elf_attack_power: u32) -> Result<Self, MalformedGridError> {
        Cavern::parse(text).map(|parsed| Self::new(parsed, elf_attack_power))
    }

    fn unit_index(&self, unit: UnitId) -> Result<usize, InvariantViolation> {
        let index = self
            .units
            .iter()
            .position(|candidate| candidate.id == unit)
            .ok_or(InvariantViolation::UnknownUnit { unit })?;
        if self.units[index].alive {
            Ok(index)
        } else {
            Err(InvariantViolation::UnitNotAlive { unit })
        }
    }

    fn move_unit(
        &mut self,
        unit: UnitId,
        to: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InvariantViolation> {
        let index = self.unit_index(unit)?;
        let from = self.units[index].cell;

        if !from.is_adjacent(to) {
            return Err(InvariantViolation::DestinationNotAdjacent { unit, from, to });
        }

        if !self.cavern.is_open(to) {
            return Err(InvariantViolation::DestinationNotOpen { unit, to });
        }

        if let Some(occupant) = self.occupancy.occupant(to) {
            return Err(InvariantViolation::DestinationOccupied { unit, to, occupant });
        }

        self.occupancy.vacate(from);
        self.occupancy.occupy(unit, to);
        self.units[index].cell = to;
        out_events.push(Event::UnitMoved { unit, from, to });
        Ok(())
    }

    fn resolve_attack(
        &mut self,
        attacker: UnitId,
        target: UnitId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InvariantViolation> {
        let attacker_index = self.unit_index(attacker)?;
        let target_index = self.unit_index(target)?;

        let (attacker_faction, attacker_cell, damage) = {
            let unit = &self.units[attacker_index];
            (unit.faction, unit.cell, unit.attack_power)
        };

        let defender = &mut self.units[target_index];
        if defender.faction == attacker_faction {
            return Err(InvariantViolation::FriendlyFire { attacker, target });
        }
        if !defender.cell.is_adjacent(attacker_cell) {
            return Err(InvariantViolation::TargetNotAdjacent { attacker, target });
        }

        defender.hit_points = defender.hit_points.saturating_sub(damage);
        out_events.push(Event::UnitAttacked {
            attacker,
            target,
            damage,
            remaining_hit_points: defender.hit_points,
        });

        if defender.hit_points == 0 {
            defender.alive = false;
            let (faction, cell) = (defender.faction, defender.cell);
            self.occupancy.vacate(cell);
            out_events.push(Event::UnitDied {
                unit: target,
                faction,
                cell,
            });
        }

        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Successful commands append the resulting events to `out_events`. Rejected
/// commands leave the world untouched and append nothing.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), InvariantViolation> {
    match command {
        Command::MoveUnit { unit, to } => world.move_unit(unit, to, out_events),
        Command::AttackUnit { attacker, target } => {
            world.resolve_attack(attacker, target, out_events)
        }
        Command::CompleteRound => {
            world.completed_rounds = world.completed_rounds.saturating_add(1);
            out_events.push(Event::RoundCompleted {
                round: world.completed_rounds,
            });
            Ok(())
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Cavern, World};
    use cavern_skirmish_core::{Faction, OccupancyView, UnitId, UnitSnapshot, UnitView};

    /// Provides read-only access to the static cavern layout.
    #[must_use]
    pub fn cavern(world: &World) -> &Cavern {
        &world.cavern
    }

    /// Captures a read-only view of every unit, ordered by reading order.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Captures the snapshot of a single unit.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world
            .units
            .iter()
            .find(|candidate| candidate.id == unit)
            .map(|candidate| candidate.snapshot())
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        let (columns, rows) = world.occupancy.dimensions();
        OccupancyView::new(world.occupancy.cells(), columns, rows)
    }

    /// Number of rounds recorded as fully played.
    #[must_use]
    pub fn completed_rounds(world: &World) -> u32 {
        world.completed_rounds
    }

    /// Counts the living units of the provided faction.
    #[must_use]
    pub fn living_count(world: &World, faction: Faction) -> usize {
        world
            .units
            .iter()
            .filter(|unit| unit.alive && unit.faction == faction)
            .count()
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    faction: Faction,
    cell: CellCoord,
    hit_points: u32,
    attack_power: u32,
    alive: bool,
}

impl Unit {
    fn from_seed(id: UnitId, seed: UnitSeed, elf_attack_power: u32) -> Self {
        let attack_power = match seed.faction {
            Faction::Elf => elf_attack_power,
            Faction::Goblin => GOBLIN_ATTACK_POWER,
        };
        Self {
            id,
            faction: seed.faction,
            cell: seed.cell,
            hit_points: STARTING_HIT_POINTS,
            attack_power,
            alive: true,
        }
    }

    fn snapshot(&self) -> cavern_skirmish_core::UnitSnapshot {
        cavern_skirmish_core::UnitSnapshot {
            id: self.id,
            faction: self.faction,
            cell: self.cell,
            hit_points: self.hit_points,
            attack_power: self.attack_power,
            alive: self.alive,
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<UnitId>>,
}

impl OccupancyGrid {
    fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    fn fill_with(&mut self, units: &[Unit]) {
        self.cells.fill(None);
        for unit in units.iter().filter(|unit| unit.alive) {
            self.occupy(unit.id, unit.cell);
        }
    }

    fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        cell.linear_index(self.columns, self.rows)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, unit: UnitId, cell: CellCoord) {
        if let Some(index) = cell.linear_index(self.columns, self.rows) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(unit);
            }
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = cell.linear_index(self.columns, self.rows) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
    }

    fn cells(&self) -> &[Option<UnitId>] {
        &self.cells
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}
