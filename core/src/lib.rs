#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cavern Skirmish engine.
//!
//! This crate defines the message surface that connects the combat engine, the
//! authoritative world, and the pure decision systems. The engine submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what changed. Systems query immutable views such as [`UnitView`]
//! and [`OccupancyView`] and respond with an [`Action`] for the acting unit.

use serde::{Deserialize, Serialize};

/// Hit points every unit starts combat with.
pub const STARTING_HIT_POINTS: u32 = 200;

/// Attack power shared by every goblin.
pub const GOBLIN_ATTACK_POWER: u32 = 3;

/// Attack power assigned to elves unless a caller overrides it.
pub const DEFAULT_ELF_ATTACK_POWER: u32 = 3;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Moves a living unit one step into an adjacent open, unoccupied cell.
    MoveUnit {
        /// Identifier of the unit that moves.
        unit: UnitId,
        /// Cell the unit steps into.
        to: CellCoord,
    },
    /// Resolves a single attack between two adjacent units of opposing factions.
    AttackUnit {
        /// Identifier of the unit dealing damage.
        attacker: UnitId,
        /// Identifier of the unit receiving damage.
        target: UnitId,
    },
    /// Marks the current round as fully played.
    CompleteRound,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies after moving.
        to: CellCoord,
    },
    /// Confirms that an attack was resolved.
    UnitAttacked {
        /// Identifier of the unit that attacked.
        attacker: UnitId,
        /// Identifier of the unit that was struck.
        target: UnitId,
        /// Hit points removed by the attack.
        damage: u32,
        /// Hit points the target has left after the attack.
        remaining_hit_points: u32,
    },
    /// Announces that a unit died and left the occupancy map.
    UnitDied {
        /// Identifier of the unit that died.
        unit: UnitId,
        /// Faction the unit fought for.
        faction: Faction,
        /// Cell the unit occupied when it died.
        cell: CellCoord,
    },
    /// Announces that every unit alive at the start of the round took its turn.
    RoundCompleted {
        /// One-based number of the round that completed.
        round: u32,
    },
}

/// Decision produced for a unit at the start of its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Attack the adjacent enemy without moving.
    Attack {
        /// Enemy selected for the attack.
        target: UnitId,
    },
    /// Step into the provided neighbouring cell.
    Move {
        /// Cell the unit should step into.
        to: CellCoord,
    },
    /// Nothing to do this turn.
    Idle,
}

/// Side a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// Elves, marked `E` on the grid.
    Elf,
    /// Goblins, marked `G` on the grid.
    Goblin,
}

impl Faction {
    /// Returns the faction this one fights against.
    #[must_use]
    pub const fn enemy(self) -> Self {
        match self {
            Self::Elf => Self::Goblin,
            Self::Goblin => Self::Elf,
        }
    }

    /// Resolves a grid character into a faction, if it marks a unit.
    #[must_use]
    pub const fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'E' => Some(Self::Elf),
            'G' => Some(Self::Goblin),
            _ => None,
        }
    }
}

/// Unique identifier assigned to a unit when the grid is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Cardinal step directions listed in reading order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
    /// Toward increasing row indices.
    Down,
}

impl Direction {
    /// Every direction, ordered so neighbouring cells come out in reading order.
    pub const READING_ORDER: [Direction; 4] = [Self::Up, Self::Left, Self::Right, Self::Down];
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// The derived ordering compares rows first and columns second, which is the
/// reading order used for every tie-break in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in the provided direction.
    ///
    /// Steps that would underflow past row or column zero yield `None`; the
    /// upper bounds are left to the grid that owns the coordinate.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::Up => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::Left => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
            Direction::Right => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::Down => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Row-major offset of the cell inside a `columns` by `rows` grid.
    ///
    /// Returns `None` for cells outside the grid.
    #[must_use]
    pub fn linear_index(self, columns: u32, rows: u32) -> Option<usize> {
        if self.column >= columns || self.row >= rows {
            return None;
        }

        let row = usize::try_from(self.row).ok()?;
        let column = usize::try_from(self.column).ok()?;
        let width = usize::try_from(columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Faction the unit fights for.
    pub faction: Faction,
    /// Cell the unit occupies, or occupied when it died.
    pub cell: CellCoord,
    /// Remaining hit points; zero once the unit died.
    pub hit_points: u32,
    /// Damage dealt by each of the unit's attacks.
    pub attack_power: u32,
    /// Whether the unit is still fighting.
    pub alive: bool,
}

/// Read-only snapshot describing every unit loaded into the cavern.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    ///
    /// Snapshots are stored in reading order of their cells, with identifiers
    /// breaking ties between a living unit and a corpse that shared its cell.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| (snapshot.cell, snapshot.id));
        Self { snapshots }
    }

    /// Iterator over every captured snapshot, dead units included.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the living units in reading order.
    pub fn living(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.alive)
    }

    /// Looks up the snapshot for the provided unit.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == unit)
    }

    /// Identifiers of the living units in initiative (reading) order.
    #[must_use]
    pub fn initiative_order(&self) -> Vec<UnitId> {
        self.living().map(|snapshot| snapshot.id).collect()
    }

    /// Reports whether at least one unit of the faction is still alive.
    #[must_use]
    pub fn has_living(&self, faction: Faction) -> bool {
        self.living().any(|snapshot| snapshot.faction == faction)
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<UnitId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<UnitId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the unit occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        cell.linear_index(self.columns, self.rows)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether no unit stands in the cell.
    ///
    /// Cells outside the grid hold no unit and therefore count as free; callers
    /// combine this with the cavern layout to decide whether a cell is walkable.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.occupant(cell).is_none()
    }
}

/// Summary published once combat stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatReport {
    /// Number of rounds every snapshotted unit got to act in.
    pub completed_rounds: u32,
    /// Faction left standing, or `None` when combat stopped with both alive.
    pub surviving_faction: Option<Faction>,
    /// Sum of the hit points of every living unit.
    pub surviving_hit_point_total: u32,
    /// Completed rounds multiplied by the surviving hit point total.
    pub outcome_score: u64,
    /// Whether at least one elf died during the run.
    pub elf_died: bool,
    /// Attack power the elves fought with.
    pub elf_attack_power: u32,
}
