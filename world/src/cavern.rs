//! Static cavern layout parsed from grid text.

use cavern_skirmish_core::{CellCoord, Direction, Faction};
use thiserror::Error;

const WALL_MARKER: char = '#';
const FLOOR_MARKER: char = '.';

/// Classification of a single cavern cell, fixed at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Floor that units may stand on and walk across.
    Open,
    /// Rock that blocks movement.
    Wall,
}

/// Reasons grid text cannot be turned into a cavern.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MalformedGridError {
    /// The text contained no rows.
    #[error("grid contains no rows")]
    Empty,
    /// A row's width differs from the first row's width.
    #[error("row {row} is {actual} cells wide but the grid is {expected} cells wide")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width established by the first row.
        expected: u32,
        /// Width of the offending row.
        actual: u32,
    },
    /// A character other than a wall, floor or unit marker was found.
    #[error("unrecognised character {character:?} at row {row}, column {column}")]
    UnknownCharacter {
        /// Zero-based row of the character.
        row: u32,
        /// Zero-based column of the character.
        column: u32,
        /// The character that was found.
        character: char,
    },
    /// The grid does not fit into 32-bit coordinates.
    #[error("grid dimensions exceed the supported coordinate range")]
    TooLarge,
}

/// Unit marker discovered while parsing, listed in reading order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitSeed {
    /// Faction encoded by the marker.
    pub faction: Faction,
    /// Open cell the unit starts on.
    pub cell: CellCoord,
}

/// Result of parsing grid text: the static layout plus the starting units.
#[derive(Clone, Debug)]
pub struct ParsedCavern {
    /// Static layout of walls and floor.
    pub cavern: Cavern,
    /// Units found on the grid, in reading order.
    pub seeds: Vec<UnitSeed>,
}

/// Immutable map of open and wall cells with precomputed neighbour lists.
///
/// Neighbour lists are stored per cell in a dense arena and always come out in
/// reading order (up, left, right, down). They never contain walls or cells
/// outside the grid; occupancy is left to the caller.
#[derive(Clone, Debug)]
pub struct Cavern {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    neighbors: Vec<[CellCoord; 4]>,
    neighbor_counts: Vec<u8>,
}

impl Cavern {
    /// Parses grid text into a cavern layout and its starting units.
    pub fn parse(text: &str) -> Result<ParsedCavern, MalformedGridError> {
        let mut lines: Vec<&str> = text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            let _ = lines.pop();
        }

        let Some(first) = lines.first() else {
            return Err(MalformedGridError::Empty);
        };

        let width = first.chars().count();
        if width == 0 {
            return Err(MalformedGridError::Empty);
        }

        let columns = u32::try_from(width).map_err(|_| MalformedGridError::TooLarge)?;
        let rows = u32::try_from(lines.len()).map_err(|_| MalformedGridError::TooLarge)?;
        let capacity = width
            .checked_mul(lines.len())
            .ok_or(MalformedGridError::TooLarge)?;

        let mut cells = Vec::with_capacity(capacity);
        let mut seeds = Vec::new();

        for (row, line) in (0..rows).zip(lines.iter()) {
            let actual = line.chars().count();
            if actual != width {
                return Err(MalformedGridError::RaggedRow {
                    row,
                    expected: columns,
                    actual: u32::try_from(actual).unwrap_or(u32::MAX),
                });
            }

            for (column, character) in (0..columns).zip(line.chars()) {
                let kind = match character {
                    WALL_MARKER => CellKind::Wall,
                    FLOOR_MARKER => CellKind::Open,
                    marker => {
                        let Some(faction) = Faction::from_marker(marker) else {
                            return Err(MalformedGridError::UnknownCharacter {
                                row,
                                column,
                                character,
                            });
                        };
                        seeds.push(UnitSeed {
                            faction,
                            cell: CellCoord::new(column, row),
                        });
                        CellKind::Open
                    }
                };
                cells.push(kind);
            }
        }

        let mut cavern = Self {
            columns,
            rows,
            cells,
            neighbors: Vec::new(),
            neighbor_counts: Vec::new(),
        };
        cavern.link_neighbors();

        Ok(ParsedCavern { cavern, seeds })
    }

    fn link_neighbors(&mut self) {
        let filler = [CellCoord::new(0, 0); 4];
        let mut neighbors = vec![filler; self.cells.len()];
        let mut counts = vec![0_u8; self.cells.len()];

        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = CellCoord::new(column, row);
                if !self.is_open(cell) {
                    continue;
                }
                let Some(index) = cell.linear_index(self.columns, self.rows) else {
                    continue;
                };

                let mut count = 0;
                for direction in Direction::READING_ORDER {
                    if let Some(neighbor) = cell.step(direction) {
                        if self.is_open(neighbor) {
                            neighbors[index][count] = neighbor;
                            count += 1;
                        }
                    }
                }
                counts[index] = count as u8;
            }
        }

        self.neighbors = neighbors;
        self.neighbor_counts = counts;
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Classification of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        cell.linear_index(self.columns, self.rows)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell lies inside the grid and is open floor.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(CellKind::Open)
    }

    /// Open neighbours of the cell in reading order.
    ///
    /// Walls and cells outside the grid have no neighbours.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord) -> &[CellCoord] {
        let Some(index) = cell.linear_index(self.columns, self.rows) else {
            return &[];
        };
        let count = usize::from(self.neighbor_counts.get(index).copied().unwrap_or(0));
        match self.neighbors.get(index) {
            Some(neighbors) => &neighbors[..count],
            None => &[],
        }
    }

    /// Iterator over every open cell in reading order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .filter(|cell| self.is_open(*cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "#######\n#.G.E.#\n#E.G.E#\n#.G.E.#\n#######\n";

    #[test]
    fn parse_classifies_cells_and_collects_units() {
        let parsed = Cavern::parse(SAMPLE).expect("valid grid");
        let cavern = &parsed.cavern;

        assert_eq!(cavern.columns(), 7);
        assert_eq!(cavern.rows(), 5);
        assert_eq!(cavern.kind(CellCoord::new(0, 0)), Some(CellKind::Wall));
        assert_eq!(cavern.kind(CellCoord::new(2, 1)), Some(CellKind::Open));
        assert_eq!(cavern.kind(CellCoord::new(7, 0)), None);
        assert_eq!(cavern.open_cells().count(), 15);

        assert_eq!(parsed.seeds.len(), 7);
        assert_eq!(
            parsed.seeds.first(),
            Some(&UnitSeed {
                faction: Faction::Goblin,
                cell: CellCoord::new(2, 1),
            })
        );
        assert_eq!(
            parsed.seeds.last(),
            Some(&UnitSeed {
                faction: Faction::Elf,
                cell: CellCoord::new(4, 3),
            })
        );
    }

    #[test]
    fn neighbors_follow_reading_order_and_skip_walls() {
        let parsed = Cavern::parse(SAMPLE).expect("valid grid");
        let cavern = &parsed.cavern;

        assert_eq!(
            cavern.neighbors(CellCoord::new(3, 2)),
            &[
                CellCoord::new(3, 1),
                CellCoord::new(2, 2),
                CellCoord::new(4, 2),
                CellCoord::new(3, 3),
            ]
        );
        assert_eq!(
            cavern.neighbors(CellCoord::new(1, 1)),
            &[CellCoord::new(2, 1), CellCoord::new(1, 2)]
        );
        assert!(cavern.neighbors(CellCoord::new(0, 0)).is_empty());
        assert!(cavern.neighbors(CellCoord::new(40, 40)).is_empty());
    }

    #[test]
    fn neighbor_lists_ignore_unit_markers() {
        let parsed = Cavern::parse("#####\n#GEG#\n#####").expect("valid grid");
        assert_eq!(
            parsed.cavern.neighbors(CellCoord::new(2, 1)),
            &[CellCoord::new(1, 1), CellCoord::new(3, 1)]
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = Cavern::parse("####\n#..\n####").expect_err("ragged grid");
        assert_eq!(
            error,
            MalformedGridError::RaggedRow {
                row: 1,
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn unknown_characters_are_rejected() {
        let error = Cavern::parse("####\n#.X#\n####").expect_err("unknown marker");
        assert_eq!(
            error,
            MalformedGridError::UnknownCharacter {
                row: 1,
                column: 2,
                character: 'X',
            }
        );
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(Cavern::parse("").expect_err("empty"), MalformedGridError::Empty);
        assert_eq!(
            Cavern::parse("\n\n  \n").expect_err("blank"),
            MalformedGridError::Empty
        );
    }

    #[test]
    fn carriage_returns_are_tolerated() {
        for text in ["###\r\n#E#\r\n###\r\n", "###\r\n#E#\r\n###\r", "###\r\n#E#\r\n###"] {
            let parsed = Cavern::parse(text).expect("crlf grid");
            assert_eq!(parsed.cavern.columns(), 3);
            assert_eq!(parsed.cavern.rows(), 3);
            assert_eq!(parsed.seeds.len(), 1);
        }
    }
}
