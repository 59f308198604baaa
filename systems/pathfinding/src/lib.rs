#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first distance search over the cavern that respects occupancy.
//!
//! The search never records parent pointers. Callers that need a route compare
//! distances computed from the destination instead, which keeps tie-breaking in
//! reading order independent of the order the frontier was expanded in.

use std::collections::VecDeque;

use cavern_skirmish_core::{CellCoord, OccupancyView};
use cavern_skirmish_world::Cavern;
use thiserror::Error;

/// Failures raised when the search is asked to do something impossible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The search was asked to start on a wall or outside the grid.
    #[error("cannot search from non-floor cell {cell:?}")]
    SourceNotOpen {
        /// Requested source cell.
        cell: CellCoord,
    },
}

/// Dense shortest-distance field produced by a single search.
///
/// Distances are stored in row-major order; cells the search could not reach
/// hold no distance.
#[derive(Clone, Debug, Default)]
pub struct DistanceMap {
    columns: u32,
    rows: u32,
    distances: Vec<Option<u32>>,
}

impl DistanceMap {
    /// Shortest number of steps from the source to the cell, if reachable.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        cell.linear_index(self.columns, self.rows)
            .and_then(|index| self.distances.get(index).copied().flatten())
    }

    /// Iterator over every reachable cell and its distance, in reading order.
    pub fn reachable(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
        let columns = self.columns.max(1);
        (0_u32..).zip(self.distances.iter()).filter_map(move |(offset, distance)| {
            distance.map(|steps| (CellCoord::new(offset % columns, offset / columns), steps))
        })
    }

    fn reset(&mut self, columns: u32, rows: u32) {
        let cell_count_u64 = u64::from(columns) * u64::from(rows);
        let cell_count = usize::try_from(cell_count_u64).unwrap_or(0);

        if self.distances.len() == cell_count {
            self.distances.fill(None);
        } else {
            self.distances = vec![None; cell_count];
        }

        self.columns = columns;
        self.rows = rows;
    }

    fn record(&mut self, cell: CellCoord, distance: u32) {
        if let Some(index) = cell.linear_index(self.columns, self.rows) {
            if let Some(slot) = self.distances.get_mut(index) {
                *slot = Some(distance);
            }
        }
    }
}

/// Breadth-first search that reuses its scratch buffers across invocations.
#[derive(Debug, Default)]
pub struct PathFinder {
    field: DistanceMap,
    frontier: VecDeque<CellCoord>,
}

impl PathFinder {
    /// Creates a path finder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the shortest distance from `source` to every reachable cell.
    ///
    /// A cell is traversable when it is open floor and either unoccupied or the
    /// source itself, so the searching unit never blocks its own expansion.
    /// The returned map stays valid until the next search.
    pub fn shortest_distances(
        &mut self,
        cavern: &Cavern,
        occupancy: OccupancyView<'_>,
        source: CellCoord,
    ) -> Result<&DistanceMap, PathError> {
        if !cavern.is_open(source) {
            return Err(PathError::SourceNotOpen { cell: source });
        }

        self.field.reset(cavern.columns(), cavern.rows());
        self.frontier.clear();
        self.field.record(source, 0);
        self.frontier.push_back(source);

        while let Some(cell) = self.frontier.pop_front() {
            let Some(current) = self.field.distance(cell) else {
                continue;
            };
            let next = current.saturating_add(1);

            for &neighbor in cavern.neighbors(cell) {
                if !occupancy.is_free(neighbor) {
                    continue;
                }

                if self.field.distance(neighbor).is_some() {
                    continue;
                }

                self.field.record(neighbor, next);
                self.frontier.push_back(neighbor);
            }
        }

        Ok(&self.field)
    }
}
