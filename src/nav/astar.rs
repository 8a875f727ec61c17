//! A* pathfinding over a navmesh
//!
//! Positions are snapped to the active cell whose top-left corner is nearest,
//! then searched with Euclidean edge costs between cell centres and a
//! Euclidean heuristic. Search state lives in a
//! [`SearchScratch`] owned by one search at a time, so any number of searches
//! can read the same mesh concurrently.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec2;

use super::cell::{CellId, CellScore};
use super::navmesh::Navmesh;
use crate::core::NavError;

/// Result of pathfinding: cells from source to destination, inclusive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cells: Vec<CellId>,
    cost: f32,
}

impl Path {
    /// A path that goes nowhere; signals that no route exists
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ordered cells, first is the source
    #[must_use]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Number of cells on the path
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if path was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell
    #[must_use]
    pub fn first(&self) -> Option<CellId> {
        self.cells.first().copied()
    }

    /// Last cell
    #[must_use]
    pub fn last(&self) -> Option<CellId> {
        self.cells.last().copied()
    }

    /// Total travelled distance between cell centres
    #[must_use]
    pub const fn cost(&self) -> f32 {
        self.cost
    }

    /// Check whether the path passes through a cell
    #[must_use]
    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains(&id)
    }

    /// Cell centres in world coordinates
    #[must_use]
    pub fn waypoints(&self, mesh: &Navmesh) -> Vec<Vec2> {
        self.cells
            .iter()
            .filter_map(|&id| mesh.cell(id))
            .map(|cell| cell.center())
            .collect()
    }

    /// Consume the path, keeping the cell list
    #[must_use]
    pub fn into_cells(self) -> Vec<CellId> {
        self.cells
    }
}

/// Where a cell stands in the current search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    Open,
    Closed,
}

/// Frontier entry for the priority queue
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    index: usize,
    g: f32,
    h: f32,
    /// Insertion counter, last tie-break
    order: u64,
}

impl OpenEntry {
    fn f(&self) -> f32 {
        self.g + self.h
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: lowest f, then lowest h, then earliest insert
        other
            .f()
            .total_cmp(&self.f())
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-search working registers, indexed by flat cell index
#[derive(Debug, Default)]
pub struct SearchScratch {
    scores: Vec<CellScore>,
    visits: Vec<Visit>,
    open: BinaryHeap<OpenEntry>,
    next_order: u64,
}

impl SearchScratch {
    /// Create scratch space for a mesh with `len` cells
    #[must_use]
    pub fn with_capacity(len: usize) -> Self {
        Self {
            scores: Vec::with_capacity(len),
            visits: Vec::with_capacity(len),
            open: BinaryHeap::new(),
            next_order: 0,
        }
    }

    /// Clear every score and predecessor, resizing to `len` cells
    fn reset(&mut self, len: usize) {
        self.scores.clear();
        self.scores.resize(len, CellScore::EMPTY);
        self.visits.clear();
        self.visits.resize(len, Visit::Unseen);
        self.open.clear();
        self.next_order = 0;
    }

    fn push(&mut self, index: usize) {
        let score = self.scores[index];
        self.open.push(OpenEntry {
            index,
            g: score.g(),
            h: score.h(),
            order: self.next_order,
        });
        self.next_order += 1;
    }

    /// Score of a cell in the last search
    #[must_use]
    pub fn score(&self, index: usize) -> Option<&CellScore> {
        self.scores.get(index)
    }
}

/// Reusable A* searcher.
///
/// Holds its own scratch space, so one `Pathfinder` per thread can search a
/// shared mesh repeatedly without reallocating.
#[derive(Debug, Default)]
pub struct Pathfinder {
    scratch: SearchScratch,
    last_expanded: usize,
}

impl Pathfinder {
    /// Create a pathfinder with empty scratch space
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pathfinder sized for a mesh
    #[must_use]
    pub fn for_mesh(mesh: &Navmesh) -> Self {
        Self {
            scratch: SearchScratch::with_capacity(mesh.len()),
            last_expanded: 0,
        }
    }

    /// Number of cells finalized by the last search
    #[must_use]
    pub const fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    /// Scratch space of the last search
    #[must_use]
    pub const fn scratch(&self) -> &SearchScratch {
        &self.scratch
    }

    /// Find a path between two world positions.
    ///
    /// Returns an empty path when the goal cannot be reached.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::NoActiveCell`] if the mesh has no active cell.
    pub fn find_path(&mut self, mesh: &Navmesh, start: Vec2, goal: Vec2) -> Result<Path, NavError> {
        self.last_expanded = 0;
        let start_index = mesh
            .closest_active_index(start)
            .ok_or(NavError::NoActiveCell)?;
        let goal_index = mesh
            .closest_active_index(goal)
            .ok_or(NavError::NoActiveCell)?;

        let start_cell = mesh.cell_by_index(start_index);
        let goal_cell = mesh.cell_by_index(goal_index);

        if start_cell == goal_cell {
            return Ok(Path {
                cells: vec![start_cell.id()],
                cost: 0.0,
            });
        }

        let scratch = &mut self.scratch;
        scratch.reset(mesh.len());

        scratch.scores[start_index].set_g(0.0);
        scratch.scores[start_index].set_h(start_cell.distance(goal_cell));
        scratch.visits[start_index] = Visit::Open;
        scratch.push(start_index);

        while let Some(entry) = scratch.open.pop() {
            let index = entry.index;

            // Superseded by a cheaper entry for the same cell
            if scratch.visits[index] == Visit::Closed || entry.g > scratch.scores[index].g() {
                continue;
            }

            if index == goal_index {
                let path = reconstruct_path(mesh, scratch, goal_index);
                log::debug!(
                    "A* reached goal {:?} after expanding {} cells, path of {} cells",
                    goal_cell.id(),
                    self.last_expanded,
                    path.len()
                );
                return Ok(path);
            }

            scratch.visits[index] = Visit::Closed;
            self.last_expanded += 1;

            let current = mesh.cell_by_index(index);
            let current_g = scratch.scores[index].g();

            for &neighbor_id in current.neighbors() {
                let Some(neighbor_index) = mesh.index_of(neighbor_id) else {
                    continue;
                };
                let neighbor = mesh.cell_by_index(neighbor_index);
                if !neighbor.is_active() || scratch.visits[neighbor_index] == Visit::Closed {
                    continue;
                }

                let tentative_g = current_g + current.distance(neighbor);
                let in_open = scratch.visits[neighbor_index] == Visit::Open;

                if !in_open || tentative_g < scratch.scores[neighbor_index].g() {
                    let score = &mut scratch.scores[neighbor_index];
                    score.set_g(tentative_g);
                    score.connection = Some(current.id());
                    if !in_open {
                        score.set_h(neighbor.distance(goal_cell));
                        scratch.visits[neighbor_index] = Visit::Open;
                    }
                    scratch.push(neighbor_index);
                }
            }
        }

        log::debug!(
            "A* found no route from {:?} to {:?} ({} cells expanded)",
            start_cell.id(),
            goal_cell.id(),
            self.last_expanded
        );
        Ok(Path::empty())
    }
}

/// Find a path using a fresh scratch space
///
/// # Errors
///
/// Returns [`NavError::NoActiveCell`] if the mesh has no active cell.
pub fn find_path(mesh: &Navmesh, start: Vec2, goal: Vec2) -> Result<Path, NavError> {
    Pathfinder::for_mesh(mesh).find_path(mesh, start, goal)
}

/// Walk predecessor links back from the goal
fn reconstruct_path(mesh: &Navmesh, scratch: &SearchScratch, goal_index: usize) -> Path {
    let cost = scratch.scores[goal_index].g();
    let mut cells = vec![mesh.cell_by_index(goal_index).id()];
    let mut current = scratch.scores[goal_index].connection;

    while let Some(id) = current {
        cells.push(id);
        current = mesh
            .index_of(id)
            .and_then(|index| scratch.scores[index].connection);
    }

    cells.reverse();
    Path { cells, cost }
}
