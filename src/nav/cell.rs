//! Navmesh cells and per-search scores

use std::hash::{Hash, Hasher};

use glam::Vec2;
use smallvec::SmallVec;

use crate::geometry::Rect;

/// Grid coordinates of a cell (row-major)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    /// Row index, growing downwards
    pub row: usize,
    /// Column index, growing to the right
    pub col: usize,
}

impl CellId {
    /// Create a new cell id
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Up to eight neighbours, stored inline
pub type Neighbors = SmallVec<[CellId; 8]>;

/// One fixed-size square of the navigation grid.
///
/// Geometry, traversability and adjacency are fixed once the owning mesh is
/// built. Search costs are not stored here; see [`CellScore`].
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    rect: Rect,
    active: bool,
    pub(crate) neighbors: Neighbors,
}

impl Cell {
    /// Create a cell with no neighbours yet
    #[must_use]
    pub fn new(id: CellId, rect: Rect, active: bool) -> Self {
        Self {
            id,
            rect,
            active,
            neighbors: Neighbors::new(),
        }
    }

    /// Grid coordinates
    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// World-space bounds
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// World-space centre
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Whether agents may traverse this cell
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Active cells adjacent to this one (orthogonal and diagonal)
    #[must_use]
    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    /// Euclidean distance between the centres of two cells
    #[must_use]
    pub fn distance(&self, other: &Cell) -> f32 {
        self.center().distance(other.center())
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.center() == other.center()
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equal centres must hash equally, even across meshes; adding 0.0
        // folds -0.0 into 0.0.
        let center = self.center();
        (center.x + 0.0).to_bits().hash(state);
        (center.y + 0.0).to_bits().hash(state);
    }
}

/// Working registers for one cell during one search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScore {
    g: f32,
    h: f32,
    /// Predecessor on the best known route from the source
    pub connection: Option<CellId>,
}

impl CellScore {
    /// Fresh score with no predecessor
    pub const EMPTY: Self = Self {
        g: 0.0,
        h: 0.0,
        connection: None,
    };

    /// Priority: cost so far plus heuristic
    #[must_use]
    pub fn f(&self) -> f32 {
        self.g + self.h
    }

    /// Best known cost from the source
    #[must_use]
    pub const fn g(&self) -> f32 {
        self.g
    }

    /// Heuristic estimate to the target
    #[must_use]
    pub const fn h(&self) -> f32 {
        self.h
    }

    /// Overwrite the cost so far
    pub fn set_g(&mut self, value: f32) {
        self.g = value;
    }

    /// Overwrite the heuristic estimate
    pub fn set_h(&mut self, value: f32) {
        self.h = value;
    }
}

impl Default for CellScore {
    fn default() -> Self {
        Self::EMPTY
    }
}
