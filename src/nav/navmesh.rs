//! Grid navigation mesh
//!
//! A lattice of square cells laid over the world. Cells overlapping any
//! obstacle on a collidable layer are inactive; adjacency between active cells
//! is computed once at build time. The only state that changes afterwards is
//! the refresh gate that rate-limits path recomputation.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use rustc_hash::FxHashSet;

use super::cell::{Cell, CellId, Neighbors};
use super::obstacles::{LevelGeometry, ObstacleSource};
use crate::core::NavConfig;
use crate::core::NavError;
use crate::core::config::DEFAULT_REFRESH_WINDOW_MS;
use crate::geometry::Rect;

/// A 2D navigation grid built from obstacle geometry
#[derive(Debug)]
pub struct Navmesh {
    /// World width in pixels
    width: i32,
    /// World height in pixels
    height: i32,
    /// Pixel edge length of one cell
    tile_size: i32,
    rows: usize,
    cols: usize,
    /// Row-major cells
    cells: Vec<Cell>,
    refresh_window_ms: u64,
    /// Clock reading after which the next refresh is allowed
    next_refresh_ms: AtomicU64,
}

impl Navmesh {
    /// Build a mesh over a `world_size` world, blocking every cell that
    /// overlaps a rectangle on one of `layers`.
    ///
    /// # Errors
    ///
    /// Fails if the tile size or either world dimension is not positive, or
    /// if a layer is unknown to `source`.
    pub fn new<S, L>(
        world_size: (i32, i32),
        tile_size: i32,
        source: &S,
        layers: &[L],
    ) -> Result<Self, NavError>
    where
        S: ObstacleSource + ?Sized,
        L: AsRef<str>,
    {
        let (width, height) = world_size;
        if tile_size <= 0 {
            return Err(NavError::InvalidTileSize(tile_size));
        }
        if width <= 0 || height <= 0 {
            return Err(NavError::InvalidWorldSize { width, height });
        }

        let mut seen = FxHashSet::default();
        let mut obstacles = Vec::new();
        for layer in layers {
            let name = layer.as_ref();
            if seen.insert(name) {
                obstacles.extend(source.layer_rects(name)?);
            }
        }

        let rows = (height as u32).div_ceil(tile_size as u32) as usize;
        let cols = (width as u32).div_ceil(tile_size as u32) as usize;
        let edge = tile_size as f32;

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let rect = Rect::square(col as f32 * edge, row as f32 * edge, edge);
                let active = !obstacles.iter().any(|obstacle| obstacle.intersects(&rect));
                cells.push(Cell::new(CellId::new(row, col), rect, active));
            }
        }

        let mut mesh = Self {
            width,
            height,
            tile_size,
            rows,
            cols,
            cells,
            refresh_window_ms: DEFAULT_REFRESH_WINDOW_MS,
            next_refresh_ms: AtomicU64::new(0),
        };
        mesh.link_neighbors();

        log::info!(
            "Built navmesh {}x{} cells ({} active) from {} obstacles on {} layers",
            cols,
            rows,
            mesh.active_count(),
            obstacles.len(),
            seen.len()
        );

        Ok(mesh)
    }

    /// Build a mesh for a level using the tile size, layers and refresh
    /// window from `config`.
    ///
    /// # Errors
    ///
    /// See [`Navmesh::new`].
    pub fn from_level(level: &LevelGeometry, config: &NavConfig) -> Result<Self, NavError> {
        Ok(
            Self::new(level.size(), config.tile_size, level, &config.collidable_layers)?
                .with_refresh_window_ms(config.refresh_window_ms),
        )
    }

    /// Set the refresh window
    #[must_use]
    pub fn with_refresh_window_ms(mut self, window: u64) -> Self {
        self.refresh_window_ms = window;
        self
    }

    fn link_neighbors(&mut self) {
        for index in 0..self.cells.len() {
            let id = self.cells[index].id();
            let neighbors = self.adjacent_active(id);
            self.cells[index].neighbors = neighbors;
        }
    }

    /// Active cells in the 3x3 block around `id`, in row-major order
    fn adjacent_active(&self, id: CellId) -> Neighbors {
        let mut result = Neighbors::new();
        for dr in -1_isize..=1 {
            for dc in -1_isize..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (Some(row), Some(col)) =
                    (id.row.checked_add_signed(dr), id.col.checked_add_signed(dc))
                else {
                    continue;
                };
                if row < self.rows && col < self.cols && self.cells[row * self.cols + col].is_active()
                {
                    result.push(CellId::new(row, col));
                }
            }
        }
        result
    }

    /// World size in pixels
    #[must_use]
    pub const fn world_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Pixel edge length of one cell
    #[must_use]
    pub const fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Number of rows
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the mesh has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell grid, one slice per row
    pub fn nodes(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.cols.max(1))
    }

    /// All cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Flat row-major index of a cell
    #[must_use]
    pub fn index_of(&self, id: CellId) -> Option<usize> {
        (id.row < self.rows && id.col < self.cols).then(|| id.row * self.cols + id.col)
    }

    /// Look up a cell by grid coordinates
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.index_of(id).map(|index| &self.cells[index])
    }

    pub(crate) fn cell_by_index(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    /// The cell containing a world position
    #[must_use]
    pub fn cell_at(&self, pos: Vec2) -> Option<&Cell> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let edge = self.tile_size as f32;
        let id = CellId::new((pos.y / edge) as usize, (pos.x / edge) as usize);
        self.cell(id)
    }

    /// Number of traversable cells
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_active()).count()
    }

    /// Nearest active cell to a world position, measured to each cell's
    /// top-left corner.
    ///
    /// Linear scan; on equal distance the first cell in row-major order wins.
    #[must_use]
    pub fn closest_active_cell(&self, pos: Vec2) -> Option<&Cell> {
        self.closest_active_index(pos).map(|index| &self.cells[index])
    }

    pub(crate) fn closest_active_index(&self, pos: Vec2) -> Option<usize> {
        let mut closest: Option<(usize, f32)> = None;
        for (index, cell) in self.cells.iter().enumerate() {
            if !cell.is_active() {
                continue;
            }
            let distance = cell.rect().min.distance(pos);
            match closest {
                Some((_, best)) if distance >= best => {}
                _ => closest = Some((index, distance)),
            }
        }
        closest.map(|(index, _)| index)
    }

    /// Length of the refresh window in milliseconds
    #[must_use]
    pub const fn refresh_window_ms(&self) -> u64 {
        self.refresh_window_ms
    }

    /// Whether the refresh window has elapsed at `now_ms`
    #[must_use]
    pub fn should_update(&self, now_ms: u64) -> bool {
        now_ms > self.next_refresh_ms.load(Ordering::Acquire)
    }

    /// Open a new refresh window if the current one has elapsed.
    ///
    /// Geometry is never rebuilt; this only moves the gate. The window is
    /// shared by every caller of this mesh.
    pub fn update(&self, now_ms: u64) {
        let window = self.refresh_window_ms;
        let _ = self
            .next_refresh_ms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next < now_ms).then(|| now_ms.saturating_add(window))
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::obstacles::ObstacleLayer;

    const NO_LAYERS: [&str; 0] = [];
    const NO_OBSTACLES: [Rect; 0] = [];

    fn open_grid(size: i32, tile: i32) -> Navmesh {
        Navmesh::new((size, size), tile, &NO_OBSTACLES[..], &NO_LAYERS).unwrap()
    }

    #[test]
    fn test_grid_dimensions_round_up() {
        let mesh = Navmesh::new((100, 45), 10, &NO_OBSTACLES[..], &NO_LAYERS).unwrap();

        assert_eq!(mesh.cols(), 10);
        assert_eq!(mesh.rows(), 5);
        assert_eq!(mesh.len(), 50);
        assert_eq!(mesh.nodes().count(), 5);
        assert!(mesh.nodes().all(|row| row.len() == 10));
    }

    #[test]
    fn test_neighbor_counts() {
        let mesh = open_grid(100, 10);
        let count = |row, col| mesh.cell(CellId::new(row, col)).unwrap().neighbors().len();

        assert_eq!(count(0, 0), 3);
        assert_eq!(count(9, 9), 3);
        assert_eq!(count(0, 9), 3);
        assert_eq!(count(0, 5), 5);
        assert_eq!(count(5, 0), 5);
        assert_eq!(count(5, 5), 8);
    }

    #[test]
    fn test_obstacles_block_overlapping_cells() {
        let obstacles = [Rect::new(15.0, 15.0, 10.0, 10.0)];
        let mesh = Navmesh::new((40, 40), 10, &obstacles[..], &["Barriers"]).unwrap();

        let blocked: Vec<CellId> = mesh
            .iter()
            .filter(|cell| !cell.is_active())
            .map(Cell::id)
            .collect();

        assert_eq!(
            blocked,
            vec![
                CellId::new(1, 1),
                CellId::new(1, 2),
                CellId::new(2, 1),
                CellId::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_edge_touching_obstacle_does_not_block() {
        let obstacles = [Rect::square(10.0, 0.0, 10.0)];
        let mesh = Navmesh::new((30, 10), 10, &obstacles[..], &["Barriers"]).unwrap();

        assert!(mesh.cell(CellId::new(0, 0)).unwrap().is_active());
        assert!(!mesh.cell(CellId::new(0, 1)).unwrap().is_active());
        assert!(mesh.cell(CellId::new(0, 2)).unwrap().is_active());
    }

    #[test]
    fn test_inactive_cells_are_never_neighbors() {
        let obstacles = [Rect::square(10.0, 10.0, 10.0)];
        let mesh = Navmesh::new((30, 30), 10, &obstacles[..], &["Barriers"]).unwrap();
        let blocked = CellId::new(1, 1);

        assert!(mesh.iter().all(|cell| !cell.neighbors().contains(&blocked)));
        assert_eq!(mesh.cell(CellId::new(0, 0)).unwrap().neighbors().len(), 2);
    }

    #[test]
    fn test_diagonal_around_blocked_corner_stays_linked() {
        // (0,1) is blocked; (0,0) and (1,1) remain diagonal neighbours.
        let obstacles = [Rect::square(10.0, 0.0, 10.0)];
        let mesh = Navmesh::new((20, 20), 10, &obstacles[..], &["Barriers"]).unwrap();
        let origin = mesh.cell(CellId::new(0, 0)).unwrap();

        assert!(origin.neighbors().contains(&CellId::new(1, 1)));
    }

    #[test]
    fn test_invalid_configuration() {
        assert_eq!(
            Navmesh::new((100, 100), 0, &NO_OBSTACLES[..], &NO_LAYERS).unwrap_err(),
            NavError::InvalidTileSize(0)
        );
        assert_eq!(
            Navmesh::new((100, -5), 10, &NO_OBSTACLES[..], &NO_LAYERS).unwrap_err(),
            NavError::InvalidWorldSize {
                width: 100,
                height: -5
            }
        );
    }

    #[test]
    fn test_unknown_layer_fails() {
        let level = LevelGeometry::new("test", 64, 64, 32)
            .with_layer(ObstacleLayer::from_rows("Barriers", &["#.", ".."]));

        let result = Navmesh::new(level.size(), 32, &level, &["Barriers", "Lava"]);

        assert_eq!(result.unwrap_err(), NavError::UnknownLayer("Lava".into()));
    }

    #[test]
    fn test_from_level_uses_config() {
        let level = LevelGeometry::new("test", 128, 64, 32)
            .with_layer(ObstacleLayer::from_rows("Barriers", &["#...", "...#"]));
        let config = NavConfig::default().with_refresh_window_ms(250);

        let mesh = Navmesh::from_level(&level, &config).unwrap();

        assert_eq!(mesh.active_count(), 6);
        assert_eq!(mesh.refresh_window_ms(), 250);
    }

    #[test]
    fn test_closest_active_cell() {
        let mesh = open_grid(100, 10);

        assert_eq!(mesh.closest_active_cell(Vec2::ZERO).unwrap().id(), CellId::new(0, 0));
        assert_eq!(
            mesh.closest_active_cell(Vec2::new(47.0, 93.0)).unwrap().id(),
            CellId::new(9, 5)
        );
        // Outside the world still maps to the nearest edge cell
        assert_eq!(
            mesh.closest_active_cell(Vec2::new(500.0, -20.0)).unwrap().id(),
            CellId::new(0, 9)
        );
    }

    #[test]
    fn test_closest_active_tie_prefers_row_major() {
        let mesh = open_grid(20, 10);

        // Equidistant from all four corners
        let cell = mesh.closest_active_cell(Vec2::new(5.0, 5.0)).unwrap();
        assert_eq!(cell.id(), CellId::new(0, 0));
    }

    #[test]
    fn test_closest_active_measures_to_corner() {
        let mesh = open_grid(100, 10);

        let cell = mesh.closest_active_cell(Vec2::new(9.0, 9.0)).unwrap();
        assert_eq!(cell.id(), CellId::new(1, 1));

        let cell = mesh.closest_active_cell(Vec2::new(90.0, 90.0)).unwrap();
        assert_eq!(cell.id(), CellId::new(9, 9));
    }

    #[test]
    fn test_closest_active_skips_blocked() {
        let obstacles = [Rect::square(0.0, 0.0, 10.0)];
        let mesh = Navmesh::new((20, 10), 10, &obstacles[..], &["Barriers"]).unwrap();

        let cell = mesh.closest_active_cell(Vec2::new(2.0, 2.0)).unwrap();
        assert_eq!(cell.id(), CellId::new(0, 1));
    }

    #[test]
    fn test_no_active_cell() {
        let obstacles = [Rect::square(0.0, 0.0, 100.0)];
        let mesh = Navmesh::new((20, 20), 10, &obstacles[..], &["Barriers"]).unwrap();

        assert_eq!(mesh.active_count(), 0);
        assert!(mesh.closest_active_cell(Vec2::ZERO).is_none());
    }

    #[test]
    fn test_cell_at() {
        let mesh = open_grid(100, 10);

        assert_eq!(mesh.cell_at(Vec2::new(25.0, 31.0)).unwrap().id(), CellId::new(3, 2));
        assert!(mesh.cell_at(Vec2::new(-1.0, 5.0)).is_none());
        assert!(mesh.cell_at(Vec2::new(105.0, 5.0)).is_none());
    }

    #[test]
    fn test_refresh_gate() {
        let mesh = open_grid(100, 10);

        assert!(mesh.should_update(1));

        mesh.update(1_000);
        assert!(!mesh.should_update(1_000));
        assert!(!mesh.should_update(1_500));
        assert!(mesh.should_update(1_501));

        // Calls inside the window do not extend it
        mesh.update(1_200);
        assert!(mesh.should_update(1_501));

        mesh.update(1_600);
        assert!(!mesh.should_update(1_700));
        assert!(mesh.should_update(2_101));
    }
}
