//! Grid navigation
//!
//! Navmesh construction from level obstacles, A* search over it, and debug
//! drawing hooks.

mod astar;
mod cell;
mod debug;
mod navmesh;
mod obstacles;

pub use astar::{Path, Pathfinder, SearchScratch, find_path};
pub use cell::{Cell, CellId, CellScore, Neighbors};
pub use debug::{
    ACTIVE_COLOR, Color, DebugCanvas, INACTIVE_COLOR, PATH_COLOR, ascii_map, debug_render,
    debug_render_path,
};
pub use navmesh::Navmesh;
pub use obstacles::{LevelGeometry, ObstacleLayer, ObstacleSource};
