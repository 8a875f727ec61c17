//! Grid navigation for 2D games
//!
//! This crate provides:
//! - A navmesh of square cells built from level obstacle layers
//! - A* pathfinding with per-search scratch state, safe to run concurrently
//! - A background search pool and agents that follow the resulting paths

pub mod agent;
pub mod core;
pub mod geometry;
pub mod nav;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{Agent, AgentId, PathTicket, PathWorker, SearchReport, TicketStatus};
    pub use crate::core::{Level, NavConfig, NavError, SearchStats, Time};
    pub use crate::geometry::Rect;
    pub use crate::nav::{
        Cell, CellId, DebugCanvas, LevelGeometry, Navmesh, ObstacleLayer, ObstacleSource, Path,
        Pathfinder, ascii_map, find_path,
    };
    pub use glam::Vec2;
}
