//! Navmesh debug drawing
//!
//! Diagnostic only: draws cell outlines coloured by traversability and the
//! segments of a path. Rendering backends implement [`DebugCanvas`].

use glam::Vec2;

use super::astar::Path;
use super::navmesh::Navmesh;
use crate::geometry::Rect;

/// RGBA colour
pub type Color = [f32; 4];

/// Default outline colour for blocked cells
pub const INACTIVE_COLOR: Color = [1.0, 0.0, 0.0, 1.0];

/// Default outline colour for traversable cells
pub const ACTIVE_COLOR: Color = [0.0, 1.0, 0.0, 1.0];

/// Default colour for path segments
pub const PATH_COLOR: Color = [1.0, 0.0, 0.0, 1.0];

/// A surface that can draw outlines and lines
pub trait DebugCanvas {
    /// Draw a rectangle outline
    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Draw a line segment
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color);
}

/// Outline every cell, coloured by whether it is active
pub fn debug_render(mesh: &Navmesh, canvas: &mut impl DebugCanvas, inactive: Color, active: Color) {
    for cell in mesh.iter() {
        let color = if cell.is_active() { active } else { inactive };
        canvas.draw_rect(cell.rect(), color);
    }
}

/// Connect consecutive path cells centre to centre
pub fn debug_render_path(mesh: &Navmesh, path: &Path, canvas: &mut impl DebugCanvas, color: Color) {
    let waypoints = path.waypoints(mesh);
    for pair in waypoints.windows(2) {
        canvas.draw_line(pair[0], pair[1], color);
    }
}

/// Text rendering of the mesh: `#` blocked, `.` open, `*` on the path
#[must_use]
pub fn ascii_map(mesh: &Navmesh, path: Option<&Path>) -> String {
    let mut out = String::with_capacity(mesh.len() + mesh.rows());
    for row in mesh.nodes() {
        for cell in row {
            let ch = if path.is_some_and(|p| p.contains(cell.id())) {
                '*'
            } else if cell.is_active() {
                '.'
            } else {
                '#'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
