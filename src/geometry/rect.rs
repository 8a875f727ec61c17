//! Axis-aligned rectangle
//!
//! World-space rectangles in pixel units, with the y axis pointing down as in
//! tile-map coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle described by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Create a square with the given edge length
    #[must_use]
    pub const fn square(x: f32, y: f32, edge: f32) -> Self {
        Self::new(x, y, edge, edge)
    }

    /// Bottom-right corner
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Width
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.size.x
    }

    /// Height
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.size.y
    }

    /// True if the rectangle covers no area
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Check if a point is inside the rectangle (right and bottom edges excluded)
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x < max.x && point.y >= self.min.y && point.y < max.y
    }

    /// Check whether two rectangles overlap.
    ///
    /// Rectangles that only share an edge do not overlap, and an empty
    /// rectangle overlaps nothing.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && other.min.x < a_max.x && self.min.y < b_max.y && other.min.y < a_max.y
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}
