//! Geometry primitives
//!
//! Axis-aligned rectangles used for cells and level obstacles.

mod rect;

pub use rect::Rect;
