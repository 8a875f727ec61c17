//! Level geometry and obstacle layers
//!
//! A level is a pixel-sized world made of named layers. Each layer carries
//! explicit rectangles, a tile grid, or both; every non-empty tile becomes one
//! tile-sized obstacle rectangle.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::NavError;
use crate::core::config::{load_json, load_ron, save_json, save_ron};
use crate::geometry::Rect;

/// Anything that can hand out obstacle rectangles by layer name
pub trait ObstacleSource {
    /// Rectangles on the named layer
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnknownLayer`] if no layer has this name
    fn layer_rects(&self, name: &str) -> Result<Vec<Rect>, NavError>;
}

/// A single named layer of level geometry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleLayer {
    /// Layer name, e.g. "Barriers"
    pub name: String,
    /// Explicit rectangles
    #[serde(default)]
    pub rects: Vec<Rect>,
    /// Tile grid width in tiles (0 when the layer has no tiles)
    #[serde(default)]
    pub columns: usize,
    /// Row-major tile ids, 0 meaning empty
    #[serde(default)]
    pub tiles: Vec<u32>,
}

impl ObstacleLayer {
    /// Create an empty layer
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an explicit rectangle
    #[must_use]
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rects.push(rect);
        self
    }

    /// Set the tile grid
    #[must_use]
    pub fn with_tiles(mut self, columns: usize, tiles: Vec<u32>) -> Self {
        self.columns = columns;
        self.tiles = tiles;
        self
    }

    /// Build a tile grid from text rows, `#` marking an occupied tile
    #[must_use]
    pub fn from_rows(name: impl Into<String>, rows: &[&str]) -> Self {
        let columns = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut tiles = Vec::with_capacity(columns * rows.len());
        for row in rows {
            let mut count = 0;
            for ch in row.chars() {
                tiles.push(u32::from(ch == '#'));
                count += 1;
            }
            tiles.resize(tiles.len() + (columns - count), 0);
        }
        Self::new(name).with_tiles(columns, tiles)
    }

    /// All obstacle rectangles on this layer, tiles expanded to `tile_width` x `tile_height`
    #[must_use]
    pub fn rects(&self, tile_width: f32, tile_height: f32) -> Vec<Rect> {
        let mut rects = self.rects.clone();
        if self.columns == 0 {
            return rects;
        }
        for (index, &tile) in self.tiles.iter().enumerate() {
            if tile == 0 {
                continue;
            }
            let (x, y) = (index % self.columns, index / self.columns);
            rects.push(Rect::new(
                x as f32 * tile_width,
                y as f32 * tile_height,
                tile_width,
                tile_height,
            ));
        }
        rects
    }
}

/// Obstacle geometry for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelGeometry {
    /// Level name
    pub name: String,
    /// World width in pixels
    pub width: i32,
    /// World height in pixels
    pub height: i32,
    /// Pixel width of one tile in the layer grids
    pub tile_width: i32,
    /// Pixel height of one tile in the layer grids
    pub tile_height: i32,
    /// Named layers
    #[serde(default)]
    pub layers: Vec<ObstacleLayer>,
}

impl LevelGeometry {
    /// Create an empty level
    #[must_use]
    pub fn new(name: impl Into<String>, width: i32, height: i32, tile_size: i32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            tile_width: tile_size,
            tile_height: tile_size,
            layers: Vec::new(),
        }
    }

    /// Add a layer
    #[must_use]
    pub fn with_layer(mut self, layer: ObstacleLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// World size in pixels
    #[must_use]
    pub const fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Find a layer by name
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&ObstacleLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Load a level from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, NavError> {
        load_ron(path)
    }

    /// Load a level from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, NavError> {
        load_json(path)
    }

    /// Save the level to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), NavError> {
        save_ron(self, path)
    }

    /// Save the level to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), NavError> {
        save_json(self, path)
    }
}

impl ObstacleSource for LevelGeometry {
    fn layer_rects(&self, name: &str) -> Result<Vec<Rect>, NavError> {
        self.layer(name)
            .map(|layer| layer.rects(self.tile_width as f32, self.tile_height as f32))
            .ok_or_else(|| NavError::UnknownLayer(name.to_string()))
    }
}

/// Plain rectangle list, treated as a single layer that answers to any name
impl ObstacleSource for [Rect] {
    fn layer_rects(&self, _name: &str) -> Result<Vec<Rect>, NavError> {
        Ok(self.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAVE: &str = include_str!("../../assets/levels/cave.ron");

    #[test]
    fn test_tiles_expand_to_rects() {
        let layer = ObstacleLayer::from_rows("Barriers", &["#..", "..#"]);
        let rects = layer.rects(32.0, 32.0);

        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0], Rect::square(0.0, 0.0, 32.0));
        assert_eq!(rects[1], Rect::square(64.0, 32.0, 32.0));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let layer = ObstacleLayer::from_rows("Barriers", &["###", "#"]);

        assert_eq!(layer.columns, 3);
        assert_eq!(layer.tiles, vec![1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_explicit_and_tile_rects_combine() {
        let layer = ObstacleLayer::from_rows("Fire", &[".#"]).with_rect(Rect::new(5.0, 5.0, 1.0, 1.0));

        assert_eq!(layer.rects(16.0, 16.0).len(), 2);
    }

    #[test]
    fn test_unknown_layer() {
        let level = LevelGeometry::new("empty", 64, 64, 32);

        assert_eq!(
            level.layer_rects("Barriers"),
            Err(NavError::UnknownLayer("Barriers".to_string()))
        );
    }

    #[test]
    fn test_load_cave_fixture() {
        let level: LevelGeometry = ron::from_str(CAVE).unwrap();

        assert_eq!(level.name, "Cave");
        assert!(!level.layer_rects("Barriers").unwrap().is_empty());
        assert!(level.layer("Fire").is_some());
    }

    #[test]
    fn test_level_roundtrip_json() {
        let level = LevelGeometry::new("json", 96, 64, 32)
            .with_layer(ObstacleLayer::from_rows("Barriers", &["#.#", "..."]));

        let json = serde_json::to_string(&level).unwrap();
        let loaded: LevelGeometry = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, level);
    }
}
