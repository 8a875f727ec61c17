//! Navigation configuration
//!
//! Supports loading and saving in RON (Rusty Object Notation) or JSON format.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::NavError;

/// Default refresh window between path recomputations, in milliseconds
pub const DEFAULT_REFRESH_WINDOW_MS: u64 = 500;

/// Default distance at which an agent counts a waypoint as reached
pub const DEFAULT_ARRIVAL_RADIUS: f32 = 32.0;

/// Tunables for meshes, searches and the agents that consume them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Pixel edge length of one navmesh cell
    pub tile_size: i32,
    /// Minimum interval between permitted path recomputations
    pub refresh_window_ms: u64,
    /// Distance to a waypoint centre at which it is popped
    pub arrival_radius: f32,
    /// Agent movement per tick, in world units
    pub agent_speed: f32,
    /// Number of background search threads
    pub worker_threads: usize,
    /// Layers whose rectangles block traversal
    pub collidable_layers: Vec<String>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            refresh_window_ms: DEFAULT_REFRESH_WINDOW_MS,
            arrival_radius: DEFAULT_ARRIVAL_RADIUS,
            agent_speed: 2.0,
            worker_threads: 2,
            collidable_layers: vec![String::from("Barriers")],
        }
    }
}

impl NavConfig {
    /// Set the cell edge length
    #[must_use]
    pub fn with_tile_size(mut self, tile_size: i32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the refresh window
    #[must_use]
    pub fn with_refresh_window_ms(mut self, window: u64) -> Self {
        self.refresh_window_ms = window;
        self
    }

    /// Set the waypoint arrival radius
    #[must_use]
    pub fn with_arrival_radius(mut self, radius: f32) -> Self {
        self.arrival_radius = radius;
        self
    }

    /// Set agent speed
    #[must_use]
    pub fn with_agent_speed(mut self, speed: f32) -> Self {
        self.agent_speed = speed;
        self
    }

    /// Set the number of search threads
    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Replace the collidable layer list
    #[must_use]
    pub fn with_collidable_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collidable_layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, NavError> {
        load_ron(path)
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, NavError> {
        load_json(path)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), NavError> {
        save_ron(self, path)
    }
}

pub(crate) fn load_ron<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, NavError> {
    let content = fs::read_to_string(path)?;
    ron::from_str(&content).map_err(|e| NavError::Deserialize(e.to_string()))
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, NavError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| NavError::Deserialize(e.to_string()))
}

pub(crate) fn save_ron<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), NavError> {
    let ron_string = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| NavError::Serialize(e.to_string()))?;
    fs::write(path, ron_string)?;
    Ok(())
}

pub(crate) fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), NavError> {
    let json_string =
        serde_json::to_string_pretty(value).map_err(|e| NavError::Serialize(e.to_string()))?;
    fs::write(path, json_string)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NavConfig::default();

        assert_eq!(config.refresh_window_ms, 500);
        assert!((config.arrival_radius - 32.0).abs() < 0.01);
        assert_eq!(config.collidable_layers, vec!["Barriers".to_string()]);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: NavConfig = ron::from_str("(tile_size: 16, worker_threads: 4)").unwrap();

        assert_eq!(config.tile_size, 16);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.refresh_window_ms, DEFAULT_REFRESH_WINDOW_MS);
    }

    #[test]
    fn test_config_roundtrip_ron() {
        let config = NavConfig::default()
            .with_tile_size(8)
            .with_collidable_layers(["Barriers", "Water"]);

        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("Water"));

        let loaded: NavConfig = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = NavConfig::load_ron("does/not/exist.ron");

        assert!(matches!(result, Err(NavError::Io(_))));
    }
}
