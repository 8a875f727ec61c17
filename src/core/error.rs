//! Crate-wide error type

use thiserror::Error;

/// Errors raised while building or querying navigation data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// Tile edge length must be positive
    #[error("invalid tile size {0}: must be positive")]
    InvalidTileSize(i32),

    /// Both world dimensions must be positive
    #[error("invalid world size {width}x{height}: both dimensions must be positive")]
    InvalidWorldSize {
        /// World width in pixels
        width: i32,
        /// World height in pixels
        height: i32,
    },

    /// The mesh has no traversable cell to map a position onto
    #[error("navmesh has no active cell")]
    NoActiveCell,

    /// A collidable layer name the level does not define
    #[error("unknown obstacle layer `{0}`")]
    UnknownLayer(String),

    /// The background search pool has shut down
    #[error("path worker is no longer running")]
    WorkerClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Deserialization error
    #[error("deserialization error: {0}")]
    Deserialize(String),
}

impl From<std::io::Error> for NavError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
