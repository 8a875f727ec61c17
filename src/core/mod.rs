//! Core module
//!
//! Configuration, errors, timing and the level controller that drives
//! navigation each frame.

pub mod config;
mod debug;
mod error;
mod level;
mod time;

pub use config::NavConfig;
pub use debug::SearchStats;
pub use error::NavError;
pub use level::Level;
pub use time::Time;
