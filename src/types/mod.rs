//! Shared types for Waypoint

mod error;

pub use error::{Result, WaypointError};
