//! Waypoint - Discord OAuth2 checkpoint gate
//!
//! Waypoint authenticates visitors through Discord's authorization-code
//! flow and records their passage through an ordered sequence of
//! checkpoints in MongoDB. Each deployment serves a single checkpoint;
//! a visitor may pass checkpoint `k` only after passing `k-1` and after
//! the checkpoint's minimum dwell time has elapsed.
//!
//! ## Services
//!
//! - **Gate**: the `GET /` route driving the OAuth exchange and the
//!   passing validation
//! - **Store**: checkpoint configuration and per-user passing history
//!   in MongoDB
//! - **Views**: HTML page templates with `{{TOKEN}}` substitution
//! - **Static**: assets served from the public directory

pub mod checkpoint;
pub mod config;
pub mod db;
pub mod oauth;
pub mod render;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, WaypointError};
