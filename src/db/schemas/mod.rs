//! Document schemas for the Waypoint collections

pub mod checkpoint;
pub mod metadata;
pub mod passer;

pub use checkpoint::{CheckpointConfigDoc, CHECKPOINT_COLLECTION, LINK_PLACEHOLDER};
pub use metadata::Metadata;
pub use passer::{PasserDoc, PASSER_COLLECTION};
