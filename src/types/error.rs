//! Error types for Waypoint

/// Main error type for Waypoint operations
#[derive(Debug, thiserror::Error)]
pub enum WaypointError {
    #[error("Invalid authorization code: {0}")]
    InvalidCode(String),

    #[error("Profile fetch failed: {0}")]
    ProfileFetch(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("No checkpoint configuration found for ordinal {0}")]
    ConfigNotFound(u32),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Implement From conversions for common error types

impl From<std::io::Error> for WaypointError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for WaypointError {
    fn from(err: serde_json::Error) -> Self {
        Self::Http(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for WaypointError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<mongodb::error::Error> for WaypointError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for Waypoint operations
pub type Result<T> = std::result::Result<T, WaypointError>;
