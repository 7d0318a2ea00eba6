//! Health check endpoints
//!
//! Kubernetes-style probes alongside the visitor-facing gate:
//! - /health, /healthz - liveness (is the process running?)
//! - /ready, /readyz - readiness (can MongoDB be reached?)
//! - /version - build metadata for deployment verification

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;

/// Liveness/readiness response body
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if the service is running)
    pub healthy: bool,
    /// Service version
    pub version: &'static str,
    /// Seconds since process start
    pub uptime_secs: u64,
    /// Node identifier
    pub node_id: String,
    /// Checkpoint served by this instance
    pub checkpoint: CheckpointInfo,
    /// Current timestamp
    pub timestamp: String,
    /// Error message when the store is unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Identifying info for the configured checkpoint
#[derive(Serialize)]
pub struct CheckpointInfo {
    pub ordinal: u32,
    pub name: String,
}

fn build_health_response(state: &AppState, error: Option<String>) -> HealthResponse {
    HealthResponse {
        healthy: error.is_none(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        node_id: state.args.node_id.to_string(),
        checkpoint: CheckpointInfo {
            ordinal: state.checkpoint.id,
            name: state.checkpoint.name.clone(),
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
        error,
    }
}

fn json_response(status: StatusCode, body: &impl Serialize) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body)
        .unwrap_or_else(|_| r#"{"healthy":false,"error":"Serialization failed"}"#.to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

/// Handle liveness probe (/health, /healthz)
///
/// Returns 200 OK whenever the process is up, regardless of store state.
pub fn health_check(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &build_health_response(state, None))
}

/// Handle readiness probe (/ready, /readyz)
///
/// Returns 200 only when MongoDB answers a ping; use this for load
/// balancer health checks.
pub async fn readiness_check(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match state.mongo.ping().await {
        Ok(()) => json_response(StatusCode::OK, &build_health_response(state, None)),
        Err(e) => json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &build_health_response(state, Some(e.to_string())),
        ),
    }
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Git commit hash (full)
    pub commit_full: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "waypoint",
    };

    json_response(StatusCode::OK, &response)
}
