//! HTTP routes for Waypoint

pub mod gate;
pub mod health;
pub mod statics;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

pub use gate::handle_gate;
pub use health::{health_check, readiness_check, version_info};
pub use statics::handle_static;

/// JSON 404 for paths outside the page and asset surface
pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = format!(r#"{{"error":"Not found","path":"{}"}}"#, path);

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
