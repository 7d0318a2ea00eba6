//! Static asset serving
//!
//! Files from the public directory are served at the site root. Path
//! resolution rejects traversal segments before touching the filesystem.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::routes::not_found_response;

/// Map a request path to a file inside the public directory
///
/// Returns `None` for the root path and for any path containing empty,
/// `.`, or `..` segments.
fn resolve_path(public_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let rel = request_path.trim_start_matches('/');
    if rel.is_empty() {
        return None;
    }
    if rel
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return None;
    }
    Some(public_dir.join(rel))
}

/// Content type from the file extension
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Serve a file from the public directory, 404 on any miss
pub async fn handle_static(public_dir: &Path, request_path: &str) -> Response<Full<Bytes>> {
    let Some(path) = resolve_path(public_dir, request_path) else {
        return not_found_response(request_path);
    };

    match tokio::fs::read(&path).await {
        Ok(contents) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", content_type_for(&path))
            .body(Full::new(Bytes::from(contents)))
            .unwrap(),
        Err(e) => {
            debug!("Static asset miss {}: {}", path.display(), e);
            not_found_response(request_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_traversal() {
        let public = Path::new("public");
        assert!(resolve_path(public, "/../etc/passwd").is_none());
        assert!(resolve_path(public, "/a/../b.css").is_none());
        assert!(resolve_path(public, "/a//b.css").is_none());
        assert!(resolve_path(public, "/./style.css").is_none());
        assert!(resolve_path(public, "/").is_none());
    }

    #[test]
    fn test_resolve_accepts_nested_assets() {
        let public = Path::new("public");
        assert_eq!(
            resolve_path(public, "/img/logo.png"),
            Some(PathBuf::from("public/img/logo.png"))
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("style.css")), "text/css");
        assert_eq!(
            content_type_for(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(content_type_for(Path::new("logo.png")), "image/png");
        assert_eq!(
            content_type_for(Path::new("unknown.bin")),
            "application/octet-stream"
        );
    }
}
