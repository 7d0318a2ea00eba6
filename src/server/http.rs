//! HTTP server implementation
//!
//! Hyper http1 with TokioIo: one task per accepted connection, routed
//! through a `(Method, path)` match. The gate route owns `/`; everything
//! else under GET falls through to the static asset handler.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::checkpoint::CheckpointGate;
use crate::config::Args;
use crate::db::schemas::CheckpointConfigDoc;
use crate::db::MongoClient;
use crate::oauth::DiscordOAuth;
use crate::render::Views;
use crate::routes;
use crate::types::WaypointError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Checkpoint configuration loaded at startup, immutable thereafter
    pub checkpoint: CheckpointConfigDoc,
    /// Page templates, read once at startup
    pub views: Views,
    /// Discord OAuth2 client
    pub oauth: DiscordOAuth,
    /// Validation and recording gate
    pub gate: CheckpointGate,
    /// MongoDB client, kept for the readiness probe
    pub mongo: MongoClient,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        args: Args,
        checkpoint: CheckpointConfigDoc,
        views: Views,
        oauth: DiscordOAuth,
        gate: CheckpointGate,
        mongo: MongoClient,
    ) -> Self {
        Self {
            args,
            checkpoint,
            views,
            oauth,
            gate,
            mongo,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), WaypointError> {
    let listener = TcpListener::bind((state.args.host.as_str(), state.args.port)).await?;

    info!(
        "Waypoint listening on {}:{} as node {}",
        state.args.host, state.args.port, state.args.node_id
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // The gate: login page, or the OAuth flow when ?code= is present
        (Method::GET, "/") => routes::handle_gate(&state, req.uri().query()).await,

        // Liveness probe - returns 200 if the process is running
        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(&state),

        // Readiness probe - returns 200 only if MongoDB answers
        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(&state).await
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // Everything else under GET is a static asset lookup
        (Method::GET, _) => {
            routes::handle_static(Path::new(&state.args.public_dir), &path).await
        }

        _ => routes::not_found_response(&path),
    };

    Ok(response)
}
