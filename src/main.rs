//! Waypoint - Discord OAuth2 checkpoint gate

use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waypoint::{
    checkpoint::{CheckpointGate, CheckpointStore},
    config::Args,
    db::MongoClient,
    oauth::DiscordOAuth,
    render::Views,
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("waypoint={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Waypoint - Discord checkpoint gate");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}:{}", args.host, args.port);
    info!("Checkpoint: {}", args.checkpoint_id);
    info!("MongoDB: {}", args.mongo_uri);
    info!("Redirect URI: {}", args.redirect_uri);
    info!("======================================");

    // Connect to MongoDB
    let mongo = match MongoClient::new(&args.mongo_uri, &args.mongo_db).await {
        Ok(client) => client,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    // Open the checkpoint collections
    let store = match CheckpointStore::new(&mongo).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open checkpoint collections: {}", e);
            std::process::exit(1);
        }
    };

    // Load this instance's checkpoint configuration; a missing record is fatal
    let checkpoint = match store.load_config(args.checkpoint_id).await {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Serving checkpoint {} ({})",
        checkpoint.id, checkpoint.name
    );

    // Build the OAuth client and load the page templates
    let oauth = DiscordOAuth::new(&args);
    let views = match Views::load(Path::new(&args.views_dir), &oauth) {
        Ok(views) => views,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let gate = CheckpointGate::new(store, checkpoint.clone());
    let state = Arc::new(AppState::new(args, checkpoint, views, oauth, gate, mongo));

    server::run(state).await?;

    Ok(())
}
