//! Configuration for Waypoint
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use uuid::Uuid;

/// Waypoint - Discord OAuth2 checkpoint gate
#[derive(Parser, Debug, Clone)]
#[command(name = "waypoint")]
#[command(about = "Discord OAuth2 checkpoint gate for sequential stages")]
pub struct Args {
    /// Unique node identifier for this gate instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Discord application client id
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: String,

    /// Discord application client secret
    #[arg(long, env = "CLIENT_SECRET")]
    pub client_secret: String,

    /// OAuth redirect URI registered with the Discord application
    /// Discord redirects back here with the authorization code
    #[arg(long, env = "REDIRECT_URI")]
    pub redirect_uri: String,

    /// MongoDB connection URI
    #[arg(long, env = "MONGO_URI", default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGO_DB", default_value = "waypoint")]
    pub mongo_db: String,

    /// Ordinal of the checkpoint this instance serves (0 = first)
    #[arg(long, env = "CHECKPOINT_ID", default_value = "0")]
    pub checkpoint_id: u32,

    /// Directory containing the HTML view templates
    #[arg(long, env = "VIEWS_DIR", default_value = "views")]
    pub views_dir: String,

    /// Directory of static assets served at the site root
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.is_empty() {
            return Err("CLIENT_ID must not be empty".to_string());
        }

        if self.client_secret.is_empty() {
            return Err("CLIENT_SECRET must not be empty".to_string());
        }

        if !self.redirect_uri.starts_with("http://") && !self.redirect_uri.starts_with("https://") {
            return Err("REDIRECT_URI must be an absolute http(s) URL".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::try_parse_from([
            "waypoint",
            "--client-id",
            "123456789",
            "--client-secret",
            "hunter2hunter2",
            "--redirect-uri",
            "https://hunt.example.com/",
        ])
        .expect("args should parse")
    }

    #[test]
    fn test_defaults() {
        let args = base_args();
        assert_eq!(args.checkpoint_id, 0);
        assert_eq!(args.mongo_db, "waypoint");
        assert_eq!(args.views_dir, "views");
        assert_eq!(args.public_dir, "public");
    }

    #[test]
    fn test_validate_accepts_good_config() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_redirect_uri() {
        let mut args = base_args();
        args.redirect_uri = "/callback".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_client_id() {
        let mut args = base_args();
        args.client_id = String::new();
        assert!(args.validate().is_err());
    }
}
