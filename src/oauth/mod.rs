//! Discord OAuth2 client adapter
//!
//! Wraps the two remote calls of the authorization-code flow: exchanging
//! the code for an access token, and fetching the authenticated user's
//! profile. Each call is a single attempt; failures surface immediately
//! as one of two error kinds and nothing is cached across requests.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Args;
use crate::types::WaypointError;

const TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const PROFILE_URL: &str = "https://discord.com/api/users/@me";
const AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";

/// Access token returned by the Discord token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

/// Discord user profile from the identify scope
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Form body for the authorization-code exchange (RFC 6749 §4.1.3)
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    scope: &'a str,
}

/// Discord OAuth2 client
#[derive(Clone)]
pub struct DiscordOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl DiscordOAuth {
    /// Create a client from the parsed configuration
    pub fn new(args: &Args) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http,
            client_id: args.client_id.clone(),
            client_secret: args.client_secret.clone(),
            redirect_uri: args.redirect_uri.clone(),
        }
    }

    /// Authorize link for the login page
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=identify",
            AUTHORIZE_URL,
            self.client_id,
            urlencoding::encode(&self.redirect_uri),
        )
    }

    /// Exchange an authorization code for an access token
    ///
    /// Any transport error, non-success status, or undecodable body is
    /// surfaced as `InvalidCode`: the visitor must restart the flow.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, WaypointError> {
        let form = TokenRequest {
            grant_type: "authorization_code",
            code,
            redirect_uri: &self.redirect_uri,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            scope: "identify",
        };

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| WaypointError::InvalidCode(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WaypointError::InvalidCode(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token = response
            .json::<AccessToken>()
            .await
            .map_err(|e| WaypointError::InvalidCode(format!("undecodable token response: {}", e)))?;

        debug!("Exchanged authorization code ({})", token.token_type);
        Ok(token)
    }

    /// Fetch the authenticated user's profile
    ///
    /// Failures here mean the token exchange succeeded but Discord could
    /// not serve the profile, surfaced as `ProfileFetch`.
    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<DiscordUser, WaypointError> {
        let response = self
            .http
            .get(PROFILE_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| WaypointError::ProfileFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WaypointError::ProfileFetch(format!(
                "profile endpoint returned {}",
                response.status()
            )));
        }

        response
            .json::<DiscordUser>()
            .await
            .map_err(|e| WaypointError::ProfileFetch(format!("undecodable profile: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn oauth() -> DiscordOAuth {
        let args = Args::try_parse_from([
            "waypoint",
            "--client-id",
            "112233445566778899",
            "--client-secret",
            "s3cret",
            "--redirect-uri",
            "https://hunt.example.com/?stage=2",
        ])
        .expect("args should parse");
        DiscordOAuth::new(&args)
    }

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let url = oauth().authorize_url();
        assert!(url.starts_with("https://discord.com/api/oauth2/authorize?"));
        assert!(url.contains("client_id=112233445566778899"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fhunt.example.com%2F%3Fstage%3D2"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=identify"));
    }

    #[test]
    fn test_token_request_form_encoding() {
        let form = TokenRequest {
            grant_type: "authorization_code",
            code: "abc123",
            redirect_uri: "https://hunt.example.com/",
            client_id: "112233",
            client_secret: "s3cret",
            scope: "identify",
        };

        let encoded = serde_urlencoded::to_string(&form).expect("form should encode");
        assert!(encoded.contains("grant_type=authorization_code"));
        assert!(encoded.contains("code=abc123"));
        assert!(encoded.contains("redirect_uri=https%3A%2F%2Fhunt.example.com%2F"));
    }

    #[test]
    fn test_profile_decoding_tolerates_missing_avatar() {
        let user: DiscordUser = serde_json::from_str(
            r#"{"id":"184810","username":"ann","discriminator":"0042","avatar":null}"#,
        )
        .expect("profile should decode");

        assert_eq!(user.username, "ann");
        assert!(user.avatar.is_none());
    }
}
