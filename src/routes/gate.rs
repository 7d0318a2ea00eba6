//! The gate route
//!
//! `GET /` is the whole visitor-facing surface: without a `code` query
//! parameter it serves the login page; with one it runs the OAuth exchange,
//! fetches the visitor's Discord profile, and validates and records the
//! checkpoint passing. Every failure renders the error page with a
//! human-readable reason and status 200; this is a page for people, not an
//! API contract.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::checkpoint::{Passing, PassingError};
use crate::db::schemas::CheckpointConfigDoc;
use crate::oauth::DiscordUser;
use crate::render::{render, render_defaults, Views};
use crate::server::AppState;

/// Reason shown when Discord rejects the authorization code
pub const REASON_INVALID_CODE: &str = "The access code seems to be incorrect.";

/// Reason shown when the profile fetch fails after a good token exchange
pub const REASON_PROFILE_FETCH: &str =
    "The server was unable to retrieve the user info from Discord.";

/// Reason shown for storage faults; detail stays in the server log
pub const REASON_UNAVAILABLE: &str =
    "Checkpoint verification is temporarily unavailable. Please try again in a moment or contact the event staff.";

#[derive(Debug, Deserialize)]
struct GateQuery {
    code: Option<String>,
}

/// Authorization code from the query string, if present
fn extract_code(query: Option<&str>) -> Option<String> {
    let query = query?;
    serde_urlencoded::from_str::<GateQuery>(query)
        .ok()
        .and_then(|q| q.code)
        .filter(|code| !code.is_empty())
}

/// Handle `GET /`
pub async fn handle_gate(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(code) = extract_code(query) else {
        return html_page(render_defaults(&state.views.index, &state.checkpoint));
    };

    let token = match state.oauth.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            warn!("Authorization code exchange failed: {}", e);
            return error_page(&state.views, &state.checkpoint, REASON_INVALID_CODE);
        }
    };

    let user = match state.oauth.fetch_profile(&token).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Profile fetch failed: {}", e);
            return error_page(&state.views, &state.checkpoint, REASON_PROFILE_FETCH);
        }
    };

    match state.gate.log_passing(&user.id, chrono::Utc::now()).await {
        Ok(passing) => {
            if passing == Passing::AlreadyPassed {
                info!(
                    "User {} replayed checkpoint {}",
                    user.id, state.checkpoint.id
                );
            }
            html_page(render_result(&state.views, &state.checkpoint, &user))
        }
        Err(PassingError::Rejected(rejection)) => {
            info!(
                "Rejected checkpoint {} passing for {}: {}",
                state.checkpoint.id, user.id, rejection
            );
            error_page(&state.views, &state.checkpoint, &rejection.to_string())
        }
        Err(PassingError::Unavailable(e)) => {
            error!("Checkpoint verification failed for {}: {}", user.id, e);
            error_page(&state.views, &state.checkpoint, REASON_UNAVAILABLE)
        }
    }
}

fn render_error(views: &Views, config: &CheckpointConfigDoc, reason: &str) -> String {
    let page = render(&views.error, &[("reason", reason)]);
    render_defaults(&page, config)
}

fn render_result(views: &Views, config: &CheckpointConfigDoc, user: &DiscordUser) -> String {
    let page = render(
        &views.result,
        &[
            ("user_name", &user.username),
            ("user_disc", &user.discriminator),
            ("user_id", &user.id),
            ("user_avatar", user.avatar.as_deref().unwrap_or_default()),
        ],
    );
    render_defaults(&page, config)
}

fn error_page(
    views: &Views,
    config: &CheckpointConfigDoc,
    reason: &str,
) -> Response<Full<Bytes>> {
    html_page(render_error(views, config, reason))
}

fn html_page(html: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from(html)))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipped_views() -> Views {
        Views {
            index: std::fs::read_to_string("views/index.html").unwrap(),
            error: std::fs::read_to_string("views/error.html").unwrap(),
            result: std::fs::read_to_string("views/result.html").unwrap(),
        }
    }

    fn config() -> CheckpointConfigDoc {
        CheckpointConfigDoc {
            id: 0,
            name: "Start".to_string(),
            message: "Head to the fountain.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_code_from_query() {
        assert_eq!(extract_code(Some("code=abc123")), Some("abc123".to_string()));
        assert_eq!(
            extract_code(Some("state=x&code=abc123")),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_extract_code_absent() {
        assert_eq!(extract_code(None), None);
        assert_eq!(extract_code(Some("")), None);
        assert_eq!(extract_code(Some("state=x")), None);
        assert_eq!(extract_code(Some("code=")), None);
    }

    #[test]
    fn test_error_page_carries_invalid_code_reason() {
        let page = render_error(&shipped_views(), &config(), REASON_INVALID_CODE);
        assert!(page.contains("The access code seems to be incorrect."));
        assert!(page.contains("Start"));
        assert!(!page.contains("{{REASON}}"));
    }

    #[test]
    fn test_result_page_substitutes_profile() {
        let user = DiscordUser {
            id: "184810".to_string(),
            username: "ann".to_string(),
            discriminator: "0042".to_string(),
            avatar: Some("a1b2c3".to_string()),
        };

        let page = render_result(&shipped_views(), &config(), &user);
        assert!(page.contains("ann#0042"));
        assert!(page.contains("avatars/184810/a1b2c3.png"));
        assert!(page.contains("Head to the fountain."));
    }
}
