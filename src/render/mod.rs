//! HTML template rendering
//!
//! Plain `{{TOKEN}}` substring substitution in two stages: caller-supplied
//! values first, then the fixed default token set from the active
//! checkpoint configuration. Callers that need the defaults suppressed
//! simply skip the second stage. Unmatched tokens are left literally in
//! the output; values are not sanitized against re-substitution.

use std::path::Path;

use crate::db::schemas::CheckpointConfigDoc;
use crate::oauth::DiscordOAuth;
use crate::types::WaypointError;

/// Replace every `{{KEY}}` token (keys uppercased) with its value
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        let token = format!("{{{{{}}}}}", key.to_uppercase());
        out = out.replace(&token, value);
    }
    out
}

/// Second stage: substitute the default checkpoint tokens
pub fn render_defaults(template: &str, config: &CheckpointConfigDoc) -> String {
    render(
        template,
        &[
            ("check_name", &config.name),
            ("check_message", &config.message),
            ("check_link", config.link_or_placeholder()),
        ],
    )
}

/// Page templates, read once at startup
///
/// The index page is pre-substituted with the Discord authorize link the
/// way the login page expects it; error and result pages keep their
/// per-request tokens.
pub struct Views {
    pub index: String,
    pub error: String,
    pub result: String,
}

impl Views {
    /// Load the three page templates from the views directory
    pub fn load(dir: &Path, oauth: &DiscordOAuth) -> Result<Self, WaypointError> {
        let index = read_view(dir, "index")?;
        let authorize_url = oauth.authorize_url();
        let index = render(&index, &[("authorize_url", &authorize_url)]);

        Ok(Self {
            index,
            error: read_view(dir, "error")?,
            result: read_view(dir, "result")?,
        })
    }
}

fn read_view(dir: &Path, name: &str) -> Result<String, WaypointError> {
    let path = dir.join(format!("{}.html", name));
    std::fs::read_to_string(&path)
        .map_err(|e| WaypointError::Config(format!("Failed to read view {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CheckpointConfigDoc {
        CheckpointConfigDoc {
            id: 1,
            name: "Fountain".to_string(),
            message: "Look beneath the third step.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_substitutes_uppercased_key() {
        assert_eq!(render("Hello {{NAME}}", &[("name", "Ann")]), "Hello Ann");
    }

    #[test]
    fn test_render_leaves_unmatched_tokens_literal() {
        assert_eq!(render("{{X}}", &[]), "{{X}}");
        assert_eq!(render("{{X}} {{Y}}", &[("y", "2")]), "{{X}} 2");
    }

    #[test]
    fn test_render_replaces_all_occurrences() {
        assert_eq!(
            render("{{ID}}-{{ID}}-{{ID}}", &[("id", "7")]),
            "7-7-7"
        );
    }

    #[test]
    fn test_render_defaults_fills_checkpoint_tokens() {
        let page = render_defaults("{{CHECK_NAME}}: {{CHECK_MESSAGE}} [{{CHECK_LINK}}]", &config());
        assert_eq!(page, "Fountain: Look beneath the third step. [#]");
    }

    #[test]
    fn test_two_stage_pipeline_is_not_recursive() {
        // A value containing a default token is substituted by the second
        // stage, but the second stage's own output is never re-scanned.
        let once = render("{{REASON}}", &[("reason", "see {{CHECK_NAME}}")]);
        let page = render_defaults(&once, &config());
        assert_eq!(page, "see Fountain");
    }

    #[test]
    fn test_views_load_from_directory() {
        use clap::Parser;

        let dir = std::env::temp_dir().join(format!("waypoint-views-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp views dir");
        std::fs::write(dir.join("index.html"), "<a href=\"{{AUTHORIZE_URL}}\">go</a>").unwrap();
        std::fs::write(dir.join("error.html"), "{{REASON}}").unwrap();
        std::fs::write(dir.join("result.html"), "{{USER_NAME}}").unwrap();

        let args = crate::config::Args::try_parse_from([
            "waypoint",
            "--client-id",
            "42",
            "--client-secret",
            "s",
            "--redirect-uri",
            "https://hunt.example.com/",
        ])
        .unwrap();
        let oauth = DiscordOAuth::new(&args);

        let views = Views::load(&dir, &oauth).expect("views should load");
        assert!(views.index.contains("client_id=42"));
        assert!(!views.index.contains("{{AUTHORIZE_URL}}"));
        assert_eq!(views.error, "{{REASON}}");

        std::fs::remove_dir_all(&dir).ok();
    }
}
