//! Ticket extraction for the single sign-on login flow.
//!
//! After a successful form post the identity provider answers with an HTML
//! page whose inline script assigns the ticket URL, e.g.
//!
//! ```text
//! var response_url = "https:\/\/connect.garmin.com\/modern?ticket=ST-0123456-aBCDefgh1iJkLmN5opQ9R-cas";
//! ```
//!
//! This is the part of the login most likely to break when the upstream page
//! changes, so it lives on its own.

use crate::GarminError;
use regex::Regex;
use std::sync::OnceLock;

fn ticket_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"response_url\s*=\s*"(https?:[^"]+)""#).expect("ticket pattern is valid")
    })
}

/// Pull the ticket URL out of a login response body.
///
/// Escaped slashes (`\/`) in the script literal are unescaped.
pub fn extract_ticket_url(body: &str) -> Result<String, GarminError> {
    let captures = ticket_pattern().captures(body).ok_or_else(|| {
        GarminError::Authentication(
            "unable to extract auth ticket URL; did you provide a correct username/password?"
                .into(),
        )
    })?;
    Ok(captures[1].replace('\\', ""))
}
