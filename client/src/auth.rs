//! Login side-channel: trade credentials and a challstr for an assertion

use anyhow::{Context, Result, anyhow};

/// Ask the login server to sign `challstr` for `username`
pub async fn get_assertion(
    login_uri: &str,
    username: &str,
    password: &str,
    challstr: &str,
) -> Result<String> {
    let client = reqwest::Client::new();

    let response = client
        .post(login_uri)
        .form(&[
            ("name", username),
            ("pass", password),
            ("challstr", challstr.trim()),
        ])
        .send()
        .await
        .context("Failed to send login request")?;

    let body = response
        .text()
        .await
        .context("Failed to read login response")?;

    parse_login_response(&body)
}

/// Pull the assertion out of a login server reply.
///
/// Replies are JSON prefixed with `]`; a rejected login still carries an
/// `assertion` field, but its value starts with `;;` and holds the reason.
pub fn parse_login_response(body: &str) -> Result<String> {
    let json_str = body.trim().trim_start_matches(']');
    let json: serde_json::Value =
        serde_json::from_str(json_str).context("Failed to parse login response")?;

    let assertion = json
        .get("assertion")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Login response missing assertion: {}", json_str))?;

    if let Some(reason) = assertion.strip_prefix(";;") {
        anyhow::bail!("Login failed: {}", reason);
    }
    if assertion.trim().is_empty() {
        anyhow::bail!("Login failed: empty assertion");
    }

    Ok(assertion.trim().to_string())
}
