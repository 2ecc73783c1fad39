//! Command implementations for the LMS CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod certificates;
pub mod chapters;
pub mod cohorts;
pub mod courses;
pub mod documents;
pub mod files;
pub mod lessons;
pub mod me;
pub mod scorm;
pub mod users;

use anyhow::Result;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;

/// Common error type for HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Build an HTTP client, optionally configured with a Bearer token.
pub fn build_client(token: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(token) = token {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| anyhow::anyhow!("Invalid token value: {}", e))?;
        headers.insert(AUTHORIZATION, value);
        builder = builder.default_headers(headers);
    }

    Ok(builder.build()?)
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

impl<T: HumanReadable> HumanReadable for Vec<T> {
    fn print_human(&self) {
        for item in self {
            item.print_human();
        }
    }
}

/// Send a request and decode the JSON body, turning error bodies into
/// [`CliError::Server`].
pub async fn make_request<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(body);
    Err(CliError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Pull the message out of either error body the server produces:
/// `{"error": {"code", "message"}}` or `{"ok": false, "error": "..."}`.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match json.get("error")? {
        Value::String(message) => Some(message.clone()),
        Value::Object(details) => {
            let message = details.get("message").and_then(Value::as_str)?;
            match details.get("code").and_then(Value::as_str) {
                Some(code) => Some(format!("{} ({})", message, code)),
                None => Some(message.to_string()),
            }
        }
        _ => None,
    }
}

/// Join the base URL and an API path.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Ask for confirmation on stderr. Returns true for `y`/`Y`.
pub fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Format a timestamp for human display.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
