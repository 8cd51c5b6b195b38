//! HTTP plumbing shared by every adapter.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::SourceError;

// Several boards answer 403 to clients that do not look like a browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Builds the client shared by all adapters. Per-request timeouts are set by each adapter.
pub fn build_client() -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json,text/html;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(5))
        .build()
}

/// Sends a GET and decodes the JSON body. Non-2xx statuses and undecodable bodies are
/// returned as recoverable [`SourceError`]s.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    timeout: Duration,
) -> Result<T, SourceError> {
    let response = client
        .get(url)
        .query(query)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    debug!("GET {url} returned {} bytes", body.len());

    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(120).collect();
        SourceError::Malformed(format!("{e} (body starts with {preview:?})"))
    })
}

/// Flattens a loosely-typed JSON field (string, number or list of strings) into text.
pub fn value_text(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Bool(_) | Value::Object(_) => return None,
    };

    (!text.is_empty()).then_some(text)
}

/// Keeps the date part of an ISO-8601 timestamp (`2024-05-01T10:00:00Z` → `2024-05-01`).
pub fn date_part(timestamp: &str) -> String {
    let trimmed = timestamp.trim();
    match chrono::DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => trimmed
            .get(..10)
            .filter(|head| chrono::NaiveDate::parse_from_str(head, "%Y-%m-%d").is_ok())
            .unwrap_or(trimmed)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_part_rfc3339() {
        assert_eq!(date_part("2024-05-01T10:00:00Z"), "2024-05-01");
        assert_eq!(date_part("2024-05-01T23:30:00+02:00"), "2024-05-01");
    }

    #[test]
    fn test_date_part_naive_timestamp() {
        assert_eq!(date_part("2024-05-01 10:00:00"), "2024-05-01");
        assert_eq!(date_part("2024-05-01T10:00:00"), "2024-05-01");
    }

    #[test]
    fn test_date_part_passes_through_relative_text() {
        assert_eq!(date_part("Recent"), "Recent");
        assert_eq!(date_part("Today at noon"), "Today at noon");
    }

    #[test]
    fn test_value_text_flattens_lists_and_numbers() {
        use serde_json::json;
        assert_eq!(
            value_text(&json!(["full-time", "contract"])),
            Some("full-time, contract".to_string())
        );
        assert_eq!(value_text(&json!(120000)), Some("120000".to_string()));
        assert_eq!(value_text(&json!("  ")), None);
        assert_eq!(value_text(&json!(null)), None);
        assert_eq!(value_text(&json!([])), None);
    }

    #[test]
    fn test_build_client_succeeds() {
        assert!(build_client().is_ok());
    }
}
