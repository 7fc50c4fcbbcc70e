//! HTTP plumbing shared by every backend: client construction, transport
//! error mapping, and status-code classification.

use draftpress_core::ProviderError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

/// Longest slice of an error body carried into an error message.
const MAX_ERROR_BODY: usize = 500;

/// Build a client whose every request is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Unreachable(format!("Failed to create HTTP client: {e}")))
}

/// Map a transport failure: elapsed timeouts are `Timeout`, the rest `Unreachable`.
pub fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Unreachable(e.to_string())
    }
}

/// Read the body of a response, turning non-2xx statuses into classified errors.
pub async fn read_success(provider: &str, response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let body = response.text().await.map_err(transport_error)?;

    if (200..300).contains(&status) {
        return Ok(body);
    }

    warn!(provider, status, body = %truncate(&body), "Provider returned error");
    Err(classify_status(provider, status, retry_after, &body))
}

/// Classify a non-success HTTP status.
pub fn classify_status(
    provider: &str,
    status: u16,
    retry_after_secs: Option<u64>,
    body: &str,
) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthFailure(format!(
            "{provider} rejected the API key or its permissions (status {status})"
        )),
        429 => ProviderError::RateLimited { retry_after_secs },
        408 | 504 => ProviderError::Timeout(format!("{provider} timed out (status {status})")),
        _ => ProviderError::Api {
            status_code: status,
            message: truncate(body),
        },
    }
}

/// Decode a JSON response body.
pub fn parse_json<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::MalformedResponse(format!("Failed to parse {provider} response: {e}"))
    })
}

/// Reject whitespace-only output; the normalizer needs real text.
pub fn non_empty_text(provider: &str, text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::MalformedResponse(format!(
            "{provider} response contained no text"
        )))
    } else {
        Ok(text)
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
