//! `reqwest`-backed implementation of the [`Transport`] seam.

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::StoreConfig;

use super::{ApiError, Method, TokenStore, Transport};

/// HTTP transport for the remote store API.
///
/// Attaches the session's bearer token to every request, applies the
/// configured timeout, and retries failed GET requests once per the
/// configured retry count (network-class failures only, no backoff).
/// Mutations are never retried: a timed-out POST may still have been
/// applied server-side.
#[derive(Debug, Clone)]
pub struct RestTransport {
    client: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
    retry: u32,
}

impl RestTransport {
    /// Create a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error if the HTTP client cannot be
    /// constructed (e.g., TLS backend initialization failure).
    pub fn new(config: &StoreConfig, tokens: TokenStore) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            tokens,
            retry: config.retry,
        })
    }

    async fn execute_once(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Validation(format!("invalid request path {path}: {e}")))?;

        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.tokens.token() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();

        // Read the body as text first for better error diagnostics.
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %truncate(&text),
                "store API returned non-success status"
            );
            return Err(ApiError::from_status(
                status.as_u16(),
                server_message(&text, status),
            ));
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&text),
                "failed to parse store API response"
            );
            ApiError::Parse(e.to_string())
        })
    }
}

impl Transport for RestTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut attempt = 0;
        loop {
            match self.execute_once(method, path, query, body.as_ref()).await {
                Err(e) if method == Method::Get && e.is_retryable() && attempt < self.retry => {
                    attempt += 1;
                    debug!(
                        method = method.as_str(),
                        path,
                        attempt,
                        error = %e,
                        "retrying after network error"
                    );
                }
                result => return result,
            }
        }
    }
}

/// Extract the server's `message` field, falling back to the raw body or
/// the status reason.
fn server_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(message) = value.get("message").and_then(Value::as_str)
    {
        return message.to_owned();
    }
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned()
    } else {
        truncate(body)
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_message_field() {
        let body = r#"{"message": "Product not found"}"#;
        assert_eq!(
            server_message(body, StatusCode::NOT_FOUND),
            "Product not found"
        );
    }

    #[test]
    fn server_message_falls_back_to_body_text() {
        assert_eq!(
            server_message("plain failure", StatusCode::BAD_GATEWAY),
            "plain failure"
        );
    }

    #[test]
    fn server_message_falls_back_to_status_reason() {
        assert_eq!(
            server_message("", StatusCode::SERVICE_UNAVAILABLE),
            "Service Unavailable"
        );
    }

    #[test]
    fn truncate_caps_long_bodies() {
        let long = "x".repeat(500);
        assert_eq!(truncate(&long).len(), 200);
    }
}
