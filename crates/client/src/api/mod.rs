//! Remote store API access.
//!
//! # Architecture
//!
//! - [`Transport`] is the HTTP collaborator seam: `request(method, path,
//!   query, body)` returning JSON or a classified [`ApiError`].
//!   [`RestTransport`] implements it with `reqwest`; unit tests use
//!   scripted doubles.
//! - [`StoreClient`] provides typed operations on top of a transport,
//!   with reads served through an in-memory cache (freshness window,
//!   request coalescing) and mutations invalidating cached entries per
//!   the declared dependency table in [`cache`].
//!
//! # Example
//!
//! ```rust,ignore
//! use clementine_client::api::{RestTransport, StoreClient, TokenStore};
//!
//! let tokens = TokenStore::new();
//! let transport = RestTransport::new(&config, tokens.clone())?;
//! let client = StoreClient::new(transport, &config);
//!
//! let page = client.products(1, 12).await?;
//! let product = client.product(page.items[0].id).await?;
//! ```

pub mod cache;
mod client;
mod rest;
#[cfg(test)]
pub(crate) mod testing;

pub use client::StoreClient;
pub use rest::RestTransport;

use std::future::Future;
use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use serde_json::Value;
use thiserror::Error;

/// HTTP method for a [`Transport`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The method name on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Errors from the remote store API.
///
/// Variants carry rendered strings rather than source errors so the type
/// stays `Clone`: coalesced readers waiting on one in-flight request all
/// observe the same failure.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the request (4xx other than 401/404).
    #[error("client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// The server failed to process the request (5xx).
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Parse(String),

    /// Rejected locally before any network call.
    #[error("invalid request: {0}")]
    Validation(String),
}

/// Coarse classification of an [`ApiError`], derived from HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request was wrong (including local validation failures).
    Client,
    /// The server misbehaved.
    Server,
    /// The network did.
    Network,
}

impl ApiError {
    /// Build an error from a response status and the server's message.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            400..=499 => Self::Client { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// Classify this error as client, server, or network.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Network(_) => ErrorClass::Network,
            Self::Server { .. } => ErrorClass::Server,
            Self::Client { .. }
            | Self::Unauthorized(_)
            | Self::NotFound(_)
            | Self::Parse(_)
            | Self::Validation(_) => ErrorClass::Client,
        }
    }

    /// Whether a retry could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::Network)
    }
}

/// The HTTP API collaborator.
///
/// One method, mirroring the shape of the remote REST API: a method, a
/// path relative to the configured base URL, query parameters, and an
/// optional JSON body. Implementations classify failures into
/// [`ApiError`].
pub trait Transport: Send + Sync + 'static {
    /// Perform one request and return the decoded JSON body.
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// Shared holder for the session's bearer token.
///
/// The transport reads it on every request; the auth session writes it on
/// login/logout. Cloning shares the underlying slot.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<SecretString>>>,
}

impl TokenStore {
    /// Create an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_ok_and(|guard| guard.is_some())
    }

    /// Replace the stored token.
    pub fn set(&self, token: SecretString) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(token);
        }
    }

    /// Drop the stored token.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }
}
