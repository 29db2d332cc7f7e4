//! Unified client error type.
//!
//! Module-level error enums (`ApiError`, `AuthError`, `StorageError`)
//! stay typed at their seams; `StoreError` is the union the facade and
//! consuming binaries work with.

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Facade-level error for storefront operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Remote API operation failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Durable storage failed in a context where it matters.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed.
    #[error("could not initialize HTTP client: {0}")]
    Init(String),

    /// Checkout was attempted with an empty cart.
    #[error("the cart is empty")]
    EmptyCart,
}

/// Result type alias for [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
