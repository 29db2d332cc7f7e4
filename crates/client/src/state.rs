//! The storefront facade: one owned container wiring every collaborator.
//!
//! `Storefront` replaces what a browser app would keep in ambient global
//! stores: it is constructed explicitly (fresh per process or per test),
//! and hands out the cart store, the cached client, and the auth session.
//! Cross-component flows - today just checkout - live here.

use std::sync::Arc;

use tracing::instrument;

use clementine_core::{NewOrder, Order};

use crate::api::{RestTransport, StoreClient, TokenStore, Transport};
use crate::auth::AuthSession;
use crate::cart::CartStore;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::storage::{FileStorage, Storage};

/// Application state shared by whatever drives the storefront.
///
/// Cheaply cloneable via `Arc`.
pub struct Storefront<T: Transport = RestTransport> {
    inner: Arc<StorefrontInner<T>>,
}

impl<T: Transport> Clone for Storefront<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct StorefrontInner<T: Transport> {
    config: StoreConfig,
    client: StoreClient<T>,
    cart: CartStore,
    auth: AuthSession<T>,
}

impl Storefront<RestTransport> {
    /// Build a storefront from configuration, with file-backed durable
    /// storage under `config.data_dir` (or the platform data dir).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Init`] if the HTTP client cannot be built.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = match &config.data_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(FileStorage::in_data_dir()),
        };

        let tokens = TokenStore::new();
        let transport = RestTransport::new(&config, tokens.clone())
            .map_err(|e| StoreError::Init(e.to_string()))?;
        Ok(Self::from_parts(config, storage, transport, tokens))
    }
}

impl<T: Transport> Storefront<T> {
    /// Assemble a storefront from explicit collaborators.
    ///
    /// `tokens` must be the same store the transport reads its bearer
    /// token from.
    #[must_use]
    pub fn from_parts(
        config: StoreConfig,
        storage: Arc<dyn Storage>,
        transport: T,
        tokens: TokenStore,
    ) -> Self {
        let client = StoreClient::new(transport, &config);
        let cart = CartStore::new(Arc::clone(&storage));
        let auth = AuthSession::new(client.clone(), tokens, storage);

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                client,
                cart,
                auth,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the cached API client.
    #[must_use]
    pub fn client(&self) -> &StoreClient<T> {
        &self.inner.client
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the auth session.
    #[must_use]
    pub fn auth(&self) -> &AuthSession<T> {
        &self.inner.auth
    }

    /// Place an order for the cart's contents.
    ///
    /// Requires a logged-in session and a non-empty cart. On success the
    /// cart is cleared (and its persisted record erased); on failure the
    /// cart is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCart`] for an empty cart (no network
    /// call), an auth error without a session, or the API error from
    /// order creation.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Order> {
        let cart = self.inner.cart.snapshot();
        if cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let user = self.inner.auth.current_user().await?;
        let order = self
            .inner
            .client
            .create_order(&NewOrder {
                user_id: user.id,
                product_ids: cart.product_ids(),
            })
            .await?;

        self.inner.cart.clear();
        Ok(order)
    }
}
