//! Clementine storefront client library.
//!
//! The state-management and data-fetching core a storefront view layer
//! consumes: a cart store with durable persistence, a cached remote data
//! client with declared invalidation, an auth session, and the
//! [`Storefront`](state::Storefront) facade that wires them together.
//!
//! # Architecture
//!
//! - [`api`] - HTTP transport seam, error taxonomy, and the cached
//!   [`StoreClient`](api::StoreClient)
//! - [`cart`] - [`CartStore`](cart::CartStore): pure transitions from
//!   `clementine-core`, persisted after every mutation
//! - [`auth`] - [`AuthSession`](auth::AuthSession): token lifecycle
//! - [`storage`] - the durable local storage collaborator
//! - [`state`] - the [`Storefront`](state::Storefront) facade (checkout)
//!
//! # Example
//!
//! ```rust,ignore
//! use clementine_client::config::StoreConfig;
//! use clementine_client::state::Storefront;
//!
//! let config = StoreConfig::from_env()?;
//! let store = Storefront::new(config)?;
//!
//! let page = store.client().products(1, 12).await?;
//! if let Some(product) = page.items.first() {
//!     store.cart().add(product, 1);
//! }
//! store.checkout().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
