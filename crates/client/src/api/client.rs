//! Typed, cached access to the remote store API.

use std::sync::Arc;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use clementine_core::{
    Credentials, LoginResponse, NewOrder, NewProduct, NewUser, Order, OrderId, OrderStats,
    OrderTotal, Paginated, Product, ProductId, ProductPatch, User, UserId, UserPatch,
};

use crate::config::{MAX_PER_PAGE, StoreConfig};

use super::cache::{CacheKey, CacheValue, Resource};
use super::{ApiError, Method, Transport};

/// Client for the remote store API.
///
/// Reads are served through an in-memory cache: identical keys within the
/// freshness window return the cached value without a network call, and
/// concurrent reads of one key coalesce into a single in-flight request.
/// A failed fetch caches nothing; every waiter observes the error.
/// Successful mutations invalidate cached entries per the dependency
/// table in [`Resource::invalidates`]; failed mutations touch nothing.
///
/// Dropping a read future abandons only that caller's wait; a coalesced
/// in-flight fetch is carried to completion (or failure) by the waiters
/// that remain.
///
/// Cheaply cloneable; clones share the cache.
pub struct StoreClient<T> {
    inner: Arc<ClientInner<T>>,
}

impl<T> Clone for StoreClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ClientInner<T> {
    transport: T,
    cache: Cache<CacheKey, CacheValue>,
}

impl<T: Transport> StoreClient<T> {
    /// Create a client over `transport`, sizing the cache from config.
    #[must_use]
    pub fn new(transport: T, config: &StoreConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .support_invalidation_closures()
            .build();

        Self {
            inner: Arc::new(ClientInner { transport, cache }),
        }
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a page of the product catalog.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range paging parameters
    /// (before any network call), or an API error if the fetch fails.
    #[instrument(skip(self))]
    pub async fn products(&self, page: u32, per_page: u32) -> Result<Paginated<Product>, ApiError> {
        validate_paging(page, per_page)?;

        let key = CacheKey::Products { page, per_page };
        let value = self
            .read(key, Method::Get, "products".to_owned(), paging_query(page, per_page), |raw| {
                Ok(CacheValue::Products(decode(raw)?))
            })
            .await?;

        match value {
            CacheValue::Products(products) => Ok(products),
            _ => Err(cache_shape_error()),
        }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the fetch fails.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let value = self
            .read(
                CacheKey::Product(id),
                Method::Get,
                format!("products/{id}"),
                Vec::new(),
                |raw| Ok(CacheValue::Product(Box::new(decode(raw)?))),
            )
            .await?;

        match value {
            CacheValue::Product(product) => Ok(*product),
            _ => Err(cache_shape_error()),
        }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the payload or the request
    /// fails.
    #[instrument(skip(self, product))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let raw = self
            .inner
            .transport
            .request(Method::Post, "products", &[], Some(encode(product)?))
            .await?;
        let created = decode(raw)?;
        self.invalidate(Resource::Products).await;
        Ok(created)
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the API rejects
    /// the patch; cached product entries are untouched on failure.
    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let raw = self
            .inner
            .transport
            .request(
                Method::Put,
                &format!("products/{id}"),
                &[],
                Some(encode(patch)?),
            )
            .await?;
        let updated = decode(raw)?;
        self.invalidate(Resource::Products).await;
        Ok(updated)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.inner
            .transport
            .request(Method::Delete, &format!("products/{id}"), &[], None)
            .await?;
        self.invalidate(Resource::Products).await;
        Ok(())
    }

    /// Delete several products in one request.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID list, or an API error
    /// if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_products(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        if ids.is_empty() {
            return Err(ApiError::Validation(
                "at least one product ID is required".to_owned(),
            ));
        }
        let body = serde_json::json!({ "product_ids": ids });
        self.inner
            .transport
            .request(Method::Delete, "products/delete_multiple", &[], Some(body))
            .await?;
        self.invalidate(Resource::Products).await;
        Ok(())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Get all orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let value = self
            .read(CacheKey::Orders, Method::Get, "orders".to_owned(), Vec::new(), |raw| {
                Ok(CacheValue::Orders(decode(raw)?))
            })
            .await?;

        match value {
            CacheValue::Orders(orders) => Ok(orders),
            _ => Err(cache_shape_error()),
        }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the fetch fails.
    #[instrument(skip(self))]
    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        let value = self
            .read(
                CacheKey::Order(id),
                Method::Get,
                format!("orders/{id}"),
                Vec::new(),
                |raw| Ok(CacheValue::Order(Box::new(decode(raw)?))),
            )
            .await?;

        match value {
            CacheValue::Order(order) => Ok(*order),
            _ => Err(cache_shape_error()),
        }
    }

    /// Get a user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist, has no orders, or the
    /// fetch fails.
    #[instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, ApiError> {
        let value = self
            .read(
                CacheKey::UserOrders(user_id),
                Method::Get,
                format!("orders/user/{user_id}"),
                Vec::new(),
                |raw| Ok(CacheValue::Orders(decode(raw)?)),
            )
            .await?;

        match value {
            CacheValue::Orders(orders) => Ok(orders),
            _ => Err(cache_shape_error()),
        }
    }

    /// Get the products in an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the fetch fails.
    #[instrument(skip(self))]
    pub async fn order_products(&self, order_id: OrderId) -> Result<Vec<Product>, ApiError> {
        let value = self
            .read(
                CacheKey::OrderProducts(order_id),
                Method::Get,
                format!("orders/{order_id}/products"),
                Vec::new(),
                |raw| Ok(CacheValue::OrderProducts(decode(raw)?)),
            )
            .await?;

        match value {
            CacheValue::OrderProducts(products) => Ok(products),
            _ => Err(cache_shape_error()),
        }
    }

    /// Get the server-computed total for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the fetch fails.
    #[instrument(skip(self))]
    pub async fn order_total(&self, order_id: OrderId) -> Result<OrderTotal, ApiError> {
        let value = self
            .read(
                CacheKey::OrderTotal(order_id),
                Method::Get,
                format!("orders/{order_id}/total"),
                Vec::new(),
                |raw| Ok(CacheValue::OrderTotal(decode(raw)?)),
            )
            .await?;

        match value {
            CacheValue::OrderTotal(total) => Ok(total),
            _ => Err(cache_shape_error()),
        }
    }

    /// Get aggregate order statistics for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the fetch fails.
    #[instrument(skip(self))]
    pub async fn user_order_stats(&self, user_id: UserId) -> Result<OrderStats, ApiError> {
        let value = self
            .read(
                CacheKey::UserOrderStats(user_id),
                Method::Get,
                format!("users/{user_id}/order_stats"),
                Vec::new(),
                |raw| Ok(CacheValue::OrderStats(decode(raw)?)),
            )
            .await?;

        match value {
            CacheValue::OrderStats(stats) => Ok(stats),
            _ => Err(cache_shape_error()),
        }
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty product list (before any
    /// network call), or an API error if order creation fails.
    #[instrument(skip(self, order))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        if order.product_ids.is_empty() {
            return Err(ApiError::Validation(
                "an order needs at least one product".to_owned(),
            ));
        }
        let raw = self
            .inner
            .transport
            .request(Method::Post, "orders", &[], Some(encode(order)?))
            .await?;
        let created = decode(raw)?;
        self.invalidate(Resource::Orders).await;
        Ok(created)
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.inner
            .transport
            .request(Method::Delete, &format!("orders/{id}"), &[], None)
            .await?;
        self.invalidate(Resource::Orders).await;
        Ok(())
    }

    // =========================================================================
    // User Methods
    // =========================================================================

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the account already exists or the request
    /// fails.
    #[instrument(skip(self, user))]
    pub async fn register(&self, user: &NewUser) -> Result<(), ApiError> {
        self.inner
            .transport
            .request(Method::Post, "register", &[], Some(encode(user)?))
            .await?;
        Ok(())
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request
    /// fails.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let raw = self
            .inner
            .transport
            .request(Method::Post, "login", &[], Some(encode(credentials)?))
            .await?;
        decode(raw)
    }

    /// Get the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is active or the fetch fails.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let value = self
            .read(
                CacheKey::CurrentUser,
                Method::Get,
                "users/me".to_owned(),
                Vec::new(),
                |raw| Ok(CacheValue::User(Box::new(decode(raw)?))),
            )
            .await?;

        match value {
            CacheValue::User(user) => Ok(*user),
            _ => Err(cache_shape_error()),
        }
    }

    /// Update a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected; cached user entries
    /// are untouched on failure.
    #[instrument(skip(self, patch))]
    pub async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<User, ApiError> {
        let raw = self
            .inner
            .transport
            .request(Method::Put, &format!("users/{id}"), &[], Some(encode(patch)?))
            .await?;
        let updated = decode(raw)?;
        self.invalidate(Resource::Users).await;
        Ok(updated)
    }

    /// Delete a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.inner
            .transport
            .request(Method::Delete, &format!("users/{id}"), &[], None)
            .await?;
        self.invalidate(Resource::Users).await;
        Ok(())
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate every cached entry whose resource appears in the
    /// dependency table row for `mutated`.
    pub async fn invalidate(&self, mutated: Resource) {
        for &resource in mutated.invalidates() {
            if let Err(e) = self
                .inner
                .cache
                .invalidate_entries_if(move |key, _| key.resource() == resource)
            {
                tracing::error!(?resource, error = %e, "cache invalidation failed");
            }
        }
        self.inner.cache.run_pending_tasks().await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    /// Serve `key` from cache, or fetch it, coalescing concurrent callers.
    async fn read(
        &self,
        key: CacheKey,
        method: Method,
        path: String,
        query: Vec<(String, String)>,
        convert: fn(Value) -> Result<CacheValue, ApiError>,
    ) -> Result<CacheValue, ApiError> {
        if self.inner.cache.contains_key(&key) {
            debug!(?key, "cache hit");
        }
        self.inner
            .cache
            .try_get_with(key, async {
                let raw = self
                    .inner
                    .transport
                    .request(method, &path, &query, None)
                    .await?;
                convert(raw)
            })
            .await
            .map_err(|e: Arc<ApiError>| (*e).clone())
    }
}

fn paging_query(page: u32, per_page: u32) -> Vec<(String, String)> {
    vec![
        ("page".to_owned(), page.to_string()),
        ("per_page".to_owned(), per_page.to_string()),
    ]
}

fn validate_paging(page: u32, per_page: u32) -> Result<(), ApiError> {
    if page == 0 {
        return Err(ApiError::Validation("page must be >= 1".to_owned()));
    }
    if per_page == 0 || per_page > MAX_PER_PAGE {
        return Err(ApiError::Validation(format!(
            "per_page must be between 1 and {MAX_PER_PAGE}"
        )));
    }
    Ok(())
}

fn decode<D: DeserializeOwned>(raw: Value) -> Result<D, ApiError> {
    serde_json::from_value(raw).map_err(|e| ApiError::Parse(e.to_string()))
}

fn encode<S: serde::Serialize>(value: &S) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}

fn cache_shape_error() -> ApiError {
    ApiError::Parse("cached value shape does not match its key".to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::super::testing::{
        MockTransport, orders_json, page_json, product_json, test_config, user_json,
    };
    use super::*;

    #[tokio::test]
    async fn fresh_reads_are_served_from_cache() {
        let transport = MockTransport::new(vec![Ok(page_json(&["Mug"]))]);
        let client = StoreClient::new(transport.clone(), &test_config());

        let first = client.products(1, 12).await.unwrap();
        let second = client.products(1, 12).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn distinct_keys_fetch_independently() {
        let transport =
            MockTransport::new(vec![Ok(page_json(&["Mug"])), Ok(page_json(&["Tray"]))]);
        let client = StoreClient::new(transport.clone(), &test_config());

        client.products(1, 12).await.unwrap();
        client.products(2, 12).await.unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_duplicate_reads_coalesce() {
        let transport = MockTransport::new(vec![Ok(page_json(&["Mug"]))])
            .with_delay(Duration::from_millis(50));
        let client = StoreClient::new(transport.clone(), &test_config());

        let (a, b) = tokio::join!(client.products(1, 12), client.products(1, 12));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn failed_reads_cache_nothing() {
        let transport = MockTransport::new(vec![
            Err(ApiError::Network("connection refused".to_owned())),
            Ok(page_json(&["Mug"])),
        ]);
        let client = StoreClient::new(transport.clone(), &test_config());

        let err = client.products(1, 12).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));

        client.products(1, 12).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn validation_errors_never_reach_the_network() {
        let transport = MockTransport::new(vec![]);
        let client = StoreClient::new(transport.clone(), &test_config());

        assert!(matches!(
            client.products(0, 12).await.unwrap_err(),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            client.products(1, 101).await.unwrap_err(),
            ApiError::Validation(_)
        ));

        let empty_order = NewOrder {
            user_id: UserId::new(9),
            product_ids: Vec::new(),
        };
        assert!(matches!(
            client.create_order(&empty_order).await.unwrap_err(),
            ApiError::Validation(_)
        ));

        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_cached_entries_untouched() {
        let transport = MockTransport::new(vec![
            Ok(page_json(&["Mug"])),
            Err(ApiError::from_status(500, "boom".to_owned())),
        ]);
        let client = StoreClient::new(transport.clone(), &test_config());

        let before = client.products(1, 12).await.unwrap();

        let patch = ProductPatch {
            name: Some("Lungo Mug".to_owned()),
            price: None,
        };
        let err = client
            .update_product(ProductId::new(1), &patch)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Server { .. }));

        // Still served from cache: no third transport call.
        let after = client.products(1, 12).await.unwrap();
        assert_eq!(before, after);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn successful_mutation_invalidates_per_the_dependency_table() {
        let transport = MockTransport::new(vec![
            Ok(orders_json()),
            Ok(page_json(&["Mug"])),
            Ok(product_json(1, "Lungo Mug")),
            Ok(page_json(&["Lungo Mug"])),
        ]);
        let client = StoreClient::new(transport.clone(), &test_config());

        client.orders().await.unwrap();
        client.products(1, 12).await.unwrap();
        assert_eq!(transport.calls(), 2);

        let patch = ProductPatch {
            name: Some("Lungo Mug".to_owned()),
            price: None,
        };
        client
            .update_product(ProductId::new(1), &patch)
            .await
            .unwrap();
        assert_eq!(transport.calls(), 3);

        // Order entries are unrelated to product mutations and stay cached.
        client.orders().await.unwrap();
        assert_eq!(transport.calls(), 3);

        // Product entries were swept and refetch on the next read.
        let refreshed = client.products(1, 12).await.unwrap();
        assert_eq!(refreshed.items[0].name, "Lungo Mug");
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test]
    async fn current_user_is_cached_until_a_user_mutation() {
        let transport = MockTransport::new(vec![
            Ok(user_json("Ada")),
            Ok(user_json("Ada L.")),
            Ok(user_json("Ada L.")),
        ]);
        let client = StoreClient::new(transport.clone(), &test_config());

        client.current_user().await.unwrap();
        client.current_user().await.unwrap();
        assert_eq!(transport.calls(), 1);

        let patch = UserPatch {
            name: Some("Ada L.".to_owned()),
            ..UserPatch::default()
        };
        client.update_user(UserId::new(9), &patch).await.unwrap();

        let refreshed = client.current_user().await.unwrap();
        assert_eq!(refreshed.name, "Ada L.");
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn missing_resources_surface_as_not_found() {
        let transport = MockTransport::new(vec![Err(ApiError::from_status(
            404,
            "Product not found".to_owned(),
        ))]);
        let client = StoreClient::new(transport.clone(), &test_config());

        let err = client.product(ProductId::new(42)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
