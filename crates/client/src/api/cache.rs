//! Cache types and the invalidation dependency table.
//!
//! Every cached read is keyed by [`CacheKey`]: a resource type plus the
//! parameters that identify the fetch. Each key belongs to one
//! [`Resource`] family, and [`Resource::invalidates`] declares which
//! families a successful mutation sweeps out of the cache. The table is
//! deliberately coarse: any product mutation drops every product entry,
//! not just the one touched.

use clementine_core::{
    Order, OrderId, OrderStats, OrderTotal, Paginated, Product, ProductId, User, UserId,
};

/// Resource families tracked by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Products,
    Orders,
    Users,
}

impl Resource {
    /// The invalidation dependency table.
    ///
    /// A successful mutation of `self` invalidates every cached key whose
    /// resource appears in the returned slice. Widen a row here when a new
    /// view starts depending on another family's data.
    #[must_use]
    pub const fn invalidates(self) -> &'static [Self] {
        match self {
            Self::Products => &[Self::Products],
            Self::Orders => &[Self::Orders],
            Self::Users => &[Self::Users],
        }
    }
}

/// Cache key for remote store reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products { page: u32, per_page: u32 },
    Product(ProductId),
    Orders,
    Order(OrderId),
    UserOrders(UserId),
    OrderProducts(OrderId),
    OrderTotal(OrderId),
    UserOrderStats(UserId),
    CurrentUser,
}

impl CacheKey {
    /// The resource family this key belongs to.
    #[must_use]
    pub const fn resource(&self) -> Resource {
        match self {
            Self::Products { .. } | Self::Product(_) => Resource::Products,
            Self::Orders
            | Self::Order(_)
            | Self::UserOrders(_)
            | Self::OrderProducts(_)
            | Self::OrderTotal(_)
            | Self::UserOrderStats(_) => Resource::Orders,
            Self::CurrentUser => Resource::Users,
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Paginated<Product>),
    Product(Box<Product>),
    Orders(Vec<Order>),
    Order(Box<Order>),
    OrderProducts(Vec<Product>),
    OrderTotal(OrderTotal),
    OrderStats(OrderStats),
    User(Box<User>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_their_resource_family() {
        assert_eq!(
            CacheKey::Products { page: 1, per_page: 12 }.resource(),
            Resource::Products
        );
        assert_eq!(
            CacheKey::Product(ProductId::new(1)).resource(),
            Resource::Products
        );
        assert_eq!(CacheKey::Orders.resource(), Resource::Orders);
        assert_eq!(
            CacheKey::UserOrderStats(UserId::new(2)).resource(),
            Resource::Orders
        );
        assert_eq!(CacheKey::CurrentUser.resource(), Resource::Users);
    }

    #[test]
    fn every_resource_invalidates_at_least_itself() {
        for resource in [Resource::Products, Resource::Orders, Resource::Users] {
            assert!(
                resource.invalidates().contains(&resource),
                "{resource:?} must invalidate its own entries"
            );
        }
    }
}
