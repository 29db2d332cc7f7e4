//! Domain models for the remote store API.
//!
//! Field names and shapes follow the wire format of the REST API. Prices
//! arrive as JSON numbers, so decimal fields use the float (de)serializer
//! to keep arithmetic exact on our side of the wire.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderId, ProductId, UserId};

// =============================================================================
// Products
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    #[serde(rename = "product_name")]
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    /// Display name.
    #[serde(rename = "product_name")]
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Partial update for a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    /// New display name, if changing.
    #[serde(rename = "product_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New unit price, if changing.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// The user who placed the order.
    pub user_id: UserId,
    /// Server-side placement timestamp (no timezone on the wire).
    pub order_date: NaiveDateTime,
    /// Ordered products, when the endpoint embeds them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
}

/// Payload for placing an order.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    /// The purchasing user.
    pub user_id: UserId,
    /// Products in the order.
    pub product_ids: Vec<ProductId>,
}

/// Server-computed total for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotal {
    /// Order ID.
    pub order_id: OrderId,
    /// Sum of product prices in the order.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    /// Number of products in the order.
    pub product_count: u32,
}

/// Aggregate order statistics for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    /// User ID.
    pub user_id: UserId,
    /// Lifetime order count.
    pub total_orders: u32,
    /// Lifetime spend.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
}

// =============================================================================
// Users
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Shipping address.
    pub address: String,
}

/// Registration payload.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Plaintext password, sent once over TLS.
    pub password: String,
    /// Shipping address.
    pub address: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("address", &self.address)
            .finish()
    }
}

/// Login payload.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Email address.
    pub email: Email,
    /// Plaintext password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The authenticated user's display name.
    pub name: String,
}

/// Partial update for a user profile. `None` fields are left untouched.
#[derive(Clone, Default, Serialize)]
pub struct UserPatch {
    /// New display name, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email address, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// New shipping address, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New password, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPatch")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("address", &self.address)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
