//! The shopping cart state machine.
//!
//! `Cart` is pure state: every mutation recomputes the derived total from
//! scratch (never patched incrementally, so it cannot drift) and touches no
//! collaborator. Persistence and change notification live in the client
//! crate's cart store, which applies these transitions and then performs
//! the effects.
//!
//! Invariant: a line's quantity is always >= 1 while the line is present.
//! Any transition that would leave a quantity at 0 removes the line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::ProductId;

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// Display name captured when the line was added.
    pub name: String,
    /// Unit price captured when the line was added.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Quantity, always >= 1.
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An ordered collection of cart lines, one per product, with a derived
/// total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    total: Decimal,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted lines.
    ///
    /// Lines with a zero quantity are dropped rather than rejected, and
    /// the total is recomputed from what remains.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self {
            lines: lines.into_iter().filter(|l| l.quantity > 0).collect(),
            total: Decimal::ZERO,
        };
        cart.recompute_total();
        cart
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The derived total: sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The product IDs currently in the cart, in line order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|l| l.product_id).collect()
    }

    /// Add `quantity` units of `product`.
    ///
    /// If the product is already in the cart its quantity is incremented;
    /// otherwise a new line is appended. Adding zero units is a no-op.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
        {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            });
        }
        self.recompute_total();
    }

    /// Remove the line for `product_id`. No-op if absent.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
        self.recompute_total();
    }

    /// Set the quantity of `product_id`'s line directly (no increment).
    ///
    /// A quantity of 0 removes the line. No-op for products not in the
    /// cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
        self.recompute_total();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total = self.lines.iter().map(CartLine::line_total).sum();
    }
}
