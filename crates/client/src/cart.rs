//! The cart store: pure transitions plus persistence and subscription.
//!
//! `CartStore` owns a [`Cart`] behind a watch channel. Every mutation
//! applies the pure transition from `clementine-core`, persists the lines
//! to the durable storage collaborator, and publishes the new snapshot to
//! subscribers. Persistence is best-effort: a failed write is logged and
//! skipped, and a corrupt or missing persisted record hydrates as an
//! empty cart.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use clementine_core::{Cart, CartLine, Product, ProductId};

use crate::storage::{Storage, keys};

/// Owner of the shopping cart state and its persistence.
///
/// Construct one per process (or per test) with an injected [`Storage`];
/// there is no ambient singleton. Mutations are applied in call order.
pub struct CartStore {
    tx: watch::Sender<Cart>,
    storage: Arc<dyn Storage>,
}

impl CartStore {
    /// Create a store over `storage`, hydrating from the persisted cart.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let cart = load_cart(storage.as_ref());
        let (tx, _rx) = watch::channel(cart);
        Self { tx, storage }
    }

    /// The current cart, by value.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.tx.borrow().clone()
    }

    /// A read-only subscription that observes every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.tx.subscribe()
    }

    /// Add `quantity` units of `product` (merging with an existing line).
    pub fn add(&self, product: &Product, quantity: u32) {
        self.mutate(|cart| cart.add(product, quantity));
    }

    /// Remove the line for `product_id`. No-op if absent.
    pub fn remove(&self, product_id: ProductId) {
        self.mutate(|cart| cart.remove(product_id));
    }

    /// Set the quantity for `product_id`'s line; 0 removes the line.
    pub fn set_quantity(&self, product_id: ProductId, quantity: u32) {
        self.mutate(|cart| cart.set_quantity(product_id, quantity));
    }

    /// Empty the cart and erase the persisted record.
    pub fn clear(&self) {
        self.tx.send_modify(Cart::clear);
        if let Err(e) = self.storage.remove(keys::CART) {
            warn!(error = %e, "could not erase persisted cart");
        }
    }

    fn mutate(&self, transition: impl FnOnce(&mut Cart)) {
        self.tx.send_modify(transition);
        let snapshot = self.tx.borrow().clone();
        self.persist(&snapshot);
    }

    fn persist(&self, cart: &Cart) {
        match serde_json::to_string(cart.lines()) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(keys::CART, &raw) {
                    warn!(error = %e, "skipping cart persistence");
                }
            }
            Err(e) => warn!(error = %e, "could not serialize cart"),
        }
    }
}

fn load_cart(storage: &dyn Storage) -> Cart {
    match storage.get(keys::CART) {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
            Ok(lines) => Cart::from_lines(lines),
            Err(e) => {
                warn!(error = %e, "ignoring corrupt persisted cart");
                Cart::new()
            }
        },
        Ok(None) => Cart::new(),
        Err(e) => {
            warn!(error = %e, "could not read persisted cart");
            Cart::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use clementine_core::ProductId;

    use crate::storage::{MemoryStorage, StorageError};

    use super::*;

    fn product(id: i64, name: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: Decimal::new(cents, 2),
        }
    }

    fn store_with_empty_storage() -> (CartStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (CartStore::new(Arc::clone(&storage) as Arc<dyn Storage>), storage)
    }

    #[test]
    fn starts_empty_with_no_persisted_record() {
        let (store, _storage) = store_with_empty_storage();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn hydrates_from_persisted_lines() {
        let lines = serde_json::json!([
            { "product_id": 1, "name": "Mug", "unit_price": 10.0, "quantity": 2 }
        ]);
        let storage = Arc::new(MemoryStorage::with_entries([(
            keys::CART,
            lines.to_string(),
        )]));
        let store = CartStore::new(storage);

        let cart = store.snapshot();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total(), Decimal::new(2000, 2));
    }

    #[test]
    fn corrupt_persisted_record_hydrates_as_empty_cart() {
        let storage = Arc::new(MemoryStorage::with_entries([(keys::CART, "{not json")]));
        let store = CartStore::new(storage);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn mutations_persist_after_every_change() {
        let (store, storage) = store_with_empty_storage();
        store.add(&product(1, "Mug", 1000), 2);

        let raw = storage.get(keys::CART).unwrap().expect("persisted cart");
        let lines: Vec<CartLine> = serde_json::from_str(&raw).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);

        store.set_quantity(ProductId::new(1), 5);
        let raw = storage.get(keys::CART).unwrap().expect("persisted cart");
        let lines: Vec<CartLine> = serde_json::from_str(&raw).unwrap();
        assert_eq!(lines[0].quantity, 5);
    }

    #[test]
    fn clear_erases_the_persisted_record() {
        let (store, storage) = store_with_empty_storage();
        store.add(&product(1, "Mug", 1000), 1);
        assert!(storage.get(keys::CART).unwrap().is_some());

        store.clear();
        assert!(store.snapshot().is_empty());
        assert_eq!(storage.get(keys::CART).unwrap(), None);

        // A fresh store over the same storage sees nothing.
        let reloaded = CartStore::new(storage);
        assert!(reloaded.snapshot().is_empty());
    }

    #[test]
    fn persistence_failure_degrades_silently() {
        struct FullStorage;
        impl Storage for FullStorage {
            fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
                Ok(None)
            }
            fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
                Err(StorageError::Io(std::io::Error::other("quota exceeded")))
            }
            fn remove(&self, _key: &str) -> Result<(), StorageError> {
                Err(StorageError::Io(std::io::Error::other("quota exceeded")))
            }
        }

        let store = CartStore::new(Arc::new(FullStorage));
        store.add(&product(1, "Mug", 1000), 2);

        // In-memory state keeps working without durability.
        let cart = store.snapshot();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Decimal::new(2000, 2));

        store.clear();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn subscribers_observe_mutations() {
        let (store, _storage) = store_with_empty_storage();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.add(&product(1, "Mug", 1000), 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().item_count(), 1);

        store.remove(ProductId::new(1));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }
}
