//! Cart commands.

use clementine_client::state::Storefront;
use clementine_core::{Price, ProductId};

/// Print the cart contents and total.
pub fn show(store: &Storefront) {
    let cart = store.cart().snapshot();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "{:>6}  {:<34} x{:<4} {:>10}",
            line.product_id,
            line.name,
            line.quantity,
            Price::new(line.line_total()).to_string()
        );
    }
    println!();
    println!(
        "{} item(s), total {}",
        cart.item_count(),
        Price::new(cart.total())
    );
}

/// Fetch a product and add it to the cart.
pub async fn add(
    store: &Storefront,
    id: i64,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let product = store.client().product(ProductId::new(id)).await?;
    store.cart().add(&product, quantity);
    println!("Added {} x{quantity}.", product.name);
    show(store);
    Ok(())
}

/// Remove a product from the cart.
pub fn remove(store: &Storefront, id: i64) {
    store.cart().remove(ProductId::new(id));
    show(store);
}

/// Set a line's quantity directly.
pub fn set(store: &Storefront, id: i64, quantity: u32) {
    store.cart().set_quantity(ProductId::new(id), quantity);
    show(store);
}

/// Empty the cart.
pub fn clear(store: &Storefront) {
    store.cart().clear();
    println!("Cart cleared.");
}
