//! Order history and checkout commands.

use clementine_client::state::Storefront;
use clementine_core::{OrderId, Price};

/// Place an order for the cart's contents.
pub async fn checkout(store: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let order = store.checkout().await?;
    println!("Order #{} placed on {}.", order.id, order.order_date);
    Ok(())
}

/// List the logged-in user's orders with their aggregate stats.
pub async fn list(store: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let user = store.auth().current_user().await?;
    let orders = store.client().orders_for_user(user.id).await?;

    for order in &orders {
        println!("{:>6}  {}", order.id, order.order_date);
    }

    let stats = store.client().user_order_stats(user.id).await?;
    println!();
    println!(
        "{} order(s), {} spent",
        stats.total_orders,
        Price::new(stats.total_spent)
    );
    Ok(())
}

/// Show one order with its products and server-computed total.
pub async fn show(store: &Storefront, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let id = OrderId::new(id);
    let order = store.client().order(id).await?;
    println!("Order #{} placed on {}.", order.id, order.order_date);

    let products = store.client().order_products(id).await?;
    for product in &products {
        println!("{:>6}  {:<40} {:>10}", product.id, product.name, Price::new(product.price).to_string());
    }

    let total = store.client().order_total(id).await?;
    println!();
    println!(
        "{} product(s), total {}",
        total.product_count,
        Price::new(total.total_price)
    );
    Ok(())
}
