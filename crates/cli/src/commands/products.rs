//! Catalog browsing commands.

use clementine_client::state::Storefront;
use clementine_core::{PageMark, Price, ProductId, page_window};

/// Print a page of the catalog with a page-control line.
pub async fn list(
    store: &Storefront,
    page: u32,
    per_page: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let per_page = per_page.unwrap_or(store.config().per_page);
    let products = store.client().products(page, per_page).await?;

    if products.items.is_empty() {
        println!("No products on this page.");
    }
    for product in &products.items {
        println!(
            "{:>6}  {:<40} {:>10}",
            product.id,
            product.name,
            Price::new(product.price).to_string()
        );
    }

    println!();
    println!(
        "page {} of {} ({} products)",
        products.page, products.total_pages, products.total_items
    );
    let window = page_window(products.page, products.total_pages)
        .iter()
        .map(|mark| match mark {
            PageMark::Page(p) if *p == products.page => format!("[{p}]"),
            PageMark::Page(p) => p.to_string(),
            PageMark::Gap => "...".to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!("{window}");

    Ok(())
}

/// Print one product.
pub async fn show(store: &Storefront, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let product = store.client().product(ProductId::new(id)).await?;
    println!("{}  (#{})", product.name, product.id);
    println!("{}", Price::new(product.price));
    Ok(())
}
