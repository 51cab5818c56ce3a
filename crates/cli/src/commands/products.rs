//! Catalog listing.

use verdant_client::CartClient;

/// Print the catalog as a table.
pub async fn list(
    client: &CartClient,
    category: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let products = client.products(category).await?;

    if products.is_empty() {
        println!("No products found");
        return Ok(());
    }

    for product in &products {
        println!(
            "{:<24} {:<24} {:<10} {:>9}",
            product.id.as_str(),
            product.name,
            product.category,
            product.price.to_string()
        );
    }
    Ok(())
}
