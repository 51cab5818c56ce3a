//! Cart commands.

use verdant_client::CartClient;
use verdant_core::{Cart, ProductId, SessionId};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Print the session's line items.
pub async fn show(client: &CartClient, session: &SessionId) -> CommandResult {
    let cart = client.fetch(session).await?;
    print_cart(&cart);
    Ok(())
}

/// Add units of a product.
pub async fn add(
    client: &CartClient,
    session: &SessionId,
    product_id: &str,
    quantity: u32,
) -> CommandResult {
    let product_id = ProductId::parse(product_id)?;
    let cart = client.add(session, &product_id, quantity).await?;
    println!("Added {quantity} x {product_id}");
    print_cart(&cart);
    Ok(())
}

/// Set a line's quantity.
pub async fn update(
    client: &CartClient,
    session: &SessionId,
    product_id: &str,
    quantity: i64,
) -> CommandResult {
    let product_id = ProductId::parse(product_id)?;
    let cart = client.update(session, &product_id, quantity).await?;
    println!(
        "{}",
        update_message(&product_id, quantity, cart.get(&product_id).is_some())
    );
    print_cart(&cart);
    Ok(())
}

/// Quantities of zero or less remove the line.
fn update_message(product_id: &ProductId, quantity: i64, in_cart: bool) -> String {
    if quantity <= 0 {
        format!("Removed {product_id}")
    } else if in_cart {
        format!("Set {product_id} to {quantity}")
    } else {
        format!("{product_id} is not in the cart")
    }
}

/// Remove a product's line.
pub async fn remove(client: &CartClient, session: &SessionId, product_id: &str) -> CommandResult {
    let product_id = ProductId::parse(product_id)?;
    let cart = client.remove(session, &product_id).await?;
    println!("Removed {product_id}");
    print_cart(&cart);
    Ok(())
}

/// Empty the cart.
pub async fn clear(client: &CartClient, session: &SessionId) -> CommandResult {
    client.clear(session).await?;
    println!("Cart cleared");
    Ok(())
}

/// Print totals at current prices.
pub async fn summary(client: &CartClient, session: &SessionId) -> CommandResult {
    let summary = client.summary(session).await?;
    println!("Items: {}", summary.total_items);
    println!("Total: {}", summary.formatted_total);
    if !summary.unpriced_product_ids.is_empty() {
        let ids: Vec<&str> = summary
            .unpriced_product_ids
            .iter()
            .map(ProductId::as_str)
            .collect();
        println!("Not in catalog (excluded from total): {}", ids.join(", "));
    }
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>4} x {:<24} added {}",
            item.quantity,
            item.product_id,
            item.added_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    println!("{} item(s)", cart.total_items());
}
