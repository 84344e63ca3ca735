//! Cart display and editing.
//!
//! Quantity edits (`add`, `change`) only exist for the lifetime of one
//! invocation; removal goes through to the backend.

use greenmarket_core::{Price, ProductId, Quantity};
use greenmarket_storefront::{
    Backend, BrowseQuery, CartStore, Catalog, VoiceAction, VoiceCommand, apply_voice_command,
};

use super::catalog::print_products;
use super::session::Session;

/// Print cart lines with discounts, then totals including delivery.
#[allow(clippy::print_stdout)]
pub fn print_cart(session: &Session, cart: &CartStore<dyn Backend>, catalog: &Catalog) {
    let lines = cart.lines(catalog);
    if lines.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in &lines {
        println!(
            "{:<16} {:>4} kg x {:<12} -{:>2}%  {}",
            line.product.name,
            line.quantity.get(),
            Price::lkr(line.product.unit_price).to_string(),
            line.discount_percent,
            Price::lkr(line.line_total)
        );
    }

    let subtotal = cart.total_price(catalog);
    let delivery = session.checkout.delivery_fee;
    println!();
    println!("Total weight: {} kg", cart.total_weight());
    println!("Subtotal:     {}", Price::lkr(subtotal));
    println!("Delivery:     {}", Price::lkr(delivery));
    println!("Total:        {}", Price::lkr(subtotal + delivery));
}

/// Show the cart.
///
/// # Errors
///
/// Returns an error if the catalog or cart cannot be fetched.
pub async fn show(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = session.catalog().await?;
    let cart = session.cart().await?;
    print_cart(session, &cart, &catalog);
    Ok(())
}

/// Add `qty` units of a product.
///
/// # Errors
///
/// Returns an error if `qty` is zero or the backend cannot be reached.
pub async fn add(session: &Session, id: &str, qty: u32) -> Result<(), Box<dyn std::error::Error>> {
    let quantity = Quantity::new(qty)?;
    let catalog = session.catalog().await?;
    let cart = session.cart().await?;

    let id = ProductId::new(id);
    if catalog.get(&id).is_none() {
        tracing::warn!(product = %id, "Adding a product the catalog does not list");
    }
    cart.add(&id, quantity);
    print_cart(session, &cart, &catalog);
    Ok(())
}

/// Change a line by `delta` units. Changes that would empty the line are
/// ignored.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
#[allow(clippy::print_stdout)]
pub async fn change(
    session: &Session,
    id: &str,
    delta: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = session.catalog().await?;
    let cart = session.cart().await?;

    if !cart.change_quantity(&ProductId::new(id), delta) {
        println!("Quantity unchanged (a line cannot drop below 1 kg; use `remove`).");
    }
    print_cart(session, &cart, &catalog);
    Ok(())
}

/// Remove a product from the cart.
///
/// # Errors
///
/// Returns an error if the backend refuses or cannot be reached; the cart
/// is left as it was.
pub async fn remove(session: &Session, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = session.catalog().await?;
    let cart = session.cart().await?;

    cart.remove(&ProductId::new(id)).await?;
    print_cart(session, &cart, &catalog);
    Ok(())
}

/// Apply a voice transcript: remove a named product or search the catalog.
///
/// # Errors
///
/// Returns an error if the named product is not in the cart or the backend
/// fails.
#[allow(clippy::print_stdout)]
pub async fn say(session: &Session, transcript: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = VoiceCommand::parse(transcript) else {
        println!("Nothing heard.");
        return Ok(());
    };

    let catalog = session.catalog().await?;
    let cart = session.cart().await?;

    match apply_voice_command(command, &catalog, &cart).await? {
        VoiceAction::Removed(id) => {
            let name = catalog.get(&id).map_or(id.as_str(), |p| p.name.as_str());
            println!("\"{name}\" has been removed from your cart.");
            println!();
            print_cart(session, &cart, &catalog);
        }
        VoiceAction::Search(term) => {
            println!("Searching for \"{term}\":");
            print_products(&catalog.browse(&BrowseQuery::new().search(term)));
        }
    }
    Ok(())
}
