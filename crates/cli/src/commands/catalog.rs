//! Catalog listing and postal code lookup.

use std::sync::Arc;

use greenmarket_core::{Price, Product};
use greenmarket_storefront::{BrowseQuery, LookupOutcome, PostalLookup, SortOrder};

use super::session::Session;

/// Print a product listing.
#[allow(clippy::print_stdout)]
pub fn print_products(products: &[&Product]) {
    if products.is_empty() {
        println!("No products match.");
        return;
    }
    for product in products {
        println!(
            "{:<18} {:<16} {:<10} {}/kg",
            product.id.as_str(),
            product.name,
            product.category,
            Price::lkr(product.unit_price)
        );
    }
}

/// List catalog products filtered by name and category.
///
/// # Errors
///
/// Returns an error if the sort order is unknown or the catalog cannot be
/// fetched.
pub async fn products(
    session: &Session,
    search: &str,
    category: &str,
    sort: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let sort: SortOrder = sort.parse()?;
    let catalog = session.catalog().await?;

    let query = BrowseQuery::new().search(search).category(category).sort(sort);
    print_products(&catalog.browse(&query));
    Ok(())
}

/// Resolve a postal code to its area and district.
///
/// # Errors
///
/// Returns an error if the locality service is unreachable or not
/// configured.
#[allow(clippy::print_stdout)]
pub async fn lookup(session: &Session, postal_code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let lookup = PostalLookup::new(Arc::clone(&session.backend), session.checkout.lookup_debounce);

    match lookup.resolve(postal_code).await {
        LookupOutcome::Resolved(locality) => {
            println!("{} ({} district)", locality.area, locality.district);
        }
        LookupOutcome::NotFound => println!("No locality found for {postal_code}."),
        LookupOutcome::Cleared => println!("Enter 3 to 5 digits to look up a locality."),
        LookupOutcome::Superseded => println!("Lookup was superseded."),
        LookupOutcome::Failed(error) => return Err(error.into()),
    }
    Ok(())
}
