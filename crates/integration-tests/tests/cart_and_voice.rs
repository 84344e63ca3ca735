//! Integration tests for the cart, voice commands and postal lookup.
//!
//! These tests use the seeded demo store: carrots (30 kg) and leeks (4 kg)
//! in the cart, potatoes and baby carrots only in the catalog.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use greenmarket_core::{ProductId, Quantity, UserId};
use greenmarket_storefront::backend::{CartData, Operation};
use greenmarket_storefront::{
    BrowseQuery, CartStore, Catalog, InMemoryBackend, LookupOutcome, PostalLookup, SortOrder,
    StorefrontError, VoiceAction, VoiceCommand, apply_voice_command,
};
use rust_decimal::Decimal;

struct Demo {
    user: UserId,
    backend: Arc<InMemoryBackend>,
    catalog: Catalog,
    cart: CartStore<InMemoryBackend>,
}

async fn demo() -> Demo {
    let user = UserId::new("demo-shopper");
    let backend = Arc::new(InMemoryBackend::seeded_demo(&user));
    let catalog = Catalog::fetch(backend.as_ref()).await.unwrap();
    let cart = CartStore::new(Arc::clone(&backend), user.clone());
    cart.load().await.unwrap();
    Demo {
        user,
        backend,
        catalog,
        cart,
    }
}

fn id(value: &str) -> ProductId {
    ProductId::new(value)
}

// =============================================================================
// Cart Totals
// =============================================================================

#[tokio::test]
async fn test_seeded_cart_totals() {
    let demo = demo().await;

    // Carrots: 30 x 320 at 7% = 8928; leeks: 4 x 180 undiscounted = 720
    assert_eq!(demo.cart.total_price(&demo.catalog), Decimal::from(9648));
    assert_eq!(demo.cart.total_weight(), 34);
    assert_eq!(demo.cart.lines(&demo.catalog).len(), 2);
}

#[tokio::test]
async fn test_unknown_cart_product_is_left_out_of_total() {
    let demo = demo().await;
    demo.backend.set_cart(
        &demo.user,
        CartData::from([(id("veg-carrot"), 30), (id("veg-discontinued"), 5)]),
    );
    demo.cart.load().await.unwrap();

    assert_eq!(demo.cart.lines(&demo.catalog).len(), 1);
    assert_eq!(demo.cart.total_price(&demo.catalog), Decimal::from(8928));
    // Weight still counts everything the shopper asked for
    assert_eq!(demo.cart.total_weight(), 35);
}

#[tokio::test]
async fn test_quantity_edits_reprice_lines() {
    let demo = demo().await;

    // 4 kg of leeks → 10 kg crosses into the 5% tier
    assert!(demo.cart.change_quantity(&id("veg-leeks"), 6));
    assert_eq!(demo.cart.quantity(&id("veg-leeks")), Some(Quantity::new(10).unwrap()));
    assert_eq!(demo.cart.total_price(&demo.catalog), Decimal::from(8928 + 1710));

    // A line never drops below 1 kg through a quantity change
    assert!(!demo.cart.change_quantity(&id("veg-leeks"), -10));
    assert_eq!(demo.cart.quantity(&id("veg-leeks")), Some(Quantity::new(10).unwrap()));

    demo.cart.add(&id("veg-potato"), Quantity::new(2).unwrap());
    assert_eq!(demo.cart.total_weight(), 42);
}

// =============================================================================
// Removal
// =============================================================================

#[tokio::test]
async fn test_remove_reaches_backend_and_notifies() {
    let demo = demo().await;
    let mut changes = demo.cart.subscribe();

    demo.cart.remove(&id("veg-leeks")).await.unwrap();

    assert!(changes.has_changed().unwrap());
    assert!(!changes.borrow_and_update().contains_key(&id("veg-leeks")));
    assert!(!demo.backend.cart(&demo.user).contains_key(&id("veg-leeks")));
}

#[tokio::test]
async fn test_failed_remove_restores_line() {
    let demo = demo().await;
    demo.backend.fail(Operation::RemoveFromCart);

    let result = demo.cart.remove(&id("veg-leeks")).await;

    assert!(matches!(result, Err(StorefrontError::Network(_))));
    assert_eq!(demo.cart.quantity(&id("veg-leeks")), Some(Quantity::new(4).unwrap()));
    assert_eq!(demo.backend.cart(&demo.user).get(&id("veg-leeks")), Some(&4));
}

// =============================================================================
// Voice Commands
// =============================================================================

#[tokio::test]
async fn test_voice_remove_by_name() {
    let demo = demo().await;
    let command = VoiceCommand::parse("Remove Leeks from the cart").unwrap();

    let action = apply_voice_command(command, &demo.catalog, &demo.cart)
        .await
        .unwrap();

    assert_eq!(action, VoiceAction::Removed(id("veg-leeks")));
    assert!(demo.cart.quantity(&id("veg-leeks")).is_none());
    assert_eq!(demo.backend.calls(Operation::RemoveFromCart), 1);
}

#[tokio::test]
async fn test_voice_remove_of_product_outside_cart() {
    let demo = demo().await;
    let command = VoiceCommand::parse("remove potato").unwrap();

    let result = apply_voice_command(command, &demo.catalog, &demo.cart).await;

    assert!(matches!(result, Err(StorefrontError::NotFound(_))));
    assert_eq!(demo.backend.calls(Operation::RemoveFromCart), 0);
}

#[tokio::test]
async fn test_voice_search_filters_catalog() {
    let demo = demo().await;
    let command = VoiceCommand::parse("Carrot").unwrap();

    let VoiceAction::Search(term) = apply_voice_command(command, &demo.catalog, &demo.cart)
        .await
        .unwrap()
    else {
        panic!("plain speech should become a search");
    };

    let query = BrowseQuery::new().search(term).sort(SortOrder::PriceDesc);
    let names: Vec<&str> = demo
        .catalog
        .browse(&query)
        .iter()
        .map(|product| product.name.as_str())
        .collect();
    assert_eq!(names, ["Baby Carrot", "Carrot"]);
}

// =============================================================================
// Postal Lookup
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_postal_lookup_resolves_known_code() {
    let demo = demo().await;
    let lookup = PostalLookup::new(Arc::clone(&demo.backend), Duration::from_millis(300));

    let LookupOutcome::Resolved(locality) = lookup.resolve("00300").await else {
        panic!("seeded code should resolve");
    };
    assert_eq!(locality.area, "Kollupitiya");
    assert_eq!(locality.district, "Colombo");

    assert!(matches!(lookup.resolve("99999").await, LookupOutcome::NotFound));
    assert!(matches!(lookup.resolve("12").await, LookupOutcome::Cleared));
    assert_eq!(demo.backend.calls(Operation::LookupLocality), 2);
}

#[tokio::test(start_paused = true)]
async fn test_postal_lookup_keeps_only_latest_input() {
    let demo = demo().await;
    let lookup = PostalLookup::new(Arc::clone(&demo.backend), Duration::from_millis(300));

    let (typing, settled) = tokio::join!(lookup.resolve("200"), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        lookup.resolve("20000").await
    });

    assert!(matches!(typing, LookupOutcome::Superseded));
    let LookupOutcome::Resolved(locality) = settled else {
        panic!("latest input should resolve");
    };
    assert_eq!(locality.area, "Kandy");
    assert_eq!(demo.backend.calls(Operation::LookupLocality), 1);
}
