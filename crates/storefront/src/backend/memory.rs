//! In-process backend used by `gm-cli --offline` and the test suites.
//!
//! Behaves like the HTTP backend (cart removal of an absent line is a
//! `success: false` rejection) and records every call so tests can assert on
//! how often the network would have been hit.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use greenmarket_core::{OrderDraft, Product, ProductId, UserId};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Backend, BackendError, CartData, Locality};

/// Backend operations, used to count calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListProducts,
    GetCart,
    RemoveFromCart,
    SubmitOrder,
    LookupLocality,
}

#[derive(Default)]
struct State {
    products: Vec<Product>,
    carts: HashMap<UserId, CartData>,
    localities: HashMap<String, Locality>,
    orders: Vec<(OrderDraft, Uuid)>,
    calls: HashMap<Operation, usize>,
    failing: HashSet<Operation>,
}

/// A backend living entirely in memory.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl InMemoryBackend {
    /// An empty store: no products, no carts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A small vegetable store with a pre-filled cart for `user`.
    #[must_use]
    pub fn seeded_demo(user: &UserId) -> Self {
        let mut carrot = Product::new(
            "veg-carrot",
            "Carrot",
            Decimal::from(320),
            "carrot.png",
            "Carrots",
        );
        carrot.description = Some("Nuwara Eliya carrots, per kg".to_string());

        let products = vec![
            carrot,
            Product::new("veg-leeks", "Leeks", Decimal::from(180), "leeks.png", "Leeks"),
            Product::new(
                "veg-potato",
                "Potato",
                Decimal::from(220),
                "potato.png",
                "Potatoes",
            ),
            Product::new(
                "veg-baby-carrot",
                "Baby Carrot",
                Decimal::from(410),
                "baby-carrot.png",
                "Carrots",
            ),
        ];

        let cart = CartData::from([
            (ProductId::new("veg-carrot"), 30),
            (ProductId::new("veg-leeks"), 4),
        ]);

        Self::new()
            .with_products(products)
            .with_cart(user, cart)
            .with_locality("00300", "Kollupitiya", "Colombo")
            .with_locality("20000", "Kandy", "Kandy")
            .with_locality("80000", "Galle", "Galle")
    }

    /// Replace the catalog.
    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products = products;
        self
    }

    /// Replace a shopper's cart.
    #[must_use]
    pub fn with_cart(self, user: &UserId, cart: CartData) -> Self {
        self.set_cart(user, cart);
        self
    }

    /// Register a postal code with the locality service.
    #[must_use]
    pub fn with_locality(self, postal_code: &str, area: &str, district: &str) -> Self {
        self.lock().localities.insert(
            postal_code.to_string(),
            Locality {
                area: area.to_string(),
                district: district.to_string(),
            },
        );
        self
    }

    /// Delay every call by `latency` before answering.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Overwrite a shopper's cart.
    pub fn set_cart(&self, user: &UserId, cart: CartData) {
        self.lock().carts.insert(user.clone(), cart);
    }

    /// Make `operation` fail with [`BackendError::Unavailable`] until
    /// [`InMemoryBackend::recover`] is called.
    pub fn fail(&self, operation: Operation) {
        self.lock().failing.insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.lock().failing.remove(&operation);
    }

    /// Number of times `operation` has been called, failures included.
    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// The backend's copy of a shopper's cart.
    #[must_use]
    pub fn cart(&self, user: &UserId) -> CartData {
        self.lock().carts.get(user).cloned().unwrap_or_default()
    }

    /// Every accepted order, in submission order.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderDraft> {
        self.lock()
            .orders
            .iter()
            .map(|(order, _)| order.clone())
            .collect()
    }

    /// Idempotency keys of accepted orders, in submission order.
    #[must_use]
    pub fn idempotency_keys(&self) -> Vec<Uuid> {
        self.lock().orders.iter().map(|(_, key)| *key).collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, wait out the configured latency, then check for an
    /// injected failure.
    async fn enter(&self, operation: Operation) -> Result<(), BackendError> {
        *self.lock().calls.entry(operation).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.lock().failing.contains(&operation) {
            return Err(BackendError::Unavailable(format!(
                "{operation:?} is failing"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.enter(Operation::ListProducts).await?;
        Ok(self.lock().products.clone())
    }

    async fn get_cart(&self, user: &UserId) -> Result<CartData, BackendError> {
        self.enter(Operation::GetCart).await?;
        Ok(self.cart(user))
    }

    async fn remove_from_cart(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<(), BackendError> {
        self.enter(Operation::RemoveFromCart).await?;
        let removed = self
            .lock()
            .carts
            .get_mut(user)
            .and_then(|cart| cart.remove(product));
        match removed {
            Some(_) => Ok(()),
            None => Err(BackendError::Rejected("Item not in cart".to_string())),
        }
    }

    async fn submit_order(
        &self,
        order: &OrderDraft,
        idempotency_key: Uuid,
    ) -> Result<(), BackendError> {
        self.enter(Operation::SubmitOrder).await?;
        let mut state = self.lock();
        // A retried submission with the same key is accepted but not stored twice.
        if !state.orders.iter().any(|(_, key)| *key == idempotency_key) {
            state.orders.push((order.clone(), idempotency_key));
        }
        Ok(())
    }

    async fn lookup_locality(
        &self,
        postal_code: &str,
    ) -> Result<Option<Locality>, BackendError> {
        self.enter(Operation::LookupLocality).await?;
        Ok(self.lock().localities.get(postal_code).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use greenmarket_core::{Address, OrderItem, Quantity};

    use super::*;

    fn order() -> OrderDraft {
        OrderDraft::new(
            UserId::new("u1"),
            vec![OrderItem {
                id: ProductId::new("veg-carrot"),
                name: "Carrot".to_string(),
                quantity: Quantity::new(2).unwrap(),
                unit_price: Decimal::from(320),
                image_ref: "carrot.png".to_string(),
            }],
            Decimal::from(890),
            Address::default(),
            Address::default(),
        )
    }

    #[tokio::test]
    async fn test_seeded_demo_serves_catalog_and_cart() {
        let user = UserId::new("demo");
        let backend = InMemoryBackend::seeded_demo(&user);

        let products = backend.list_products().await.unwrap();
        assert_eq!(products.len(), 4);

        let cart = backend.get_cart(&user).await.unwrap();
        assert_eq!(cart.get(&ProductId::new("veg-carrot")), Some(&30));
        assert_eq!(backend.calls(Operation::GetCart), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_line_is_rejected() {
        let user = UserId::new("u1");
        let backend = InMemoryBackend::new();
        let result = backend
            .remove_from_cart(&user, &ProductId::new("missing"))
            .await;
        assert!(matches!(result, Err(BackendError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_failure_injection_and_recovery() {
        let backend = InMemoryBackend::new();
        backend.fail(Operation::ListProducts);
        assert!(matches!(
            backend.list_products().await,
            Err(BackendError::Unavailable(_))
        ));

        backend.recover(Operation::ListProducts);
        assert!(backend.list_products().await.is_ok());
        assert_eq!(backend.calls(Operation::ListProducts), 2);
    }

    #[tokio::test]
    async fn test_same_idempotency_key_stored_once() {
        let backend = InMemoryBackend::new();
        let key = Uuid::new_v4();
        let paid = order().paid_copy();

        backend.submit_order(&paid, key).await.unwrap();
        backend.submit_order(&paid, key).await.unwrap();

        assert_eq!(backend.orders().len(), 1);
        assert_eq!(backend.idempotency_keys(), vec![key]);
        assert_eq!(backend.calls(Operation::SubmitOrder), 2);
    }

    #[tokio::test]
    async fn test_unknown_postal_code() {
        let backend = InMemoryBackend::seeded_demo(&UserId::new("demo"));
        assert_eq!(
            backend.lookup_locality("00300").await.unwrap().unwrap().district,
            "Colombo"
        );
        assert!(backend.lookup_locality("99999").await.unwrap().is_none());
    }
}
