//! Backend collaborator: catalog, cart, order and locality endpoints.
//!
//! # Architecture
//!
//! - The backend is the source of truth for carts and orders; the storefront
//!   only keeps a session-local mirror (see [`crate::cart::CartStore`])
//! - Every call goes through the object-safe [`Backend`] trait so the checkout
//!   core never depends on a transport
//! - [`HttpBackend`] talks JSON over `reqwest` and caches catalog and locality
//!   responses via `moka` (5 minute TTL)
//! - [`InMemoryBackend`] serves an offline demo store and the test suites
//!
//! # Endpoints
//!
//! | Operation        | Request                                  |
//! |------------------|------------------------------------------|
//! | catalog list     | `GET  /api/food/list`                    |
//! | cart get         | `POST /api/cart/get {userId}`            |
//! | cart remove      | `POST /api/cart/remove {userId, itemId}` |
//! | order submit     | `POST /api/orders/add-order <OrderDraft>`|
//! | locality lookup  | `GET  <lookup>?where={"postalCode":..}`  |

mod cache;
mod http;
mod memory;

pub use http::HttpBackend;
pub use memory::{InMemoryBackend, Operation};

use std::collections::BTreeMap;

use async_trait::async_trait;
use greenmarket_core::{OrderDraft, Product, ProductId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Raw cart mapping as stored by the backend.
///
/// Quantities are not validated here; the backend may hold zero or negative
/// leftovers that [`crate::cart::CartStore::load`] filters out.
pub type CartData = BTreeMap<ProductId, i64>;

/// Area and district resolved from a postal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    pub area: String,
    pub district: String,
}

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The locality service has not been configured.
    #[error("Locality lookup is not configured")]
    LookupUnavailable,

    /// Backend could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// The storefront's view of the backend.
///
/// All methods are request/response only; transport, authentication and
/// persistence stay on the other side.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Full product catalog.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Authoritative cart for a shopper.
    async fn get_cart(&self, user: &UserId) -> Result<CartData, BackendError>;

    /// Drop a product from the shopper's cart.
    ///
    /// A `success: false` answer surfaces as [`BackendError::Rejected`].
    async fn remove_from_cart(&self, user: &UserId, product: &ProductId)
    -> Result<(), BackendError>;

    /// Submit a paid order. `idempotency_key` is stable across retries of the
    /// same checkout session.
    async fn submit_order(
        &self,
        order: &OrderDraft,
        idempotency_key: Uuid,
    ) -> Result<(), BackendError>;

    /// Resolve a postal code; `Ok(None)` when the code is unknown.
    async fn lookup_locality(&self, postal_code: &str)
    -> Result<Option<Locality>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");

        let err = BackendError::Rejected("Item not in cart".to_string());
        assert_eq!(err.to_string(), "Request rejected: Item not in cart");
    }

    #[test]
    fn test_backend_is_object_safe() {
        fn assert_dyn(_: &dyn Backend) {}
        assert_dyn(&InMemoryBackend::new());
    }
}
