//! Session cart: backend-authoritative quantities with local edits.
//!
//! The backend owns the cart; [`CartStore::load`] replaces the local copy
//! wholesale. Quantity changes are local only. Removal is applied locally
//! first and rolled back if the backend refuses it.
//!
//! Every change is published on a `tokio::sync::watch` channel, so views
//! subscribe with [`CartStore::subscribe`] instead of polling.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use greenmarket_core::{Product, ProductId, Quantity, UserId, discount_percent, discounted_line_total};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::backend::Backend;
use crate::catalog::Catalog;
use crate::error::{Result, StorefrontError, add_breadcrumb};

/// Product id → quantity, as seen by subscribers.
pub type CartSnapshot = BTreeMap<ProductId, Quantity>;

/// One priced cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: Quantity,
    pub discount_percent: u8,
    pub line_total: Decimal,
}

/// The shopper's cart for one session.
pub struct CartStore<B: Backend + ?Sized> {
    backend: Arc<B>,
    user: UserId,
    state: watch::Sender<CartSnapshot>,
    /// Number of loads started; only the latest load may replace the cart.
    loads: AtomicU64,
}

impl<B: Backend + ?Sized> CartStore<B> {
    /// An empty cart; call [`CartStore::load`] to fetch the backend's copy.
    #[must_use]
    pub fn new(backend: Arc<B>, user: UserId) -> Self {
        let (state, _) = watch::channel(CartSnapshot::new());
        Self {
            backend,
            user,
            state,
            loads: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn user(&self) -> &UserId {
        &self.user
    }

    /// Replace local state with the backend's cart.
    ///
    /// Entries with a quantity below one are dropped. When loads overlap,
    /// only the most recently started one is applied; an older response
    /// that arrives later is discarded.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the backend call fails; local
    /// state is left as it was.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn load(&self) -> Result<()> {
        let generation = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        let data = self.backend.get_cart(&self.user).await?;
        if self.loads.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding superseded cart load");
            return Ok(());
        }

        let snapshot: CartSnapshot = data
            .into_iter()
            .filter_map(|(id, raw)| {
                let quantity = u32::try_from(raw).ok().and_then(|q| Quantity::new(q).ok());
                if quantity.is_none() {
                    debug!(product = %id, quantity = raw, "Dropping non-positive cart entry");
                }
                quantity.map(|q| (id, q))
            })
            .collect();

        debug!(lines = snapshot.len(), "Loaded cart");
        self.state.send_replace(snapshot);
        Ok(())
    }

    /// Add `quantity` units, creating the line if needed.
    pub fn add(&self, id: &ProductId, quantity: Quantity) {
        self.state.send_if_modified(|cart| {
            let next = match cart.get(id) {
                Some(current) => current.apply_delta(i64::from(quantity.get())),
                None => Some(quantity),
            };
            match next {
                Some(next) => {
                    cart.insert(id.clone(), next);
                    true
                }
                None => false,
            }
        });
    }

    /// Adjust a line by `delta`. Applied only when the result stays at one
    /// or more; a change that would empty the line is ignored rather than
    /// treated as a removal.
    ///
    /// Returns whether the quantity changed.
    pub fn change_quantity(&self, id: &ProductId, delta: i64) -> bool {
        self.state.send_if_modified(|cart| {
            let Some(next) = cart.get(id).and_then(|current| current.apply_delta(delta)) else {
                return false;
            };
            cart.insert(id.clone(), next);
            delta != 0
        })
    }

    /// Remove a line locally and on the backend.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the backend call fails or
    /// rejects the removal. The line is restored unless it was re-added in
    /// the meantime.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn remove(&self, id: &ProductId) -> Result<()> {
        let mut previous = None;
        self.state.send_if_modified(|cart| {
            previous = cart.remove(id);
            previous.is_some()
        });

        match self.backend.remove_from_cart(&self.user, id).await {
            Ok(()) => {
                info!(product = %id, "Removed item from cart");
                add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));
                Ok(())
            }
            Err(error) => {
                warn!(product = %id, error = %error, "Cart removal failed, restoring line");
                if let Some(quantity) = previous {
                    self.state.send_if_modified(|cart| {
                        if cart.contains_key(id) {
                            return false;
                        }
                        cart.insert(id.clone(), quantity);
                        true
                    });
                }
                Err(error.into())
            }
        }
    }

    /// Drop a line locally without telling the backend, e.g. once its order
    /// has been placed.
    pub fn forget(&self, id: &ProductId) -> Option<Quantity> {
        let mut removed = None;
        self.state.send_if_modified(|cart| {
            removed = cart.remove(id);
            removed.is_some()
        });
        removed
    }

    #[must_use]
    pub fn quantity(&self, id: &ProductId) -> Option<Quantity> {
        self.state.borrow().get(id).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every future cart change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.state.subscribe()
    }

    /// Sum of all quantities (kg).
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.state
            .borrow()
            .values()
            .map(|quantity| u64::from(quantity.get()))
            .sum()
    }

    /// Priced lines for every entry the catalog knows. Unknown products are
    /// skipped with a warning.
    #[must_use]
    pub fn lines(&self, catalog: &Catalog) -> Vec<CartLine> {
        let cart = self.state.borrow();
        cart.iter()
            .filter_map(|(id, quantity)| {
                let Some(product) = catalog.get(id) else {
                    let error = StorefrontError::NotFound(id.clone());
                    warn!(product = %id, error = %error, "Skipping cart entry missing from catalog");
                    return None;
                };
                Some(CartLine {
                    product: product.clone(),
                    quantity: *quantity,
                    discount_percent: discount_percent(i64::from(quantity.get())),
                    line_total: discounted_line_total(product.unit_price, *quantity),
                })
            })
            .collect()
    }

    /// Sum of discounted line totals, delivery excluded.
    #[must_use]
    pub fn total_price(&self, catalog: &Catalog) -> Decimal {
        self.lines(catalog).iter().map(|line| line.line_total).sum()
    }
}
