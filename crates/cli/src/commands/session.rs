//! Backend selection and shared per-invocation state.

use std::sync::Arc;

use greenmarket_core::UserId;
use greenmarket_storefront::error::set_sentry_user;
use greenmarket_storefront::{
    Backend, CartStore, Catalog, CheckoutConfig, HttpBackend, InMemoryBackend, Result,
    StorefrontConfig,
};

/// Shopper used offline when `GREENMARKET_USER_ID` is not set.
const OFFLINE_USER: &str = "demo-shopper";

/// Everything a subcommand needs to talk to the store.
pub struct Session {
    pub backend: Arc<dyn Backend>,
    pub user: UserId,
    pub checkout: CheckoutConfig,
}

impl Session {
    /// Talk to the configured backend over HTTP.
    pub fn connect(config: &StorefrontConfig) -> Self {
        set_sentry_user(&config.user_id);
        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config));
        tracing::debug!(api_url = %config.api_url, "Using HTTP backend");
        Self {
            backend,
            user: config.user_id.clone(),
            checkout: config.checkout,
        }
    }

    /// Use the seeded in-memory store. Configuration is optional here; the
    /// shopper and checkout settings fall back to defaults.
    pub fn offline(config: Option<StorefrontConfig>) -> Self {
        let (user, checkout) = config.map_or_else(
            || (UserId::new(OFFLINE_USER), CheckoutConfig::default()),
            |config| (config.user_id, config.checkout),
        );
        tracing::info!(user = %user, "Using seeded in-memory store");
        let backend: Arc<dyn Backend> = Arc::new(InMemoryBackend::seeded_demo(&user));
        Self {
            backend,
            user,
            checkout,
        }
    }

    pub async fn catalog(&self) -> Result<Catalog> {
        Catalog::fetch(self.backend.as_ref()).await
    }

    /// The shopper's cart, loaded from the backend.
    pub async fn cart(&self) -> Result<CartStore<dyn Backend>> {
        let cart = CartStore::new(Arc::clone(&self.backend), self.user.clone());
        cart.load().await?;
        Ok(cart)
    }
}
