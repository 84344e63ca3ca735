//! JSON-over-HTTP backend client.
//!
//! Uses `reqwest` for transport. Catalog and locality answers are cached
//! using `moka` (5-minute TTL); cart and order calls always go to the wire.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use greenmarket_core::{OrderDraft, Product, ProductId, UserId};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use super::cache::{CacheKey, CacheValue};
use super::{Backend, BackendError, CartData, Locality};
use crate::config::{LocalityConfig, StorefrontConfig, locality_api_key};

/// Longest response body excerpt kept in logs and errors.
const BODY_EXCERPT: usize = 500;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartRequest<'a> {
    user_id: &'a UserId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveRequest<'a> {
    user_id: &'a UserId,
    item_id: &'a ProductId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartResponse {
    success: bool,
    #[serde(default)]
    cart_data: HashMap<ProductId, i64>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    success: Option<bool>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct CatalogResponse {
    success: bool,
    #[serde(default)]
    data: Vec<Product>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct LocalityResponse {
    #[serde(default)]
    results: Vec<LocalityRecord>,
}

#[derive(Deserialize)]
struct LocalityRecord {
    #[serde(default)]
    place: String,
    #[serde(default)]
    admin2: String,
}

fn rejected(message: Option<String>, fallback: &str) -> BackendError {
    BackendError::Rejected(message.unwrap_or_else(|| fallback.to_string()))
}

// =============================================================================
// HttpBackend
// =============================================================================

/// Client for the storefront backend and the locality service.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    api_url: Url,
    locality: Option<LocalityConfig>,
    cache: Cache<CacheKey, CacheValue>,
}

impl HttpBackend {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(HttpBackendInner {
                client: reqwest::Client::new(),
                api_url: config.api_url.clone(),
                locality: config.locality.clone(),
                cache,
            }),
        }
    }

    /// `<api_url>/api/<path>`, tolerant of a trailing slash on the base.
    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let base = self.inner.api_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// Read a response, mapping non-success statuses to [`BackendError::Api`].
    async fn read_json<R: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<R, BackendError> {
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;
        let excerpt = response_text.chars().take(BODY_EXCERPT).collect::<String>();

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt,
                "Backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: excerpt,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, body = %excerpt, "Failed to parse backend response");
            BackendError::Parse(e)
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Catalog(products)) = self.inner.cache.get(&CacheKey::Catalog).await
        {
            debug!("Cache hit for catalog");
            return Ok(products.as_ref().clone());
        }

        let url = self.endpoint("food/list")?;
        let response = self.inner.client.get(url).send().await?;
        let body: CatalogResponse = Self::read_json(response).await?;
        if !body.success {
            return Err(rejected(body.message, "catalog unavailable"));
        }

        let products = Arc::new(body.data);
        self.inner
            .cache
            .insert(CacheKey::Catalog, CacheValue::Catalog(Arc::clone(&products)))
            .await;

        Ok(products.as_ref().clone())
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn get_cart(&self, user: &UserId) -> Result<CartData, BackendError> {
        let body: CartResponse = self
            .post_json("cart/get", &CartRequest { user_id: user })
            .await?;
        if !body.success {
            return Err(rejected(body.message, "failed to fetch cart"));
        }
        Ok(body.cart_data.into_iter().collect())
    }

    #[instrument(skip(self), fields(user = %user, product = %product))]
    async fn remove_from_cart(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<(), BackendError> {
        let body: StatusResponse = self
            .post_json(
                "cart/remove",
                &RemoveRequest {
                    user_id: user,
                    item_id: product,
                },
            )
            .await?;
        match body.success {
            Some(true) => Ok(()),
            _ => Err(rejected(body.message, "failed to remove item from cart")),
        }
    }

    #[instrument(skip(self, order), fields(amount = %order.amount(), %idempotency_key))]
    async fn submit_order(
        &self,
        order: &OrderDraft,
        idempotency_key: Uuid,
    ) -> Result<(), BackendError> {
        let url = self.endpoint("orders/add-order")?;
        let response = self
            .inner
            .client
            .post(url)
            .header("Idempotency-Key", idempotency_key.to_string())
            .json(order)
            .send()
            .await?;
        let body: StatusResponse = Self::read_json(response).await?;
        // Older deployments answer with an empty object; only an explicit
        // `success: false` is a rejection.
        if body.success == Some(false) {
            return Err(rejected(body.message, "order rejected"));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn lookup_locality(
        &self,
        postal_code: &str,
    ) -> Result<Option<Locality>, BackendError> {
        let config = self
            .inner
            .locality
            .as_ref()
            .ok_or(BackendError::LookupUnavailable)?;

        let cache_key = CacheKey::Locality(postal_code.to_string());
        if let Some(CacheValue::Locality(locality)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for locality");
            return Ok(locality);
        }

        let mut url = config.url.clone();
        url.query_pairs_mut()
            .append_pair(
                "where",
                &serde_json::json!({ "postalCode": postal_code }).to_string(),
            )
            .append_pair("limit", "1")
            .append_pair("keys", "place,admin2");

        let response = self
            .inner
            .client
            .get(url)
            .header("X-Parse-Application-Id", &config.app_id)
            .header("X-Parse-REST-API-Key", locality_api_key(config))
            .send()
            .await?;
        let body: LocalityResponse = Self::read_json(response).await?;

        let locality = body.results.into_iter().next().map(|record| Locality {
            area: record.place,
            district: record.admin2,
        });

        self.inner
            .cache
            .insert(cache_key, CacheValue::Locality(locality.clone()))
            .await;

        Ok(locality)
    }
}
