//! Cache types for backend responses.

use std::sync::Arc;

use greenmarket_core::Product;

use super::Locality;

/// Cache key for catalog and locality responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Catalog,
    Locality(String),
}

/// Cached value types.
///
/// Unknown postal codes are cached too (`Locality(None)`), so repeated
/// keystrokes on a bad code don't hit the service again.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Catalog(Arc<Vec<Product>>),
    Locality(Option<Locality>),
}
