//! Product catalog: lookup and browsing.

use std::str::FromStr;

use greenmarket_core::{Product, ProductId};
use tracing::instrument;

use crate::backend::Backend;
use crate::error::Result;

/// Listing order for [`Catalog::browse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Search term, category and sort for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseQuery {
    /// Case-insensitive substring of the product name; empty matches all.
    pub search: String,
    /// Exact category, `None` for every category.
    pub category: Option<String>,
    pub sort: SortOrder,
}

impl BrowseQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Filter by category; `"all"` clears the filter.
    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = (category != "all").then(|| category.to_string());
        self
    }

    #[must_use]
    pub const fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    fn matches(&self, product: &Product) -> bool {
        let name_matches = product
            .name
            .to_lowercase()
            .contains(&self.search.to_lowercase());
        let category_matches = self
            .category
            .as_ref()
            .is_none_or(|category| product.category == *category);
        name_matches && category_matches
    }
}

/// An in-memory copy of the backend catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Fetch the full catalog from the backend.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the backend call fails.
    #[instrument(skip(backend))]
    pub async fn fetch<B: Backend + ?Sized>(backend: &B) -> Result<Self> {
        let products = backend.list_products().await?;
        tracing::debug!(count = products.len(), "Fetched catalog");
        Ok(Self::new(products))
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == *id)
    }

    /// Case-insensitive exact name match, ignoring surrounding whitespace.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        let wanted = name.trim().to_lowercase();
        self.products
            .iter()
            .find(|product| product.name.to_lowercase() == wanted)
    }

    /// Distinct non-empty categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .products
            .iter()
            .map(|product| product.category.as_str())
            .filter(|category| !category.is_empty())
            .collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    /// Filter and sort the listing. Sorting is stable, so equal prices keep
    /// catalog order.
    #[must_use]
    pub fn browse(&self, query: &BrowseQuery) -> Vec<&Product> {
        let mut listing: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| query.matches(product))
            .collect();
        match query.sort {
            SortOrder::Default => {}
            SortOrder::PriceAsc => listing.sort_by(|a, b| a.unit_price.cmp(&b.unit_price)),
            SortOrder::PriceDesc => listing.sort_by(|a, b| b.unit_price.cmp(&a.unit_price)),
        }
        listing
    }
}
