//! Catalog product as served by the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// A product from the catalog. Read-only to the checkout core.
///
/// Field names follow the backend's wire format (`_id`, `price`, `image`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    /// Price per weight unit (kg).
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    #[serde(rename = "image", default)]
    pub image_ref: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Create a product without a description.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        image_ref: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image_ref: image_ref.into(),
            category: category.into(),
            description: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{
            "_id": "66a1",
            "name": "Carrot",
            "price": 320,
            "image": "carrot.png",
            "category": "Carrots",
            "description": "Nuwara Eliya carrots"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "66a1");
        assert_eq!(product.unit_price, Decimal::from(320));
        assert_eq!(product.image_ref, "carrot.png");
        assert_eq!(product.description.as_deref(), Some("Nuwara Eliya carrots"));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"_id": "66a2", "name": "Leeks", "price": 180.5}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.unit_price, Decimal::new(1805, 1));
        assert!(product.category.is_empty());
        assert!(product.description.is_none());
    }
}
