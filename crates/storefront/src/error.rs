//! Unified error handling with Sentry integration.
//!
//! Every user-facing operation returns [`Result<T>`]. Nothing here is fatal:
//! validation failures block one stage, network failures are retryable and
//! missing products are skipped.

use greenmarket_core::ProductId;
use thiserror::Error;

use crate::backend::BackendError;
use crate::checkout::CheckoutError;
use crate::validation::ValidationErrors;

/// Storefront error taxonomy.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// One or more fields are invalid; only the owning stage is blocked.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The backend could not complete the request. Local state is kept and
    /// the action can be retried.
    #[error("Network error: {0}")]
    Network(#[from] BackendError),

    /// A cart entry or checkout request references a product the catalog
    /// does not have.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// A checkout transition was refused.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl StorefrontError {
    /// Whether repeating the same action may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Log the error, capturing network failures to Sentry.
    pub fn report(&self) {
        if matches!(self, Self::Network(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront request failed"
            );
        } else {
            tracing::warn!(error = %self, "Storefront action refused");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context for the shopper this session belongs to.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Entered PAYING", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use greenmarket_core::CheckoutStage;

    use super::*;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::NotFound(ProductId::new("veg-onion"));
        assert_eq!(err.to_string(), "Product not found: veg-onion");

        let err = StorefrontError::from(CheckoutError::SubmissionInFlight);
        assert_eq!(
            err.to_string(),
            "Checkout error: An order submission is already in flight"
        );

        let mut errors = ValidationErrors::new();
        errors.record("zip", Some("ZIP code must be exactly 5 digits."));
        let err = StorefrontError::Validation(errors);
        assert_eq!(
            err.to_string(),
            "Validation failed: zip: ZIP code must be exactly 5 digits."
        );
    }

    #[test]
    fn test_only_network_errors_are_retryable() {
        assert!(StorefrontError::from(BackendError::Unavailable("down".into())).is_retryable());
        assert!(!StorefrontError::NotFound(ProductId::new("x")).is_retryable());
        assert!(
            !StorefrontError::from(CheckoutError::WrongStage {
                expected: CheckoutStage::Paying,
                actual: CheckoutStage::Cart,
            })
            .is_retryable()
        );
    }

    #[test]
    fn test_report_and_breadcrumbs_without_client() {
        // No Sentry client is bound in tests; these must be no-ops.
        add_breadcrumb("cart", "Removed item", Some(&[("product_id", "veg-carrot")]));
        set_sentry_user(&"u1");
        StorefrontError::from(BackendError::Unavailable("down".into())).report();
    }
}
