//! Keystroke-level field validation for the checkout forms.
//!
//! Every edit runs the same three steps: sanitize the raw input, format it
//! for display, then validate the formatted value and set or clear the
//! field's error key. None of these steps fail; problems only ever show up
//! as entries in [`ValidationErrors`].
//!
//! - [`rules`] holds the per-field rules
//! - [`address`] drives shipping/billing address inputs
//! - [`payment`] drives the payment inputs

pub mod address;
pub mod payment;
pub mod rules;

use std::collections::BTreeMap;
use std::fmt;

pub use address::{AddressForm, AddressTarget};
pub use payment::{PaymentField, PaymentFields, PaymentForm};
pub use rules::FieldRule;

/// Field key → human-readable message.
///
/// An absent key means the field is valid or has not been touched yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for a field, if it is currently invalid.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set the key when `message` is `Some`, remove it otherwise.
    pub fn record(&mut self, key: impl Into<String>, message: Option<&str>) {
        let key = key.into();
        match message {
            Some(message) => {
                self.0.insert(key, message.to_string());
            }
            None => {
                self.0.remove(&key);
            }
        }
    }

    /// Drop every key starting with `prefix`.
    pub fn clear_prefix(&mut self, prefix: &str) {
        self.0.retain(|key, _| !key.starts_with(prefix));
    }

    /// Whether any key starts with `prefix`.
    #[must_use]
    pub fn any_with_prefix(&self, prefix: &str) -> bool {
        self.0.keys().any(|key| key.starts_with(prefix))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sets_and_clears() {
        let mut errors = ValidationErrors::new();
        errors.record("cvc", Some("CVC must be exactly 3 digits."));
        assert_eq!(errors.get("cvc"), Some("CVC must be exactly 3 digits."));

        errors.record("cvc", None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_prefix_helpers() {
        let mut errors = ValidationErrors::new();
        errors.record("addressPhone", Some("bad"));
        errors.record("billingAddressCity", Some("bad"));

        assert!(errors.any_with_prefix("address"));
        assert!(errors.any_with_prefix("billingAddress"));

        errors.clear_prefix("billingAddress");
        assert_eq!(errors.len(), 1);
        assert!(!errors.any_with_prefix("billingAddress"));
    }

    #[test]
    fn test_display_lists_fields_in_key_order() {
        let mut errors = ValidationErrors::new();
        errors.record("zip", Some("ZIP code must be exactly 5 digits."));
        errors.record("cvc", Some("CVC must be exactly 3 digits."));
        assert_eq!(
            errors.to_string(),
            "cvc: CVC must be exactly 3 digits.; zip: ZIP code must be exactly 5 digits."
        );
    }
}
