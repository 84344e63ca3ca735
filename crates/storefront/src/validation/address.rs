//! Shipping and billing address form state.

use greenmarket_core::{Address, AddressField, BillingOption};

use super::ValidationErrors;
use super::rules::FieldRule;

/// Which of the two addresses an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressTarget {
    Shipping,
    Billing,
}

impl AddressTarget {
    /// Prefix of this address's error keys (`addressPhone`, `billingAddressCity`).
    #[must_use]
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::Shipping => "address",
            Self::Billing => "billingAddress",
        }
    }

    /// Error key for one field of this address.
    #[must_use]
    pub fn error_key(self, field: AddressField) -> String {
        let name = field.as_str();
        let mut chars = name.chars();
        let capitalized: String = chars
            .next()
            .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
            .unwrap_or_default();
        format!("{}{capitalized}", self.key_prefix())
    }
}

const fn rule_for(field: AddressField) -> FieldRule {
    match field {
        AddressField::Street => FieldRule::Street,
        AddressField::City => FieldRule::City,
        AddressField::Country => FieldRule::Country,
        AddressField::PostalCode => FieldRule::PostalCode,
        AddressField::Phone => FieldRule::Phone,
    }
}

/// Both addresses, the billing choice and their error keys.
///
/// While [`BillingOption::Same`] is selected the billing address mirrors the
/// shipping address after every edit and billing inputs are ignored.
#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    shipping: Address,
    billing: Address,
    billing_option: BillingOption,
    errors: ValidationErrors,
}

impl AddressForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one keystroke to an address field. Returns the field's message
    /// when the new value is invalid.
    pub fn edit(
        &mut self,
        target: AddressTarget,
        field: AddressField,
        raw: &str,
    ) -> Option<&'static str> {
        if target == AddressTarget::Billing && self.billing_option == BillingOption::Same {
            return None;
        }

        let outcome = rule_for(field).apply(raw);
        self.errors.record(target.error_key(field), outcome.error);

        match target {
            AddressTarget::Shipping => {
                self.shipping.set(field, outcome.value);
                if self.billing_option == BillingOption::Same {
                    self.billing = self.shipping.clone();
                }
            }
            AddressTarget::Billing => self.billing.set(field, outcome.value),
        }

        outcome.error
    }

    /// Switch between "same as shipping" and a separate billing address.
    pub fn set_billing_option(&mut self, option: BillingOption) {
        self.billing_option = option;
        if option == BillingOption::Same {
            self.billing = self.shipping.clone();
            self.errors.clear_prefix(AddressTarget::Billing.key_prefix());
        }
    }

    #[must_use]
    pub const fn billing_option(&self) -> BillingOption {
        self.billing_option
    }

    #[must_use]
    pub const fn shipping(&self) -> &Address {
        &self.shipping
    }

    #[must_use]
    pub const fn billing(&self) -> &Address {
        &self.billing
    }

    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn active_targets(&self) -> &'static [AddressTarget] {
        match self.billing_option {
            BillingOption::Same => &[AddressTarget::Shipping],
            BillingOption::Different => &[AddressTarget::Shipping, AddressTarget::Billing],
        }
    }

    fn address(&self, target: AddressTarget) -> &Address {
        match target {
            AddressTarget::Shipping => &self.shipping,
            AddressTarget::Billing => &self.billing,
        }
    }

    /// No error keys for the active addresses and every field acceptable.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.active_targets().iter().all(|target| {
            !self.errors.any_with_prefix(target.key_prefix())
                && AddressField::ALL
                    .iter()
                    .all(|field| rule_for(*field).check(self.address(*target).get(*field)).is_ok())
        })
    }

    /// Re-check every active field, flagging untouched ones too. Returns
    /// whether the form may advance.
    pub fn validate_all(&mut self) -> bool {
        for target in self.active_targets() {
            for field in AddressField::ALL {
                let error = rule_for(field).check(self.address(*target).get(field)).err();
                self.errors.record(target.error_key(field), error);
            }
        }
        self.can_advance()
    }

    /// Shipping and billing addresses with free-text fields trimmed, or
    /// `None` while the form cannot advance.
    #[must_use]
    pub fn finalize(&self) -> Option<(Address, Address)> {
        if !self.can_advance() {
            return None;
        }
        let shipping = trimmed(&self.shipping);
        let billing = match self.billing_option {
            BillingOption::Same => shipping.clone(),
            BillingOption::Different => trimmed(&self.billing),
        };
        Some((shipping, billing))
    }
}

fn trimmed(address: &Address) -> Address {
    Address {
        country: address.country.trim().to_string(),
        street: address.street.trim().to_string(),
        city: address.city.trim().to_string(),
        postal_code: address.postal_code.clone(),
        phone: address.phone.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fill(form: &mut AddressForm, target: AddressTarget) {
        form.edit(target, AddressField::Country, "Sri Lanka");
        form.edit(target, AddressField::Street, " 12 Galle Road ");
        form.edit(target, AddressField::City, "Colombo");
        form.edit(target, AddressField::PostalCode, "00300");
        form.edit(target, AddressField::Phone, "0771234567");
    }

    #[test]
    fn test_error_keys() {
        assert_eq!(
            AddressTarget::Shipping.error_key(AddressField::PostalCode),
            "addressPostalCode"
        );
        assert_eq!(
            AddressTarget::Billing.error_key(AddressField::Phone),
            "billingAddressPhone"
        );
    }

    #[test]
    fn test_same_billing_mirrors_shipping() {
        let mut form = AddressForm::new();
        fill(&mut form, AddressTarget::Shipping);

        assert_eq!(form.billing(), form.shipping());
        assert!(form.can_advance());

        let (shipping, billing) = form.finalize().unwrap();
        assert_eq!(shipping.street, "12 Galle Road");
        assert_eq!(shipping, billing);
    }

    #[test]
    fn test_billing_edits_ignored_while_same() {
        let mut form = AddressForm::new();
        fill(&mut form, AddressTarget::Shipping);
        form.edit(AddressTarget::Billing, AddressField::City, "Kandy");
        assert_eq!(form.billing().city, "Colombo");
    }

    #[test]
    fn test_different_billing_must_validate() {
        let mut form = AddressForm::new();
        fill(&mut form, AddressTarget::Shipping);
        form.set_billing_option(BillingOption::Different);
        form.edit(AddressTarget::Billing, AddressField::PostalCode, "200");

        assert_eq!(
            form.errors().get("billingAddressPostalCode"),
            Some("Postal code must be exactly 5 digits")
        );
        assert!(!form.can_advance());
        assert!(form.finalize().is_none());

        form.edit(AddressTarget::Billing, AddressField::PostalCode, "20000");
        form.edit(AddressTarget::Billing, AddressField::City, "Kandy");
        let (shipping, billing) = form.finalize().unwrap();
        assert_eq!(shipping.city, "Colombo");
        assert_eq!(billing.city, "Kandy");
        assert_eq!(billing.postal_code, "20000");
    }

    #[test]
    fn test_switching_back_to_same_drops_billing_errors() {
        let mut form = AddressForm::new();
        fill(&mut form, AddressTarget::Shipping);
        form.set_billing_option(BillingOption::Different);
        form.edit(AddressTarget::Billing, AddressField::Phone, "");
        assert!(form.errors().contains("billingAddressPhone"));

        form.set_billing_option(BillingOption::Same);
        assert!(form.errors().is_empty());
        assert!(form.can_advance());
    }

    #[test]
    fn test_untouched_form_cannot_advance() {
        let mut form = AddressForm::new();
        assert!(!form.can_advance());
        assert!(!form.validate_all());
        assert_eq!(form.errors().len(), AddressField::ALL.len());
        assert_eq!(form.errors().get("addressCountry"), Some("Country is required"));
    }

    #[test]
    fn test_phone_is_sanitized() {
        let mut form = AddressForm::new();
        assert_eq!(
            form.edit(AddressTarget::Shipping, AddressField::Phone, "(077) 123-4567 ext 9"),
            None
        );
        assert_eq!(form.shipping().phone, "0771234567");
    }
}
