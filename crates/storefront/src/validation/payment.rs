//! Payment form state.

use std::fmt;

use super::ValidationErrors;
use super::rules::FieldRule;

/// The seven payment inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentField {
    Email,
    FirstName,
    LastName,
    CardNumber,
    ExpirationDate,
    Cvc,
    Zip,
}

impl PaymentField {
    pub const ALL: [Self; 7] = [
        Self::Email,
        Self::FirstName,
        Self::LastName,
        Self::CardNumber,
        Self::ExpirationDate,
        Self::Cvc,
        Self::Zip,
    ];

    /// Error key and form field name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::CardNumber => "cardNumber",
            Self::ExpirationDate => "expirationDate",
            Self::Cvc => "cvc",
            Self::Zip => "zip",
        }
    }

    #[must_use]
    pub const fn rule(self) -> FieldRule {
        match self {
            Self::Email => FieldRule::Email,
            Self::FirstName => FieldRule::FirstName,
            Self::LastName => FieldRule::LastName,
            Self::CardNumber => FieldRule::CardNumber,
            Self::ExpirationDate => FieldRule::ExpirationDate,
            Self::Cvc => FieldRule::Cvc,
            Self::Zip => FieldRule::Zip,
        }
    }
}

/// Current payment values, as displayed (card grouped, expiry with slash).
///
/// Implements `Debug` manually so card data never reaches the logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PaymentFields {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub card_number: String,
    pub expiration_date: String,
    pub cvc: String,
    pub zip: String,
}

impl PaymentFields {
    #[must_use]
    pub fn get(&self, field: PaymentField) -> &str {
        match field {
            PaymentField::Email => &self.email,
            PaymentField::FirstName => &self.first_name,
            PaymentField::LastName => &self.last_name,
            PaymentField::CardNumber => &self.card_number,
            PaymentField::ExpirationDate => &self.expiration_date,
            PaymentField::Cvc => &self.cvc,
            PaymentField::Zip => &self.zip,
        }
    }

    fn slot(&mut self, field: PaymentField) -> &mut String {
        match field {
            PaymentField::Email => &mut self.email,
            PaymentField::FirstName => &mut self.first_name,
            PaymentField::LastName => &mut self.last_name,
            PaymentField::CardNumber => &mut self.card_number,
            PaymentField::ExpirationDate => &mut self.expiration_date,
            PaymentField::Cvc => &mut self.cvc,
            PaymentField::Zip => &mut self.zip,
        }
    }

    /// Last four card digits, for receipts.
    #[must_use]
    pub fn card_last_four(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        digits.iter().skip(digits.len().saturating_sub(4)).collect()
    }
}

impl fmt::Debug for PaymentFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_card = format!("**** {}", self.card_last_four());
        f.debug_struct("PaymentFields")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("card_number", &masked_card)
            .field("expiration_date", &"[REDACTED]")
            .field("cvc", &"[REDACTED]")
            .field("zip", &self.zip)
            .finish()
    }
}

/// Payment inputs plus their error keys.
#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    fields: PaymentFields,
    errors: ValidationErrors,
}

impl PaymentForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one keystroke: store the sanitized, formatted value and update
    /// the field's error key. Returns the field's message when invalid.
    pub fn edit(&mut self, field: PaymentField, raw: &str) -> Option<&'static str> {
        let outcome = field.rule().apply(raw);
        *self.fields.slot(field) = outcome.value;
        self.errors.record(field.key(), outcome.error);
        outcome.error
    }

    #[must_use]
    pub const fn fields(&self) -> &PaymentFields {
        &self.fields
    }

    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Every field non-empty and no error keys.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
            && PaymentField::ALL
                .iter()
                .all(|field| !self.fields.get(*field).is_empty())
    }

    /// Re-check every field, flagging untouched ones too. Returns whether
    /// the form is complete.
    pub fn validate_all(&mut self) -> bool {
        for field in PaymentField::ALL {
            let error = field.rule().check(self.fields.get(field)).err();
            self.errors.record(field.key(), error);
        }
        self.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> PaymentForm {
        let mut form = PaymentForm::new();
        form.edit(PaymentField::Email, "shopper@example.lk");
        form.edit(PaymentField::FirstName, "Nimal");
        form.edit(PaymentField::LastName, "Perera");
        form.edit(PaymentField::CardNumber, "4111111111111111");
        form.edit(PaymentField::ExpirationDate, "0128");
        form.edit(PaymentField::Cvc, "123");
        form.edit(PaymentField::Zip, "10115");
        form
    }

    #[test]
    fn test_filled_form_is_complete() {
        let form = filled();
        assert!(form.is_complete());
        assert_eq!(form.fields().card_number, "4111 1111 1111 1111");
        assert_eq!(form.fields().expiration_date, "01/28");
    }

    #[test]
    fn test_untouched_form_is_incomplete_without_errors() {
        let mut form = PaymentForm::new();
        assert!(form.errors().is_empty());
        assert!(!form.is_complete());

        assert!(!form.validate_all());
        assert_eq!(form.errors().len(), PaymentField::ALL.len());
    }

    #[test]
    fn test_fixing_a_field_clears_its_error() {
        let mut form = filled();
        assert_eq!(
            form.edit(PaymentField::Cvc, "12"),
            Some("CVC must be exactly 3 digits.")
        );
        assert!(!form.is_complete());

        assert_eq!(form.edit(PaymentField::Cvc, "129"), None);
        assert!(form.is_complete());
    }

    #[test]
    fn test_debug_hides_card_data() {
        let form = filled();
        let debug = format!("{:?}", form.fields());
        assert!(debug.contains("**** 1111"));
        assert!(!debug.contains("4111 1111"));
        assert!(!debug.contains("123"));
    }
}
