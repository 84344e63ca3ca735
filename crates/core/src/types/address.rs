//! Shipping and billing addresses.

use serde::{Deserialize, Serialize};

/// A postal address as captured on the order form.
///
/// Values are stored already sanitized; the field validator in the
/// storefront crate is the only writer during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub country: String,
    pub street: String,
    pub city: String,
    /// Exactly five digits once valid.
    pub postal_code: String,
    /// Up to ten digits.
    pub phone: String,
}

impl Address {
    /// Read one field.
    #[must_use]
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::Country => &self.country,
            AddressField::Street => &self.street,
            AddressField::City => &self.city,
            AddressField::PostalCode => &self.postal_code,
            AddressField::Phone => &self.phone,
        }
    }

    /// Overwrite one field.
    pub fn set(&mut self, field: AddressField, value: String) {
        let slot = match field {
            AddressField::Country => &mut self.country,
            AddressField::Street => &mut self.street,
            AddressField::City => &mut self.city,
            AddressField::PostalCode => &mut self.postal_code,
            AddressField::Phone => &mut self.phone,
        };
        *slot = value;
    }
}

/// The five address inputs, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    Street,
    City,
    Country,
    PostalCode,
    Phone,
}

impl AddressField {
    /// Every field, in the order the form renders them.
    pub const ALL: [Self; 5] = [
        Self::Street,
        Self::City,
        Self::Country,
        Self::PostalCode,
        Self::Phone,
    ];

    /// camelCase wire name (`postalCode`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::City => "city",
            Self::Country => "country",
            Self::PostalCode => "postalCode",
            Self::Phone => "phone",
        }
    }

    /// Human label (`Postal code`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Street => "Street",
            Self::City => "City",
            Self::Country => "Country",
            Self::PostalCode => "Postal code",
            Self::Phone => "Phone",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip_every_field() {
        let mut address = Address::default();
        for field in AddressField::ALL {
            address.set(field, field.as_str().to_uppercase());
        }
        assert_eq!(address.get(AddressField::PostalCode), "POSTALCODE");
        assert_eq!(address.city, "CITY");
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let address = Address {
            postal_code: "10115".to_string(),
            ..Address::default()
        };
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["postalCode"], "10115");
    }
}
