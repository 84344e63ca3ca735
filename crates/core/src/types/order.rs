//! Immutable order snapshot produced at the end of address drafting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, ProductId, Quantity, UserId};

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "qty")]
    pub quantity: Quantity,
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(rename = "image")]
    pub image_ref: String,
}

/// The order snapshot handed to the payment stage.
///
/// Fields are private: once built the draft only changes through
/// [`OrderDraft::paid_copy`], which returns a new value with `paid = true`.
/// The serialized shape is the body of the backend's order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    user_id: UserId,
    items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    address: Address,
    billing_address: Address,
    #[serde(rename = "payment")]
    paid: bool,
}

impl OrderDraft {
    /// Freeze a new, unpaid draft.
    #[must_use]
    pub const fn new(
        user_id: UserId,
        items: Vec<OrderItem>,
        amount: Decimal,
        address: Address,
        billing_address: Address,
    ) -> Self {
        Self {
            user_id,
            items,
            amount,
            address,
            billing_address,
            paid: false,
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Total to pay, delivery included.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    #[must_use]
    pub const fn billing_address(&self) -> &Address {
        &self.billing_address
    }

    #[must_use]
    pub const fn paid(&self) -> bool {
        self.paid
    }

    /// A copy of this draft marked as paid. The original is left untouched.
    #[must_use]
    pub fn paid_copy(&self) -> Self {
        Self {
            paid: true,
            ..self.clone()
        }
    }
}
