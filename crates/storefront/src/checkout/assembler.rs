//! Freezing a priced order snapshot.

use greenmarket_core::{
    Address, OrderDraft, OrderItem, Product, Quantity, UserId, discounted_line_total,
};
use rust_decimal::Decimal;

/// Builds [`OrderDraft`]s: discounted line totals plus one flat delivery fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAssembler {
    delivery_fee: Decimal,
}

impl OrderAssembler {
    #[must_use]
    pub const fn new(delivery_fee: Decimal) -> Self {
        Self { delivery_fee }
    }

    #[must_use]
    pub const fn delivery_fee(&self) -> Decimal {
        self.delivery_fee
    }

    /// One order line priced at the catalog's unit price.
    #[must_use]
    pub fn line_item(product: &Product, quantity: Quantity) -> OrderItem {
        OrderItem {
            id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price: product.unit_price,
            image_ref: product.image_ref.clone(),
        }
    }

    /// `Σ discounted line totals + delivery fee`.
    #[must_use]
    pub fn amount(&self, items: &[OrderItem]) -> Decimal {
        let subtotal: Decimal = items
            .iter()
            .map(|item| discounted_line_total(item.unit_price, item.quantity))
            .sum();
        subtotal + self.delivery_fee
    }

    /// Freeze an unpaid single-product draft.
    #[must_use]
    pub fn assemble(
        &self,
        user: UserId,
        product: &Product,
        quantity: Quantity,
        address: Address,
        billing_address: Address,
    ) -> OrderDraft {
        let items = vec![Self::line_item(product, quantity)];
        let amount = self.amount(&items);
        OrderDraft::new(user, items, amount, address, billing_address)
    }
}
