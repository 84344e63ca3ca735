//! One-shot checkout of a single cart product.
//!
//! Drives the same stage machine an interactive storefront would: every
//! argument is fed in as if typed into its form field, then each stage is
//! confirmed in turn.

use std::sync::Arc;

use clap::Args;
use greenmarket_core::{AddressField, BillingOption, Price, ProductId};
use greenmarket_storefront::checkout::{CheckoutPipeline, OrderAssembler};
use greenmarket_storefront::validation::{AddressTarget, PaymentField, ValidationErrors};
use greenmarket_storefront::{Backend, StorefrontError};

use super::session::Session;

/// Address and payment details for `gm-cli checkout`.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Product id to check out
    pub id: String,

    #[arg(long)]
    pub country: String,
    #[arg(long)]
    pub street: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub postal_code: String,
    #[arg(long)]
    pub phone: String,

    /// Separate billing address; any `--billing-*` flag switches billing
    /// away from "same as shipping"
    #[arg(long)]
    pub billing_country: Option<String>,
    #[arg(long)]
    pub billing_street: Option<String>,
    #[arg(long)]
    pub billing_city: Option<String>,
    #[arg(long)]
    pub billing_postal_code: Option<String>,
    #[arg(long)]
    pub billing_phone: Option<String>,

    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// Card number, spaces allowed
    #[arg(long)]
    pub card: String,
    /// Expiry as MMYY or MM/YY
    #[arg(long)]
    pub expiry: String,
    #[arg(long)]
    pub cvc: String,
    #[arg(long)]
    pub zip: String,
}

impl CheckoutArgs {
    fn shipping(&self) -> [(AddressField, &str); 5] {
        [
            (AddressField::Country, self.country.as_str()),
            (AddressField::Street, self.street.as_str()),
            (AddressField::City, self.city.as_str()),
            (AddressField::PostalCode, self.postal_code.as_str()),
            (AddressField::Phone, self.phone.as_str()),
        ]
    }

    fn billing(&self) -> Vec<(AddressField, &str)> {
        [
            (AddressField::Country, &self.billing_country),
            (AddressField::Street, &self.billing_street),
            (AddressField::City, &self.billing_city),
            (AddressField::PostalCode, &self.billing_postal_code),
            (AddressField::Phone, &self.billing_phone),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    fn payment(&self) -> [(PaymentField, &str); 7] {
        [
            (PaymentField::Email, self.email.as_str()),
            (PaymentField::FirstName, self.first_name.as_str()),
            (PaymentField::LastName, self.last_name.as_str()),
            (PaymentField::CardNumber, self.card.as_str()),
            (PaymentField::ExpirationDate, self.expiry.as_str()),
            (PaymentField::Cvc, self.cvc.as_str()),
            (PaymentField::Zip, self.zip.as_str()),
        ]
    }
}

#[allow(clippy::print_stdout)]
fn print_errors(stage: &str, errors: &ValidationErrors) {
    println!("{stage} details need attention:");
    for (key, message) in errors.iter() {
        println!("  {key}: {message}");
    }
}

/// Check out one product from the cart.
///
/// # Errors
///
/// Returns an error if the product is unknown or not in the cart, a field
/// is invalid, or the backend fails.
#[allow(clippy::print_stdout)]
pub async fn run(session: &Session, args: &CheckoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = session.catalog().await?;
    let cart = session.cart().await?;
    let pipeline: CheckoutPipeline<dyn Backend> = CheckoutPipeline::new(
        Arc::clone(&session.backend),
        session.user.clone(),
        OrderAssembler::new(session.checkout.delivery_fee),
    );

    let id = ProductId::new(args.id.as_str());
    pipeline.begin_checkout(&id, &catalog, &cart)?;

    for (field, value) in args.shipping() {
        pipeline.edit_address(AddressTarget::Shipping, field, value)?;
    }
    let billing = args.billing();
    if !billing.is_empty() {
        pipeline.set_billing_option(BillingOption::Different)?;
        for (field, value) in billing {
            pipeline.edit_address(AddressTarget::Billing, field, value)?;
        }
    }

    let draft = match pipeline.confirm_address() {
        Ok(draft) => draft,
        Err(StorefrontError::Validation(errors)) => {
            print_errors("Address", &errors);
            return Err(StorefrontError::Validation(errors).into());
        }
        Err(other) => return Err(other.into()),
    };
    println!("Order total: {} (delivery included)", Price::lkr(draft.amount()));

    for (field, value) in args.payment() {
        pipeline.edit_payment(field, value)?;
    }

    let order = match pipeline.submit().await {
        Ok(order) => order,
        Err(StorefrontError::Validation(errors)) => {
            print_errors("Payment", &errors);
            return Err(StorefrontError::Validation(errors).into());
        }
        Err(other) => return Err(other.into()),
    };

    cart.forget(&id);
    println!(
        "Payment successful! Paid {} for {} kg.",
        Price::lkr(order.amount()),
        order.items().iter().map(|item| item.quantity.get()).sum::<u32>()
    );
    Ok(())
}
