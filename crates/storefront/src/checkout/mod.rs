//! Checkout: order assembly and the stage machine.
//!
//! # Stages
//!
//! ```text
//! CART --begin_checkout--> DRAFTING --confirm_address--> PAYING --submit--> SUBMITTED
//!   ^                                                       |
//!   +------------------------ abandon ----------------------+
//! ```
//!
//! A failed submission stays in PAYING with fields and draft intact.

mod assembler;
mod pipeline;

pub use assembler::OrderAssembler;
pub use pipeline::CheckoutPipeline;

use greenmarket_core::{CheckoutStage, ProductId};
use thiserror::Error;

/// Refused checkout transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The operation belongs to a different stage.
    #[error("Checkout is in {actual}, expected {expected}")]
    WrongStage {
        expected: CheckoutStage,
        actual: CheckoutStage,
    },

    /// The submit trigger is disabled while a submission is in flight.
    #[error("An order submission is already in flight")]
    SubmissionInFlight,

    /// Checkout was requested for a product without a cart quantity.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The session was abandoned while a submission was in flight; its
    /// result has been discarded.
    #[error("Checkout was abandoned before the order completed")]
    Abandoned,
}
