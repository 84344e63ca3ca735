//! Core types for Greenmarket.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod quantity;
pub mod stage;

pub use address::{Address, AddressField};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{OrderDraft, OrderItem};
pub use price::{CurrencyCode, Price};
pub use product::Product;
pub use quantity::{Quantity, QuantityError};
pub use stage::{BillingOption, CheckoutStage};
