//! Greenmarket Core - Shared types and pricing rules.
//!
//! This crate provides the types used across all Greenmarket components:
//! - `storefront` - Cart, validation and checkout client library
//! - `cli` - Command-line surface over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Everything here is deterministic and cheap to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities, emails, addresses and orders
//! - [`discount`] - Quantity-tiered discount table and discounted line totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod discount;
pub mod types;

pub use discount::{DISCOUNT_TIERS, DiscountTier, discount_percent, discounted_line_total};
pub use types::*;
