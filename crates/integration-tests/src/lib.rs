//! Integration tests for the Greenmarket storefront.
//!
//! Every test drives the public storefront API against the in-memory
//! backend, so no network or running services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p greenmarket-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart to submitted order, including failures and
//!   duplicate submits
//! - `cart_and_voice` - Cart totals, removal rollback, voice commands and
//!   postal lookup
