//! Greenmarket storefront client library.
//!
//! Cart, catalog, checkout forms and the checkout stage machine, talking to
//! the backend through the [`backend::Backend`] trait.
//!
//! ```text
//! Catalog ──┐
//!           ├──> CartStore ──> CheckoutPipeline ──> Backend::submit_order
//! Backend ──┘        │              │
//!                 discount     FieldRule / OrderAssembler
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod lookup;
pub mod validation;
pub mod voice;

pub use backend::{Backend, BackendError, HttpBackend, InMemoryBackend};
pub use cart::{CartLine, CartSnapshot, CartStore};
pub use catalog::{BrowseQuery, Catalog, SortOrder};
pub use checkout::{CheckoutError, CheckoutPipeline, OrderAssembler};
pub use config::{CheckoutConfig, StorefrontConfig};
pub use error::{Result, StorefrontError};
pub use lookup::{LookupOutcome, PostalLookup};
pub use voice::{VoiceAction, VoiceCommand, apply_voice_command};
