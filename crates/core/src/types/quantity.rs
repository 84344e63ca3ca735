//! Cart quantity, measured in the product's weight unit.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities start at one; zero is expressed by removing the entry.
    #[error("quantity must be at least 1")]
    Zero,
}

/// A strictly positive quantity.
///
/// Zero and negative quantities are unrepresentable; a cart line that would
/// drop to zero keeps its previous quantity instead (see [`Quantity::apply_delta`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] for `0`.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            Err(QuantityError::Zero)
        } else {
            Ok(Self(value))
        }
    }

    /// The underlying unit count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `self + delta` if the result stays positive and in range.
    ///
    /// ```
    /// use greenmarket_core::Quantity;
    ///
    /// let q = Quantity::new(3).unwrap();
    /// assert_eq!(q.apply_delta(2).map(Quantity::get), Some(5));
    /// assert_eq!(q.apply_delta(-3), None);
    /// ```
    #[must_use]
    pub fn apply_delta(self, delta: i64) -> Option<Self> {
        let next = i64::from(self.0).checked_add(delta)?;
        u32::try_from(next).ok().and_then(|v| Self::new(v).ok())
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
