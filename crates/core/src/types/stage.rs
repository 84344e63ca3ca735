//! Checkout stage and billing options.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The four stages of a checkout session.
///
/// `Cart -> Drafting -> Paying -> Submitted`; `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStage {
    #[default]
    Cart,
    Drafting,
    Paying,
    Submitted,
}

impl CheckoutStage {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted)
    }
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cart => write!(f, "CART"),
            Self::Drafting => write!(f, "DRAFTING"),
            Self::Paying => write!(f, "PAYING"),
            Self::Submitted => write!(f, "SUBMITTED"),
        }
    }
}

/// Where the billing address comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BillingOption {
    /// Billing mirrors the shipping address.
    #[default]
    Same,
    /// Billing address is entered separately and validated on its own.
    Different,
}

impl std::str::FromStr for BillingOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "same" => Ok(Self::Same),
            "different" => Ok(Self::Different),
            _ => Err(format!("invalid billing option: {s}")),
        }
    }
}
