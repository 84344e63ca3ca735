//! Voice command adapter.
//!
//! Speech capture happens elsewhere; this module only turns a recognized
//! transcript into a storefront command.

use greenmarket_core::ProductId;

use crate::backend::Backend;
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::error::{Result, StorefrontError};

const REMOVE_PREFIX: &str = "remove ";
const CART_SUFFIX: &str = " from the cart";

/// A parsed voice command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    /// "remove onion" / "remove onion from the cart"
    RemoveItem(String),
    /// Anything else is treated as a product search.
    SetSearchTerm(String),
}

/// What applying a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceAction {
    Removed(ProductId),
    Search(String),
}

impl VoiceCommand {
    /// Parse a transcript. Returns `None` for blank input.
    ///
    /// ```
    /// use greenmarket_storefront::voice::VoiceCommand;
    ///
    /// assert_eq!(
    ///     VoiceCommand::parse("Remove Onion from the cart"),
    ///     Some(VoiceCommand::RemoveItem("onion".to_string()))
    /// );
    /// assert_eq!(
    ///     VoiceCommand::parse("baby carrots"),
    ///     Some(VoiceCommand::SetSearchTerm("baby carrots".to_string()))
    /// );
    /// ```
    #[must_use]
    pub fn parse(transcript: &str) -> Option<Self> {
        let text = transcript.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }

        if let Some((_, rest)) = text.split_once(REMOVE_PREFIX) {
            let name = rest.split(CART_SUFFIX).next().unwrap_or(rest).trim();
            if !name.is_empty() {
                return Some(Self::RemoveItem(name.to_string()));
            }
        }

        Some(Self::SetSearchTerm(text))
    }
}

/// Carry out a voice command against the cart.
///
/// # Errors
///
/// Returns `StorefrontError::NotFound` when no cart product has the spoken
/// name, or `StorefrontError::Network` when the removal fails.
pub async fn apply_voice_command<B: Backend + ?Sized>(
    command: VoiceCommand,
    catalog: &Catalog,
    cart: &CartStore<B>,
) -> Result<VoiceAction> {
    match command {
        VoiceCommand::SetSearchTerm(term) => Ok(VoiceAction::Search(term)),
        VoiceCommand::RemoveItem(name) => {
            let product = catalog
                .find_by_name(&name)
                .filter(|product| cart.quantity(&product.id).is_some())
                .ok_or_else(|| StorefrontError::NotFound(ProductId::new(name)))?;
            let id = product.id.clone();
            cart.remove(&id).await?;
            Ok(VoiceAction::Removed(id))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use greenmarket_core::{Product, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::backend::{CartData, InMemoryBackend};

    #[test]
    fn test_parse_variants() {
        assert_eq!(
            VoiceCommand::parse("remove leeks"),
            Some(VoiceCommand::RemoveItem("leeks".to_string()))
        );
        assert_eq!(
            VoiceCommand::parse("please remove baby carrot from the cart"),
            Some(VoiceCommand::RemoveItem("baby carrot".to_string()))
        );
        assert_eq!(
            VoiceCommand::parse("  Potatoes "),
            Some(VoiceCommand::SetSearchTerm("potatoes".to_string()))
        );
        assert_eq!(VoiceCommand::parse("   "), None);
    }

    #[test]
    fn test_bare_remove_is_a_search() {
        assert_eq!(
            VoiceCommand::parse("remove"),
            Some(VoiceCommand::SetSearchTerm("remove".to_string()))
        );
    }

    async fn setup() -> (Catalog, CartStore<InMemoryBackend>) {
        let user = UserId::new("u1");
        let backend = Arc::new(InMemoryBackend::new().with_cart(
            &user,
            CartData::from([(ProductId::new("l1"), 4)]),
        ));
        let store = CartStore::new(backend, user);
        store.load().await.unwrap();
        let catalog = Catalog::new(vec![
            Product::new("l1", "Leeks", Decimal::from(180), "l1.png", "Leeks"),
            Product::new("p1", "Potato", Decimal::from(220), "p1.png", "Potatoes"),
        ]);
        (catalog, store)
    }

    #[tokio::test]
    async fn test_apply_remove() {
        let (catalog, store) = setup().await;
        let action = apply_voice_command(
            VoiceCommand::parse("remove leeks from the cart").unwrap(),
            &catalog,
            &store,
        )
        .await
        .unwrap();
        assert_eq!(action, VoiceAction::Removed(ProductId::new("l1")));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_apply_remove_unknown_or_absent() {
        let (catalog, store) = setup().await;

        let err = apply_voice_command(VoiceCommand::RemoveItem("onion".into()), &catalog, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::NotFound(_)));

        // Known product, but not in the cart.
        let err = apply_voice_command(VoiceCommand::RemoveItem("potato".into()), &catalog, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_apply_search() {
        let (catalog, store) = setup().await;
        let action = apply_voice_command(
            VoiceCommand::SetSearchTerm("carrot".into()),
            &catalog,
            &store,
        )
        .await
        .unwrap();
        assert_eq!(action, VoiceAction::Search("carrot".to_string()));
    }
}
