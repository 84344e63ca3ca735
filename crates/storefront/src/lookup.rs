//! Debounced postal code → locality lookup.
//!
//! Each call to [`PostalLookup::resolve`] takes a new generation number.
//! A result is only delivered if no newer input (or [`PostalLookup::cancel`])
//! arrived while waiting out the debounce period or the backend call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, instrument};

use crate::backend::{Backend, Locality};
use crate::error::StorefrontError;
use crate::validation::FieldRule;

/// Shortest postal code worth looking up.
const MIN_LOOKUP_DIGITS: usize = 3;

/// What a lookup produced.
#[derive(Debug)]
pub enum LookupOutcome {
    Resolved(Locality),
    /// The service does not know the code.
    NotFound,
    /// The input is too short (or empty); any shown locality should be cleared.
    Cleared,
    /// A newer input or a cancel made this result stale.
    Superseded,
    Failed(StorefrontError),
}

/// Postal lookup bound to one input field.
pub struct PostalLookup<B: Backend + ?Sized> {
    backend: Arc<B>,
    debounce: Duration,
    generation: AtomicU64,
}

impl<B: Backend + ?Sized> PostalLookup<B> {
    #[must_use]
    pub const fn new(backend: Arc<B>, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    /// Resolve the latest field value.
    ///
    /// The value is sanitized like the postal code input (digits, at most
    /// five). Three to five digits are looked up after the debounce period;
    /// anything shorter clears the result.
    #[instrument(skip(self))]
    pub async fn resolve(&self, input: &str) -> LookupOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let code = FieldRule::PostalCode.sanitize(input);
        if code.len() < MIN_LOOKUP_DIGITS {
            return LookupOutcome::Cleared;
        }

        tokio::time::sleep(self.debounce).await;
        if self.is_stale(generation) {
            debug!(code = %code, "Lookup superseded before request");
            return LookupOutcome::Superseded;
        }

        let result = self.backend.lookup_locality(&code).await;
        if self.is_stale(generation) {
            debug!(code = %code, "Discarding stale lookup response");
            return LookupOutcome::Superseded;
        }

        match result {
            Ok(Some(locality)) => LookupOutcome::Resolved(locality),
            Ok(None) => LookupOutcome::NotFound,
            Err(error) => LookupOutcome::Failed(error.into()),
        }
    }

    /// Abandon any pending lookup, e.g. when leaving the form.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use greenmarket_core::UserId;

    use super::*;
    use crate::backend::{InMemoryBackend, Operation};

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn lookup(backend: &Arc<InMemoryBackend>) -> PostalLookup<InMemoryBackend> {
        PostalLookup::new(Arc::clone(backend), DEBOUNCE)
    }

    fn demo() -> Arc<InMemoryBackend> {
        Arc::new(InMemoryBackend::seeded_demo(&UserId::new("u1")))
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_known_code() {
        let backend = demo();
        let outcome = lookup(&backend).resolve("00300").await;
        let LookupOutcome::Resolved(locality) = outcome else {
            panic!("expected a locality, got {outcome:?}");
        };
        assert_eq!(locality.area, "Kollupitiya");
        assert_eq!(locality.district, "Colombo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_code() {
        let backend = demo();
        assert!(matches!(
            lookup(&backend).resolve("99999").await,
            LookupOutcome::NotFound
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_clears_without_calling() {
        let backend = demo();
        let lookup = lookup(&backend);
        assert!(matches!(lookup.resolve("00").await, LookupOutcome::Cleared));
        assert!(matches!(lookup.resolve("ab").await, LookupOutcome::Cleared));
        assert_eq!(backend.calls(Operation::LookupLocality), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_only_looks_up_last_value() {
        let backend = demo();
        let lookup = lookup(&backend);

        let (first, second, last) = tokio::join!(
            lookup.resolve("003"),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                lookup.resolve("0030").await
            },
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                lookup.resolve("00300").await
            },
        );

        assert!(matches!(first, LookupOutcome::Superseded));
        assert!(matches!(second, LookupOutcome::Superseded));
        assert!(matches!(last, LookupOutcome::Resolved(_)));
        assert_eq!(backend.calls(Operation::LookupLocality), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_discarded() {
        let backend = Arc::new(
            InMemoryBackend::seeded_demo(&UserId::new("u1"))
                .with_latency(Duration::from_secs(2)),
        );
        let lookup = lookup(&backend);

        let (stale, ()) = tokio::join!(lookup.resolve("00300"), async {
            // Request is in flight by now.
            tokio::time::sleep(Duration::from_secs(1)).await;
            lookup.cancel();
        });

        assert!(matches!(stale, LookupOutcome::Superseded));
        assert_eq!(backend.calls(Operation::LookupLocality), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_failure() {
        let backend = demo();
        backend.fail(Operation::LookupLocality);
        let outcome = lookup(&backend).resolve("00300").await;
        let LookupOutcome::Failed(error) = outcome else {
            panic!("expected a failure, got {outcome:?}");
        };
        assert!(error.is_retryable());
    }
}
