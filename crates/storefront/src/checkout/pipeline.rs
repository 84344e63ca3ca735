//! The checkout stage machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use greenmarket_core::{
    AddressField, BillingOption, CheckoutStage, OrderDraft, Product, ProductId, Quantity, UserId,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{CheckoutError, OrderAssembler};
use crate::backend::Backend;
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::error::{Result, StorefrontError, add_breadcrumb};
use crate::validation::{AddressForm, AddressTarget, PaymentField, PaymentForm, ValidationErrors};

struct Drafting {
    product: Product,
    quantity: Quantity,
    form: AddressForm,
}

struct Paying {
    draft: OrderDraft,
    form: PaymentForm,
    submitting: bool,
}

enum Stage {
    Cart,
    Drafting(Drafting),
    Paying(Paying),
    Submitted(OrderDraft),
}

impl Stage {
    const fn kind(&self) -> CheckoutStage {
        match self {
            Self::Cart => CheckoutStage::Cart,
            Self::Drafting(_) => CheckoutStage::Drafting,
            Self::Paying(_) => CheckoutStage::Paying,
            Self::Submitted(_) => CheckoutStage::Submitted,
        }
    }
}

struct Session {
    stage: Stage,
    /// Bumped whenever the session restarts; in-flight submissions compare
    /// it to decide whether their result still applies.
    epoch: u64,
    idempotency_key: Uuid,
}

impl Session {
    const fn wrong_stage(&self, expected: CheckoutStage) -> CheckoutError {
        CheckoutError::WrongStage {
            expected,
            actual: self.stage.kind(),
        }
    }

    fn drafting(&mut self) -> std::result::Result<&mut Drafting, CheckoutError> {
        let err = self.wrong_stage(CheckoutStage::Drafting);
        match &mut self.stage {
            Stage::Drafting(drafting) => Ok(drafting),
            _ => Err(err),
        }
    }

    fn paying(&mut self) -> std::result::Result<&mut Paying, CheckoutError> {
        let err = self.wrong_stage(CheckoutStage::Paying);
        match &mut self.stage {
            Stage::Paying(paying) => Ok(paying),
            _ => Err(err),
        }
    }

    fn restart(&mut self) {
        self.stage = Stage::Cart;
        self.epoch += 1;
        self.idempotency_key = Uuid::new_v4();
    }
}

/// Clears `submitting` if a submit future is dropped before the backend
/// answers, so the shopper can retry without re-entering payment fields.
struct InFlight<'a> {
    session: &'a Mutex<Session>,
    epoch: u64,
    armed: bool,
}

impl InFlight<'_> {
    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.epoch != self.epoch {
            return;
        }
        if let Ok(paying) = session.paying() {
            paying.submitting = false;
            warn!("Order submission cancelled before the backend answered");
        }
    }
}

/// One shopper's checkout session.
///
/// All methods take `&self`; the session is guarded by a mutex that is never
/// held across a backend call, so a submit can be observed (and refused a
/// second time) while it is in flight.
pub struct CheckoutPipeline<B: Backend + ?Sized> {
    backend: Arc<B>,
    user: UserId,
    assembler: OrderAssembler,
    session: Mutex<Session>,
}

impl<B: Backend + ?Sized> CheckoutPipeline<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, user: UserId, assembler: OrderAssembler) -> Self {
        Self {
            backend,
            user,
            assembler,
            session: Mutex::new(Session {
                stage: Stage::Cart,
                epoch: 0,
                idempotency_key: Uuid::new_v4(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn stage(&self) -> CheckoutStage {
        self.lock().stage.kind()
    }

    /// Whether the submit trigger is currently disabled.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(&self.lock().stage, Stage::Paying(paying) if paying.submitting)
    }

    /// The frozen draft, once PAYING is reached. In SUBMITTED this is the
    /// paid copy that was sent.
    #[must_use]
    pub fn draft(&self) -> Option<OrderDraft> {
        match &self.lock().stage {
            Stage::Paying(paying) => Some(paying.draft.clone()),
            Stage::Submitted(order) => Some(order.clone()),
            Stage::Cart | Stage::Drafting(_) => None,
        }
    }

    /// Error keys of the current stage's form.
    #[must_use]
    pub fn errors(&self) -> ValidationErrors {
        match &self.lock().stage {
            Stage::Drafting(drafting) => drafting.form.errors().clone(),
            Stage::Paying(paying) => paying.form.errors().clone(),
            Stage::Cart | Stage::Submitted(_) => ValidationErrors::new(),
        }
    }

    /// CART → DRAFTING for a single product and its cart quantity.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the catalog does not have the product
    /// - `Checkout(NotInCart)` if the cart holds no quantity for it
    /// - `Checkout(WrongStage)` outside CART
    ///
    /// The session stays in CART on every error.
    #[instrument(skip(self, catalog, cart), fields(user = %self.user))]
    pub fn begin_checkout<C: Backend + ?Sized>(
        &self,
        product_id: &ProductId,
        catalog: &Catalog,
        cart: &CartStore<C>,
    ) -> Result<()> {
        let mut session = self.lock();
        if !matches!(session.stage, Stage::Cart) {
            return Err(session.wrong_stage(CheckoutStage::Cart).into());
        }

        let Some(product) = catalog.get(product_id) else {
            warn!(product = %product_id, "Checkout requested for unknown product");
            return Err(StorefrontError::NotFound(product_id.clone()));
        };
        let quantity = cart
            .quantity(product_id)
            .ok_or_else(|| CheckoutError::NotInCart(product_id.clone()))?;

        session.stage = Stage::Drafting(Drafting {
            product: product.clone(),
            quantity,
            form: AddressForm::new(),
        });

        info!(product = %product_id, quantity = %quantity, "Entered DRAFTING");
        add_breadcrumb(
            "checkout",
            "Entered DRAFTING",
            Some(&[("product_id", product_id.as_str())]),
        );
        Ok(())
    }

    /// Apply one keystroke to an address field. Returns the field's message
    /// when the new value is invalid.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStage` outside DRAFTING.
    pub fn edit_address(
        &self,
        target: AddressTarget,
        field: AddressField,
        raw: &str,
    ) -> std::result::Result<Option<&'static str>, CheckoutError> {
        let mut session = self.lock();
        Ok(session.drafting()?.form.edit(target, field, raw))
    }

    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStage` outside DRAFTING.
    pub fn set_billing_option(
        &self,
        option: BillingOption,
    ) -> std::result::Result<(), CheckoutError> {
        let mut session = self.lock();
        session.drafting()?.form.set_billing_option(option);
        Ok(())
    }

    /// DRAFTING → PAYING: validate the addresses and freeze the draft.
    ///
    /// # Errors
    ///
    /// - `Validation` with every address error key when a field is invalid
    ///   or empty; the session stays in DRAFTING
    /// - `Checkout(WrongStage)` outside DRAFTING
    #[instrument(skip(self), fields(user = %self.user))]
    pub fn confirm_address(&self) -> Result<OrderDraft> {
        let mut session = self.lock();
        let drafting = session.drafting()?;

        if !drafting.form.validate_all() {
            return Err(StorefrontError::Validation(drafting.form.errors().clone()));
        }
        let Some((address, billing_address)) = drafting.form.finalize() else {
            return Err(StorefrontError::Validation(drafting.form.errors().clone()));
        };

        let draft = self.assembler.assemble(
            self.user.clone(),
            &drafting.product,
            drafting.quantity,
            address,
            billing_address,
        );

        let amount = draft.amount().to_string();
        info!(amount = %amount, "Entered PAYING");
        add_breadcrumb("checkout", "Entered PAYING", Some(&[("amount", amount.as_str())]));

        session.stage = Stage::Paying(Paying {
            draft: draft.clone(),
            form: PaymentForm::new(),
            submitting: false,
        });
        Ok(draft)
    }

    /// Apply one keystroke to a payment field. Returns the field's message
    /// when the new value is invalid.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStage` outside PAYING, or
    /// `SubmissionInFlight` while the order is being sent.
    pub fn edit_payment(
        &self,
        field: PaymentField,
        raw: &str,
    ) -> std::result::Result<Option<&'static str>, CheckoutError> {
        let mut session = self.lock();
        let paying = session.paying()?;
        if paying.submitting {
            return Err(CheckoutError::SubmissionInFlight);
        }
        Ok(paying.form.edit(field, raw))
    }

    /// PAYING → SUBMITTED: mark a copy of the draft paid and send it once.
    ///
    /// At most one submission is in flight; a second call meanwhile is
    /// refused without touching the backend. Every attempt in one session
    /// carries the same idempotency key.
    ///
    /// # Errors
    ///
    /// - `Validation` when a payment field is invalid or empty
    /// - `Checkout(SubmissionInFlight)` while another submit is running
    /// - `Network` when the backend fails; the session returns to PAYING with
    ///   fields and draft intact and the submit can be retried
    /// - `Checkout(Abandoned)` when the session was abandoned before the
    ///   backend answered; the answer is discarded
    /// - `Checkout(WrongStage)` outside PAYING
    ///
    /// Dropping the returned future before it completes (a timeout, a
    /// cancelled task) leaves the session in PAYING, ready for another
    /// submit with the same idempotency key.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn submit(&self) -> Result<OrderDraft> {
        let (paid, epoch, key) = {
            let mut session = self.lock();
            let epoch = session.epoch;
            let key = session.idempotency_key;
            let paying = session.paying()?;
            if paying.submitting {
                return Err(CheckoutError::SubmissionInFlight.into());
            }
            if !paying.form.validate_all() {
                return Err(StorefrontError::Validation(paying.form.errors().clone()));
            }
            paying.submitting = true;
            (paying.draft.paid_copy(), epoch, key)
        };

        let key_str = key.to_string();
        add_breadcrumb(
            "checkout",
            "Submitting order",
            Some(&[("idempotency_key", key_str.as_str())]),
        );
        let mut in_flight = InFlight {
            session: &self.session,
            epoch,
            armed: true,
        };
        let result = self.backend.submit_order(&paid, key).await;
        in_flight.disarm();

        let mut session = self.lock();
        if session.epoch != epoch {
            warn!(idempotency_key = %key, "Ignoring submission result for abandoned checkout");
            return Err(CheckoutError::Abandoned.into());
        }

        match result {
            Ok(()) => {
                info!(amount = %paid.amount(), idempotency_key = %key, "Entered SUBMITTED");
                add_breadcrumb("checkout", "Entered SUBMITTED", None);
                session.stage = Stage::Submitted(paid.clone());
                Ok(paid)
            }
            Err(error) => {
                warn!(error = %error, "Order submission failed, staying in PAYING");
                if let Ok(paying) = session.paying() {
                    paying.submitting = false;
                }
                Err(error.into())
            }
        }
    }

    /// Leave checkout from any stage and start over in CART.
    ///
    /// Pending submissions are not cancelled, but their result is ignored.
    pub fn abandon(&self) {
        let mut session = self.lock();
        let from = session.stage.kind();
        session.restart();
        info!(from = %from, "Checkout abandoned");
        let from = from.to_string();
        add_breadcrumb("checkout", "Abandoned", Some(&[("from", from.as_str())]));
    }
}
