//! Checkout
//!
//! A checkout session owns the promotion toggle and the step the customer is
//! on. Pricing is derived on demand from the cart's line items and memoized on
//! its inputs.
//!
//! Payment is simulated: submitting moves the session to
//! [`CheckoutStep::Processing`] and completing it always succeeds. Card
//! details are never collected here.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cart::Cart,
    items::LineItem,
    pricing::{PricingEngine, PricingResult},
};

pub mod memo;

pub use memo::PricingMemo;

/// Where the customer is in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutStep {
    /// Reviewing the order
    #[default]
    Receipt,

    /// Entering payment details
    Payment,

    /// Waiting on the simulated payment
    Processing,

    /// Order confirmed
    Success,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckoutStep::Receipt => "receipt",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Processing => "processing",
            CheckoutStep::Success => "success",
        };

        f.write_str(label)
    }
}

/// Step changes a customer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutAction {
    /// Receipt to payment
    ProceedToPayment,

    /// Payment back to receipt
    BackToReceipt,

    /// Payment to processing
    SubmitPayment,

    /// Processing to success
    CompletePayment,
}

impl fmt::Display for CheckoutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckoutAction::ProceedToPayment => "proceed to payment",
            CheckoutAction::BackToReceipt => "back to receipt",
            CheckoutAction::SubmitPayment => "submit payment",
            CheckoutAction::CompletePayment => "complete payment",
        };

        f.write_str(label)
    }
}

/// Errors raised by checkout step changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The action isn't allowed from the current step.
    #[error("cannot {action} from the {from} step")]
    InvalidTransition {
        /// Step the session was on
        from: CheckoutStep,
        /// Requested action
        action: CheckoutAction,
    },

    /// There is nothing to pay for.
    #[error("cart is empty")]
    EmptyCart,
}

/// Checkout session
#[derive(Debug)]
pub struct CheckoutSession<'a> {
    step: CheckoutStep,
    promo_applied: bool,
    memo: PricingMemo<'a>,
}

impl<'a> CheckoutSession<'a> {
    /// Create a session on the receipt step with the promotion off.
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            step: CheckoutStep::Receipt,
            promo_applied: false,
            memo: PricingMemo::new(engine),
        }
    }

    /// Reset the session, as when the checkout is opened again.
    pub fn open(&mut self) {
        self.step = CheckoutStep::Receipt;
        self.promo_applied = false;
        self.memo.invalidate();

        debug!("checkout opened");
    }

    /// Current step
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Whether the customer switched the promotion on
    pub fn promo_applied(&self) -> bool {
        self.promo_applied
    }

    /// Flip the promotion toggle, returning the new state.
    pub fn toggle_promo(&mut self) -> bool {
        self.set_promo(!self.promo_applied);

        self.promo_applied
    }

    /// Set the promotion toggle.
    pub fn set_promo(&mut self, applied: bool) {
        self.promo_applied = applied;

        debug!(promo_applied = applied, "promotion toggled");
    }

    /// Whether the cart holds enough units for the promotion.
    pub fn is_promo_eligible(&self, items: &[LineItem<'_>]) -> bool {
        self.memo.engine().is_promo_eligible(items)
    }

    /// Price the cart for display.
    pub fn pricing(&mut self, items: &[LineItem<'a>]) -> &PricingResult<'a> {
        let eligible = self.is_promo_eligible(items);

        self.memo.get(items, eligible, self.promo_applied)
    }

    /// Move from the receipt to payment details.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart, or
    /// `CheckoutError::InvalidTransition` when not on the receipt step.
    pub fn proceed_to_payment(&mut self, cart: &Cart) -> Result<CheckoutStep, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.transition(CheckoutAction::ProceedToPayment)
    }

    /// Return from payment details to the receipt.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` when not on the payment step.
    pub fn back_to_receipt(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.transition(CheckoutAction::BackToReceipt)
    }

    /// Submit the (simulated) payment.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` when not on the payment step.
    pub fn submit_payment(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.transition(CheckoutAction::SubmitPayment)
    }

    /// Finish the simulated payment. It always succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` when no payment is processing.
    pub fn complete_payment(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.transition(CheckoutAction::CompletePayment)
    }

    /// Close the checkout. A confirmed order empties the cart.
    ///
    /// Returns whether the cart was cleared.
    pub fn close(&mut self, cart: &mut Cart) -> bool {
        if self.step != CheckoutStep::Success {
            return false;
        }

        cart.clear();

        info!("order confirmed; cart cleared");

        true
    }

    fn transition(&mut self, action: CheckoutAction) -> Result<CheckoutStep, CheckoutError> {
        let next = match (self.step, action) {
            (CheckoutStep::Receipt, CheckoutAction::ProceedToPayment) => CheckoutStep::Payment,
            (CheckoutStep::Payment, CheckoutAction::BackToReceipt) => CheckoutStep::Receipt,
            (CheckoutStep::Payment, CheckoutAction::SubmitPayment) => CheckoutStep::Processing,
            (CheckoutStep::Processing, CheckoutAction::CompletePayment) => CheckoutStep::Success,
            (from, action) => return Err(CheckoutError::InvalidTransition { from, action }),
        };

        debug!(from = %self.step, to = %next, "checkout step changed");

        self.step = next;

        Ok(next)
    }
}

impl Default for CheckoutSession<'_> {
    fn default() -> Self {
        Self::new(PricingEngine::default())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::products::Product;

    use super::*;

    fn cart_with(quantity: u32) -> TestResult<Cart> {
        let product = Product::new(6, "Nether Portal", "Minecraft", Money::from_minor(29_000, USD));
        let mut cart = Cart::new(USD);

        cart.add(&product)?;
        cart.update_quantity(product.id, quantity)?;

        Ok(cart)
    }

    #[test]
    fn new_session_starts_on_receipt_without_promo() {
        let session = CheckoutSession::default();

        assert_eq!(session.step(), CheckoutStep::Receipt);
        assert!(!session.promo_applied());
    }

    #[test]
    fn toggle_promo_flips_state() {
        let mut session = CheckoutSession::default();

        assert!(session.toggle_promo());
        assert!(!session.toggle_promo());
    }

    #[test]
    fn happy_path_reaches_success_and_clears_cart() -> TestResult {
        let mut cart = cart_with(2)?;
        let mut session = CheckoutSession::default();

        assert_eq!(session.proceed_to_payment(&cart)?, CheckoutStep::Payment);
        assert_eq!(session.submit_payment()?, CheckoutStep::Processing);
        assert_eq!(session.complete_payment()?, CheckoutStep::Success);

        assert!(session.close(&mut cart));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn close_before_success_keeps_cart() -> TestResult {
        let mut cart = cart_with(2)?;
        let mut session = CheckoutSession::default();

        session.proceed_to_payment(&cart)?;

        assert!(!session.close(&mut cart));
        assert_eq!(cart.total_units(), 2);

        Ok(())
    }

    #[test]
    fn back_to_receipt_from_payment() -> TestResult {
        let cart = cart_with(1)?;
        let mut session = CheckoutSession::default();

        session.proceed_to_payment(&cart)?;

        assert_eq!(session.back_to_receipt()?, CheckoutStep::Receipt);

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_proceed() {
        let mut session = CheckoutSession::default();

        assert_eq!(
            session.proceed_to_payment(&Cart::new(USD)),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let mut session = CheckoutSession::default();

        assert_eq!(
            session.complete_payment(),
            Err(CheckoutError::InvalidTransition {
                from: CheckoutStep::Receipt,
                action: CheckoutAction::CompletePayment,
            })
        );
        assert_eq!(session.step(), CheckoutStep::Receipt);
    }

    #[test]
    fn invalid_transition_message_names_step_and_action() {
        let err = CheckoutError::InvalidTransition {
            from: CheckoutStep::Success,
            action: CheckoutAction::SubmitPayment,
        };

        assert_eq!(err.to_string(), "cannot submit payment from the success step");
    }

    #[test]
    fn open_resets_step_and_promo() -> TestResult {
        let cart = cart_with(1)?;
        let mut session = CheckoutSession::default();

        session.set_promo(true);
        session.proceed_to_payment(&cart)?;
        session.open();

        assert_eq!(session.step(), CheckoutStep::Receipt);
        assert!(!session.promo_applied());

        Ok(())
    }

    #[test]
    fn pricing_applies_promo_only_when_toggled() {
        let items = vec![LineItem::new(
            6,
            "Nether Portal",
            Money::from_minor(29_000, USD),
            5,
        )];
        let mut session = CheckoutSession::default();

        assert!(session.is_promo_eligible(&items));
        assert_eq!(
            session.pricing(&items).final_total,
            Money::from_minor(145_000, USD)
        );

        session.toggle_promo();

        // 3% of 290.00 is 8.70
        assert_eq!(
            session.pricing(&items).final_total,
            Money::from_minor(144_130, USD)
        );
    }
}
