//! The multi-screen order handoff: Cart -> Checkout -> Payment ->
//! Confirmation.
//!
//! Transitions are forward-only; every entry (browser back included)
//! re-validates its preconditions instead of trusting the target screen to
//! have the data. The Checkout -> Payment handoff travels as a transient
//! [`OrderDraft`], never persisted. Order placement is split into
//! begin/finish so a response that arrives after the shopper has navigated
//! away is discarded rather than corrupting the newer screen's state.

use crate::dto::checkout::{OrderDraft, PaymentForm, ShippingForm};
use crate::dto::orders::{PlaceOrderRequest, PlacedOrder};
use crate::error::AppResult;
use crate::models::OrderItem;
use crate::services::cart_service::CartService;
use crate::services::order_backend::OrderBackend;
use crate::services::session_service::SessionService;
use crate::validate::{self, FieldError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Cart,
    Checkout,
    Payment,
    Confirmation(String),
}

/// Result of the Cart screen's "proceed to checkout" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutGate {
    Proceed,
    /// Empty cart: stay on Cart and render the empty state.
    EmptyCart,
    /// The shopper must sign in first; resumption is the caller's business.
    LoginRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShippingOutcome {
    /// Draft built, now on the Payment screen.
    Continue,
    /// Inline field errors; input stays on screen.
    Invalid(Vec<FieldError>),
    Redirect(Screen),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Placed { order_id: String },
    /// Inline field errors; input stays on screen.
    Invalid(Vec<FieldError>),
    /// Remote failure: surfaced as a message, draft and form preserved, no
    /// automatic retry.
    Failed { message: String },
    Redirect(Screen),
    /// The response arrived after the shopper left the screen; discarded.
    Stale,
}

/// Handed out by [`CheckoutFlow::begin_payment`]; pass the request to the
/// backend, then hand the ticket back to [`CheckoutFlow::finish_payment`].
#[derive(Debug, Clone)]
pub struct PlacementTicket {
    epoch: u64,
    pub request: PlaceOrderRequest,
}

pub struct CheckoutFlow {
    screen: Screen,
    draft: Option<OrderDraft>,
    /// Bumped on every navigation; a placement response from an older epoch
    /// is stale.
    epoch: u64,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self {
            screen: Screen::Cart,
            draft: None,
            epoch: 0,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn draft(&self) -> Option<&OrderDraft> {
        self.draft.as_ref()
    }

    /// Cart screen: an empty cart stays put, an unauthenticated shopper is
    /// sent to sign in, otherwise the flow moves to Checkout.
    pub fn proceed_to_checkout(
        &mut self,
        cart: &CartService,
        session: &SessionService,
    ) -> CheckoutGate {
        if cart.is_empty() {
            return CheckoutGate::EmptyCart;
        }
        if !session.is_authenticated() {
            return CheckoutGate::LoginRequired;
        }
        self.goto(Screen::Checkout);
        CheckoutGate::Proceed
    }

    /// Navigate to a screen, re-validating its preconditions. Returns the
    /// screen actually landed on; a failed precondition resolves to Cart.
    pub fn enter(&mut self, target: Screen, cart: &CartService) -> Screen {
        let resolved = match &target {
            Screen::Cart => Screen::Cart,
            Screen::Checkout if cart.is_empty() => Screen::Cart,
            Screen::Checkout => Screen::Checkout,
            Screen::Payment if self.draft_is_complete() => Screen::Payment,
            Screen::Payment => Screen::Cart,
            Screen::Confirmation(order_id) => Screen::Confirmation(order_id.clone()),
        };
        if resolved != target {
            tracing::warn!(requested = ?target, resolved = ?resolved, "navigation preconditions failed, redirecting");
        }
        self.goto(resolved.clone());
        resolved
    }

    /// Checkout submit: validate the shipping form, snapshot the cart and
    /// coupon state into the draft, move to Payment.
    pub fn submit_shipping(&mut self, cart: &CartService, form: &ShippingForm) -> ShippingOutcome {
        if self.screen != Screen::Checkout || cart.is_empty() {
            self.goto(Screen::Cart);
            return ShippingOutcome::Redirect(Screen::Cart);
        }
        match validate::validate_shipping(form) {
            Ok(shipping) => {
                self.draft = Some(OrderDraft {
                    shipping,
                    cart: cart.lines().to_vec(),
                    discount: cart.discount(),
                    coupon: cart.coupon_code().unwrap_or_default().to_string(),
                });
                self.goto(Screen::Payment);
                ShippingOutcome::Continue
            }
            Err(errors) => ShippingOutcome::Invalid(errors),
        }
    }

    /// Payment submit, phase one: guard the handoff state, validate the card
    /// form and build the placement request.
    pub fn begin_payment(
        &mut self,
        cart: &CartService,
        form: &PaymentForm,
    ) -> Result<PlacementTicket, PaymentOutcome> {
        if self.screen != Screen::Payment || !self.draft_is_complete() {
            self.goto(Screen::Cart);
            return Err(PaymentOutcome::Redirect(Screen::Cart));
        }
        let payment = match validate::validate_payment(form) {
            Ok(payment) => payment,
            Err(errors) => return Err(PaymentOutcome::Invalid(errors)),
        };
        let Some(draft) = self.draft.as_ref() else {
            self.goto(Screen::Cart);
            return Err(PaymentOutcome::Redirect(Screen::Cart));
        };
        let request = PlaceOrderRequest {
            items: draft
                .cart
                .iter()
                .map(|line| OrderItem {
                    product: line.product_id.clone(),
                    quantity: line.quantity,
                    price: line.unit_price,
                })
                .collect(),
            shipping: draft.shipping.clone(),
            payment,
            coupon: draft.coupon.clone(),
            discount: draft.discount,
            total: draft.total(cart.tax_rate()),
        };
        Ok(PlacementTicket {
            epoch: self.epoch,
            request,
        })
    }

    /// Payment submit, phase two: apply the backend's answer. A response from
    /// a past epoch is discarded; success clears the cart and lands on
    /// Confirmation; failure keeps the draft for a manual retry.
    pub fn finish_payment(
        &mut self,
        cart: &mut CartService,
        ticket: &PlacementTicket,
        result: AppResult<PlacedOrder>,
    ) -> PaymentOutcome {
        if ticket.epoch != self.epoch {
            tracing::info!("discarding stale order placement response");
            return PaymentOutcome::Stale;
        }
        match result {
            Ok(placed) => {
                if let Err(err) = cart.clear() {
                    tracing::warn!(error = %err, "failed to clear cart after placement");
                }
                self.draft = None;
                self.goto(Screen::Confirmation(placed.order_id.clone()));
                PaymentOutcome::Placed {
                    order_id: placed.order_id,
                }
            }
            Err(err) => PaymentOutcome::Failed {
                message: err.to_string(),
            },
        }
    }

    /// The common single-call path; cancellation is dropping the future.
    pub async fn submit_payment(
        &mut self,
        cart: &mut CartService,
        backend: &dyn OrderBackend,
        form: &PaymentForm,
    ) -> PaymentOutcome {
        let ticket = match self.begin_payment(cart, form) {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };
        let result = backend.place_order(ticket.request.clone()).await;
        self.finish_payment(cart, &ticket, result)
    }

    fn draft_is_complete(&self) -> bool {
        self.draft.as_ref().is_some_and(|draft| !draft.cart.is_empty())
    }

    fn goto(&mut self, screen: Screen) {
        self.epoch += 1;
        self.screen = screen;
    }
}
