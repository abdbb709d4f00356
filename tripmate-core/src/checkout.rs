//! Process-local checkout flow with explicit stage transitions.
//!
//! The flow ties the pricing passes, the payment mock, and booking
//! synthesis into one ordered sequence. A failed PIN aborts the attempt
//! but keeps the cart: the caller restarts at payment collection, not at
//! cart building, so applied discounts survive.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::booking::{self, BookingConfirmation, Item, PaymentSummary, TransportMode};
use crate::cart::{Cart, PaymentMethod};
use crate::error::CoreError;
use crate::offers;
use crate::payment::{self, IntentStatus, PaymentIntent, PaymentPayload, PinConfirmation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStage {
    CartBuilt,
    CouponApplied,
    OfferApplied,
    IntentCreated,
    PinFailed,
    PinConfirmed,
    ItemsBooked,
    Confirmed,
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutStage::CartBuilt => "CART_BUILT",
            CheckoutStage::CouponApplied => "COUPON_APPLIED",
            CheckoutStage::OfferApplied => "OFFER_APPLIED",
            CheckoutStage::IntentCreated => "INTENT_CREATED",
            CheckoutStage::PinFailed => "PIN_FAILED",
            CheckoutStage::PinConfirmed => "PIN_CONFIRMED",
            CheckoutStage::ItemsBooked => "ITEMS_BOOKED",
            CheckoutStage::Confirmed => "CONFIRMED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutFlow {
    cart: Cart,
    stage: CheckoutStage,
    intent: Option<PaymentIntent>,
    booked: Vec<Item>,
    confirmation: Option<BookingConfirmation>,
}

impl CheckoutFlow {
    /// Start a flow from a caller-supplied cart; totals are computed here.
    pub fn new(mut cart: Cart) -> Self {
        cart.recompute_payable();
        Self {
            cart,
            stage: CheckoutStage::CartBuilt,
            intent: None,
            booked: Vec::new(),
            confirmation: None,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    pub fn intent(&self) -> Option<&PaymentIntent> {
        self.intent.as_ref()
    }

    pub fn booked_items(&self) -> &[Item] {
        &self.booked
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.confirmation.as_ref()
    }

    fn guard(&self, action: &'static str, allowed: &[CheckoutStage]) -> Result<(), CoreError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                action,
                stage: self.stage,
            })
        }
    }

    /// Optional first pass: coupon entry. Allowed once, before offers.
    pub fn apply_coupon(&mut self, code: &str) -> Result<&Cart, CoreError> {
        self.guard("apply_coupon", &[CheckoutStage::CartBuilt])?;
        self.cart.coupon_code = Some(code.to_string());
        self.cart = offers::apply_coupon(self.cart.clone());
        self.stage = CheckoutStage::CouponApplied;
        Ok(&self.cart)
    }

    /// Optional second pass: method-specific offer.
    pub fn apply_payment_offer(&mut self, method: PaymentMethod) -> Result<&Cart, CoreError> {
        self.guard(
            "apply_payment_offer",
            &[CheckoutStage::CartBuilt, CheckoutStage::CouponApplied],
        )?;
        self.cart.payment_method = Some(method);
        self.cart = offers::apply_payment_offer(self.cart.clone())?;
        self.stage = CheckoutStage::OfferApplied;
        Ok(&self.cart)
    }

    /// Collect payment details and create an intent. Also the re-entry
    /// point after a failed PIN.
    pub fn create_intent(&mut self, payload: &PaymentPayload) -> Result<&PaymentIntent, CoreError> {
        self.guard(
            "collect_payment",
            &[
                CheckoutStage::CartBuilt,
                CheckoutStage::CouponApplied,
                CheckoutStage::OfferApplied,
                CheckoutStage::PinFailed,
            ],
        )?;
        let intent = payment::collect_payment(&mut self.cart, payload)?;
        self.stage = CheckoutStage::IntentCreated;
        Ok(self.intent.insert(intent))
    }

    /// Authorize the pending intent. Success unlocks booking; failure
    /// parks the flow until a new intent is created.
    pub fn confirm_pin(&mut self, pin: &str) -> Result<PinConfirmation, CoreError> {
        self.guard("confirm_pin", &[CheckoutStage::IntentCreated])?;
        let intent = self
            .intent
            .as_mut()
            .ok_or(CoreError::InvalidTransition {
                action: "confirm_pin",
                stage: CheckoutStage::IntentCreated,
            })?;
        let confirmation = intent.finalize(pin)?;
        self.stage = match confirmation.status {
            IntentStatus::Succeeded => CheckoutStage::PinConfirmed,
            _ => CheckoutStage::PinFailed,
        };
        Ok(confirmation)
    }

    pub fn book_transport(&mut self, mode: TransportMode, item: Item) -> Result<(), CoreError> {
        self.guard(
            "book",
            &[CheckoutStage::PinConfirmed, CheckoutStage::ItemsBooked],
        )?;
        self.booked.push(booking::book_transport(mode, item));
        self.stage = CheckoutStage::ItemsBooked;
        Ok(())
    }

    pub fn book_hotel(&mut self, item: Item) -> Result<(), CoreError> {
        self.guard(
            "book",
            &[CheckoutStage::PinConfirmed, CheckoutStage::ItemsBooked],
        )?;
        self.booked.push(booking::book_hotel(item));
        self.stage = CheckoutStage::ItemsBooked;
        Ok(())
    }

    /// Assemble the final confirmation from the succeeded intent and the
    /// booked items. Terminal on success.
    pub fn finalize(&mut self) -> Result<&BookingConfirmation, CoreError> {
        self.guard("generate_booking_confirmation", &[CheckoutStage::ItemsBooked])?;
        let intent = self.intent.as_ref().ok_or(CoreError::InvalidTransition {
            action: "generate_booking_confirmation",
            stage: self.stage,
        })?;
        let summary = PaymentSummary::from(intent);
        let items = Value::Array(self.booked.iter().cloned().map(Value::Object).collect());
        let confirmation = booking::generate_booking_confirmation(&self.cart, &summary, &items)?;
        self.stage = CheckoutStage::Confirmed;
        Ok(self.confirmation.insert(confirmation))
    }
}
