//! Mock payment rail: intent creation, account masking, PIN authorization.
//!
//! Nothing here charges anything; intents are plain records and the PIN
//! check is a format check. No retry counter and no lockout.

use serde::{Deserialize, Serialize};

use crate::booking::reference_code;
use crate::cart::{Cart, PaymentMethod};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    RequiresPin,
    Succeeded,
    Failed,
}

/// Method details supplied at payment time.
///
/// UPI carries `upi_id`; card methods carry `card_last4`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
}

/// Authorization-pending charge record.
///
/// Status moves exactly once, from REQUIRES_PIN to SUCCEEDED or FAILED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub payment_intent_id: String,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
    pub mask: String,
    pub status: IntentStatus,
}

/// Outcome of a PIN check, reported as data so the caller can re-prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinConfirmation {
    pub payment_intent_id: String,
    pub status: IntentStatus,
    pub message: String,
}

/// Mask a UPI id, keeping the first character of the local part and the
/// domain: "faiz@upi" becomes "f***@upi".
pub fn mask_upi(upi_id: &str) -> String {
    match upi_id.split_once('@') {
        Some((name, domain)) => match name.chars().next() {
            Some(first) => format!("{first}***@{domain}"),
            None => format!("***@{domain}"),
        },
        None => "****".to_string(),
    }
}

/// Mask a card number down to its last four digits.
pub fn mask_card(last4: &str) -> String {
    format!("**** **** **** {last4}")
}

/// Create a payment intent for the cart's current payable amount.
///
/// Requires a totalled cart. Records the chosen method on the cart and
/// snapshots the amount; the intent starts in REQUIRES_PIN.
pub fn collect_payment(cart: &mut Cart, payload: &PaymentPayload) -> Result<PaymentIntent, CoreError> {
    let payable = cart.payable.ok_or(CoreError::MissingPayable)?;
    cart.payment_method = Some(payload.method);

    let mask = match payload.method {
        PaymentMethod::Upi => {
            let upi_id = payload.upi_id.as_deref().ok_or(CoreError::MissingUpiId)?;
            mask_upi(upi_id)
        }
        _ => mask_card(payload.card_last4.as_deref().unwrap_or("0000")),
    };

    Ok(PaymentIntent {
        payment_intent_id: reference_code("PAY"),
        amount: (payable * 100.0).round() / 100.0,
        currency: cart.currency.clone(),
        method: payload.method,
        mask,
        status: IntentStatus::RequiresPin,
    })
}

fn pin_is_valid(pin: &str) -> bool {
    (4..=6).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit())
}

/// Single-shot PIN/OTP check: 4 to 6 decimal digits pass.
pub fn confirm_pin(payment_intent_id: &str, pin: &str) -> PinConfirmation {
    let ok = pin_is_valid(pin);
    PinConfirmation {
        payment_intent_id: payment_intent_id.to_string(),
        status: if ok {
            IntentStatus::Succeeded
        } else {
            IntentStatus::Failed
        },
        message: if ok {
            "Payment authorized".to_string()
        } else {
            "Invalid PIN/OTP".to_string()
        },
    }
}

impl PaymentIntent {
    /// Apply the PIN verdict to this intent, transitioning the status
    /// exactly once. A second call on a terminal intent is an error.
    pub fn finalize(&mut self, pin: &str) -> Result<PinConfirmation, CoreError> {
        if self.status != IntentStatus::RequiresPin {
            return Err(CoreError::IntentFinalized(self.payment_intent_id.clone()));
        }
        let confirmation = confirm_pin(&self.payment_intent_id, pin);
        self.status = confirmation.status;
        Ok(confirmation)
    }
}
