//! Cart model and payable arithmetic.

use serde::{Deserialize, Serialize};

/// Payment methods the mock checkout understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Debit,
    Credit,
    Netbanking,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Netbanking => "netbanking",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Price components of a prospective purchase before payment.
///
/// `payable` is always re-derived from the other components via
/// [`Cart::recompute_payable`]; within one checkout flow `discount` only
/// grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub subtotal: f64,
    #[serde(default)]
    pub fees_taxes: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub coupon_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_offer_applied: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_message: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Cart {
    pub fn new(subtotal: f64) -> Self {
        Self {
            subtotal,
            fees_taxes: 0.0,
            discount: 0.0,
            payable: None,
            coupon_code: None,
            coupon_applied: false,
            coupon_message: None,
            payment_method: None,
            payment_offer_applied: None,
            offer_message: None,
            currency: default_currency(),
        }
    }

    /// Re-derive the payable amount, floored at zero.
    pub fn recompute_payable(&mut self) {
        self.payable = Some((self.subtotal + self.fees_taxes - self.discount).max(0.0));
    }
}
