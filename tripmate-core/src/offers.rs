//! Static EMT offer catalog plus the two discount passes of the checkout:
//! coupon first, payment offer second, mirroring the order a user enters a
//! code and then picks how to pay.

use crate::cart::{Cart, PaymentMethod};
use crate::error::CoreError;

/// One row of the payment-offer catalog. Loaded once, immutable.
#[derive(Debug, Clone, Copy)]
pub struct Offer {
    pub code: &'static str,
    pub method: PaymentMethod,
    pub min_payable: f64,
    pub discount: f64,
    pub desc: &'static str,
}

/// Mock EMT offer table.
pub const EMT_OFFERS: &[Offer] = &[
    Offer {
        code: "EMTUPI100",
        method: PaymentMethod::Upi,
        min_payable: 2000.0,
        discount: 100.0,
        desc: "₹100 off on UPI (min ₹2000)",
    },
    Offer {
        code: "EMTCC250",
        method: PaymentMethod::Credit,
        min_payable: 5000.0,
        discount: 250.0,
        desc: "₹250 off on Credit Card (min ₹5000)",
    },
    Offer {
        code: "EMTDEB150",
        method: PaymentMethod::Debit,
        min_payable: 3000.0,
        discount: 150.0,
        desc: "₹150 off on Debit Card (min ₹3000)",
    },
];

/// Best offer for a method: highest discount among the rows whose threshold
/// the current payable clears. Ties keep the earlier catalog row.
pub fn find_best_offer(payable: f64, method: PaymentMethod) -> Option<&'static Offer> {
    let mut best: Option<&'static Offer> = None;
    for offer in EMT_OFFERS {
        if offer.method != method || payable < offer.min_payable {
            continue;
        }
        match best {
            Some(b) if b.discount >= offer.discount => {}
            _ => best = Some(offer),
        }
    }
    best
}

/// Apply the cart's coupon code. A single hard-coded rule: EMTNEW200 grants
/// a flat ₹200 off when the subtotal is at least ₹4000.
///
/// A coupon applies at most once per flow: after a successful application
/// the cart is marked and further calls leave the discount untouched.
pub fn apply_coupon(mut cart: Cart) -> Cart {
    if cart.coupon_applied {
        cart.coupon_message = Some("Coupon already applied".to_string());
        cart.recompute_payable();
        return cart;
    }

    let coupon = cart
        .coupon_code
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_uppercase();

    if coupon == "EMTNEW200" && cart.subtotal >= 4000.0 {
        cart.discount += 200.0;
        cart.coupon_code = Some(coupon);
        cart.coupon_applied = true;
        cart.coupon_message = Some("Applied ₹200 EMT new-user coupon".to_string());
    } else {
        cart.coupon_message = Some("No valid coupon applied".to_string());
    }

    cart.recompute_payable();
    cart
}

/// Apply the best payment-method offer to an already-totalled cart.
///
/// Requires `payable` to be present; an untotalled cart is caller misuse.
/// A cart with no payment method chosen yet passes through unchanged.
pub fn apply_payment_offer(mut cart: Cart) -> Result<Cart, CoreError> {
    let payable = cart.payable.ok_or(CoreError::MissingPayable)?;

    let method = match cart.payment_method {
        Some(method) => method,
        None => {
            cart.offer_message = Some("No payment method chosen yet".to_string());
            return Ok(cart);
        }
    };

    match find_best_offer(payable, method) {
        Some(offer) => {
            cart.discount += offer.discount;
            cart.payment_offer_applied = Some(offer.code.to_string());
            cart.offer_message = Some(offer.desc.to_string());
            cart.recompute_payable();
        }
        None => {
            cart.offer_message = Some("No applicable EMT payment offer".to_string());
        }
    }

    Ok(cart)
}
