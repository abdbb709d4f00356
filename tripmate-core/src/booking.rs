//! Booking reference synthesis and the final confirmation record.

use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cart::Cart;
use crate::error::CoreError;
use crate::payment::PaymentIntent;

/// Items are opaque, caller-supplied JSON objects; booking only adds a
/// reference key.
pub type Item = Map<String, Value>;

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REFERENCE_LEN: usize = 6;

/// `prefix` followed by 6 random uppercase alphanumerics.
///
/// Every call mints a fresh code; booking the same item twice is two
/// booking attempts with two references.
pub fn reference_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(prefix.len() + REFERENCE_LEN);
    code.push_str(prefix);
    for _ in 0..REFERENCE_LEN {
        code.push(REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char);
    }
    code
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Flight,
    Train,
    Bus,
}

impl TransportMode {
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            TransportMode::Flight => "EMTFL",
            TransportMode::Train => "EMTTR",
            TransportMode::Bus => "EMTBS",
        }
    }
}

/// Book a transport leg: the item comes back with a fresh `pnr`.
pub fn book_transport(mode: TransportMode, mut item: Item) -> Item {
    item.insert(
        "pnr".to_string(),
        Value::String(reference_code(mode.reference_prefix())),
    );
    item
}

pub fn book_flight(item: Item) -> Item {
    book_transport(TransportMode::Flight, item)
}

pub fn book_train(item: Item) -> Item {
    book_transport(TransportMode::Train, item)
}

pub fn book_bus(item: Item) -> Item {
    book_transport(TransportMode::Bus, item)
}

/// Book a hotel stay: hotels get a `booking_id` rather than a PNR.
pub fn book_hotel(mut item: Item) -> Item {
    item.insert(
        "booking_id".to_string(),
        Value::String(reference_code("EMTHL")),
    );
    item
}

/// Payment fields echoed back by the agent when it asks for a voucher.
/// Parsed leniently; only method and amount are mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
}

impl From<&PaymentIntent> for PaymentSummary {
    fn from(intent: &PaymentIntent) -> Self {
        Self {
            method: Some(intent.method.as_str().to_string()),
            amount: Some(intent.amount),
            currency: Some(intent.currency.clone()),
            mask: Some(intent.mask.clone()),
        }
    }
}

/// Final, immutable receipt for a completed mock purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub provider: String,
    pub booking_reference: String,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub amount_charged: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked_account: Option<String>,
    pub items: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_applied: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_applied: Option<String>,
    pub created_at: String,
}

/// Aggregate the cart, payment record, and booked items into a voucher.
///
/// `amount_charged` is copied verbatim from the payment record, never
/// recomputed here.
pub fn generate_booking_confirmation(
    cart: &Cart,
    payment: &PaymentSummary,
    items: &Value,
) -> Result<BookingConfirmation, CoreError> {
    let method = payment
        .method
        .clone()
        .ok_or(CoreError::MissingPaymentField("method"))?;
    let amount = payment
        .amount
        .ok_or(CoreError::MissingPaymentField("amount"))?;

    Ok(BookingConfirmation {
        provider: "EaseMyTrip".to_string(),
        booking_reference: reference_code("EMTBK"),
        status: "CONFIRMED".to_string(),
        payment_status: "PAID".to_string(),
        payment_method: method,
        amount_charged: amount,
        currency: payment
            .currency
            .clone()
            .unwrap_or_else(|| "INR".to_string()),
        masked_account: payment.mask.clone(),
        items: items.clone(),
        coupon_applied: if cart.coupon_applied {
            cart.coupon_code.clone()
        } else {
            None
        },
        offer_applied: cart.payment_offer_applied.clone(),
        created_at: Local::now().format("%Y-%m-%dT%H:%M:%S%z").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(kind: &str) -> Item {
        let mut item = Item::new();
        item.insert("type".to_string(), Value::String(kind.to_string()));
        item
    }

    fn assert_reference(code: &str, prefix: &str) {
        assert!(code.starts_with(prefix), "{code} lacks prefix {prefix}");
        let suffix = &code[prefix.len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn transport_bookings_get_prefixed_pnrs() {
        let flight = book_flight(item("flight"));
        assert_reference(flight["pnr"].as_str().unwrap(), "EMTFL");

        let train = book_train(item("train"));
        assert_reference(train["pnr"].as_str().unwrap(), "EMTTR");

        let bus = book_bus(item("bus"));
        assert_reference(bus["pnr"].as_str().unwrap(), "EMTBS");
    }

    #[test]
    fn hotel_bookings_get_a_booking_id() {
        let hotel = book_hotel(item("hotel"));
        assert_reference(hotel["booking_id"].as_str().unwrap(), "EMTHL");
        assert!(hotel.get("pnr").is_none());
    }

    #[test]
    fn rebooking_mints_a_new_reference() {
        let first = book_flight(item("flight"));
        let second = book_flight(item("flight"));
        // two attempts, two codes (collision odds are negligible at 36^6)
        assert_ne!(first["pnr"], second["pnr"]);
    }

    #[test]
    fn booking_preserves_the_item_fields() {
        let mut it = item("flight");
        it.insert("from".to_string(), json!("DEL"));
        it.insert("to".to_string(), json!("BOM"));
        let booked = book_flight(it);
        assert_eq!(booked["from"], "DEL");
        assert_eq!(booked["to"], "BOM");
    }

    #[test]
    fn confirmation_copies_amount_verbatim() {
        let mut cart = Cart::new(6000.0);
        cart.recompute_payable();
        let payment = PaymentSummary {
            method: Some("upi".to_string()),
            amount: Some(5550.0),
            currency: Some("INR".to_string()),
            mask: Some("f***@upi".to_string()),
        };
        let items = json!([{"type": "flight", "pnr": "EMTFLABC123"}]);

        let confirmation = generate_booking_confirmation(&cart, &payment, &items).unwrap();
        assert_eq!(confirmation.provider, "EaseMyTrip");
        assert_eq!(confirmation.status, "CONFIRMED");
        assert_eq!(confirmation.payment_status, "PAID");
        assert_eq!(confirmation.amount_charged, 5550.0);
        assert_eq!(confirmation.items, items);
        assert_reference(&confirmation.booking_reference, "EMTBK");
    }

    #[test]
    fn confirmation_defaults_currency() {
        let cart = Cart::new(1000.0);
        let payment = PaymentSummary {
            method: Some("debit".to_string()),
            amount: Some(1000.0),
            ..PaymentSummary::default()
        };
        let confirmation =
            generate_booking_confirmation(&cart, &payment, &json!([])).unwrap();
        assert_eq!(confirmation.currency, "INR");
        assert!(confirmation.masked_account.is_none());
    }

    #[test]
    fn confirmation_requires_method_and_amount() {
        let cart = Cart::new(1000.0);
        let missing_method = PaymentSummary {
            amount: Some(1000.0),
            ..PaymentSummary::default()
        };
        assert!(matches!(
            generate_booking_confirmation(&cart, &missing_method, &json!([])),
            Err(CoreError::MissingPaymentField("method"))
        ));

        let missing_amount = PaymentSummary {
            method: Some("upi".to_string()),
            ..PaymentSummary::default()
        };
        assert!(matches!(
            generate_booking_confirmation(&cart, &missing_amount, &json!([])),
            Err(CoreError::MissingPaymentField("amount"))
        ));
    }

    #[test]
    fn confirmation_records_applied_codes_only() {
        let mut cart = Cart::new(6000.0);
        cart.coupon_code = Some("EMTNEW200".to_string());
        cart.payment_offer_applied = Some("EMTCC250".to_string());
        cart.recompute_payable();

        let payment = PaymentSummary {
            method: Some("credit".to_string()),
            amount: Some(5550.0),
            ..PaymentSummary::default()
        };

        // coupon_code is present but was never applied
        let confirmation =
            generate_booking_confirmation(&cart, &payment, &json!([])).unwrap();
        assert!(confirmation.coupon_applied.is_none());
        assert_eq!(confirmation.offer_applied.as_deref(), Some("EMTCC250"));

        cart.coupon_applied = true;
        let confirmation =
            generate_booking_confirmation(&cart, &payment, &json!([])).unwrap();
        assert_eq!(confirmation.coupon_applied.as_deref(), Some("EMTNEW200"));
    }
}
