//! Mock pricing, payment, and booking engine for the TripMate assistant.
//!
//! Pure domain logic: no HTTP, no filesystem. The operations here are what
//! the external agent runtime invokes as tools; how they are exposed is the
//! adapter's business, not this crate's.

pub mod booking;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod offers;
pub mod payment;

pub use booking::{
    book_bus, book_flight, book_hotel, book_train, generate_booking_confirmation,
    BookingConfirmation, Item, PaymentSummary, TransportMode,
};
pub use cart::{Cart, PaymentMethod};
pub use checkout::{CheckoutFlow, CheckoutStage};
pub use error::CoreError;
pub use offers::{apply_coupon, apply_payment_offer, find_best_offer, Offer, EMT_OFFERS};
pub use payment::{
    collect_payment, confirm_pin, IntentStatus, PaymentIntent, PaymentPayload, PinConfirmation,
};
