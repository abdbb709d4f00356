use thiserror::Error;

use crate::checkout::CheckoutStage;

/// Failures raised by the pricing/payment/booking engine.
///
/// These mark caller misuse (missing preconditions, replayed finalization,
/// out-of-order checkout steps). Validation outcomes the user can fix, like
/// a bad PIN, are reported as data, not errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cart has no payable amount; compute totals before applying offers or collecting payment")]
    MissingPayable,

    #[error("upi payment payload missing 'upi_id'")]
    MissingUpiId,

    #[error("payment record missing required field '{0}'")]
    MissingPaymentField(&'static str),

    #[error("payment intent {0} is already finalized")]
    IntentFinalized(String),

    #[error("cannot {action} while checkout is in stage {stage}")]
    InvalidTransition {
        action: &'static str,
        stage: CheckoutStage,
    },
}
