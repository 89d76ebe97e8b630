use serde::{Deserialize, Serialize};
use skyfare_core::orders::CreatedOrder;
use skyfare_core::payment::PaymentIntent;

/// Wire-visible failure classification. Serialized values are part of the
/// client contract and must not change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureStatus {
    PaymentFailed,
    OfferInvalid,
    OfferExpired,
    OfferVerificationFailed,
    NoValidOffers,
    PaymentIntentConfirmationFailed,
    PaymentIntentConfirmationError,
    OrderCreationFailed,
    OrderCreationError,
    ConfirmationError,
    Unknown,
}

impl FailureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStatus::PaymentFailed => "payment_failed",
            FailureStatus::OfferInvalid => "offer_invalid",
            FailureStatus::OfferExpired => "offer_expired",
            FailureStatus::OfferVerificationFailed => "offer_verification_failed",
            FailureStatus::NoValidOffers => "no_valid_offers",
            FailureStatus::PaymentIntentConfirmationFailed => "payment_intent_confirmation_failed",
            FailureStatus::PaymentIntentConfirmationError => "payment_intent_confirmation_error",
            FailureStatus::OrderCreationFailed => "order_creation_failed",
            FailureStatus::OrderCreationError => "order_creation_error",
            FailureStatus::ConfirmationError => "confirmation_error",
            FailureStatus::Unknown => "unknown",
        }
    }
}

/// Outcome of a best-effort payment void after a failed order creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    NotRequired,
    PaymentVoided,
    VoidFailed(String),
}

/// A terminal failure, carried to the HTTP layer as-is.
#[derive(Debug, Clone)]
pub struct ConfirmationFailure {
    pub status: FailureStatus,
    pub message: String,
    pub http_status: u16,
    /// Itemized sub-errors forwarded from the booking platform.
    pub errors: Option<serde_json::Value>,
    pub compensation: Compensation,
}

impl ConfirmationFailure {
    pub fn new(status: FailureStatus, message: impl Into<String>, http_status: u16) -> Self {
        Self {
            status,
            message: message.into(),
            http_status,
            errors: None,
            compensation: Compensation::NotRequired,
        }
    }

    pub fn with_errors(mut self, errors: Option<serde_json::Value>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_compensation(mut self, compensation: Compensation) -> Self {
        self.compensation = compensation;
        self
    }
}

/// The single terminal outcome of a confirmation request.
#[derive(Debug, Clone)]
pub enum ConfirmationOutcome {
    /// Payment confirmed, order created.
    Completed {
        order: CreatedOrder,
        payment_intent: Option<PaymentIntent>,
        booking_reference: String,
        order_id: String,
        payment_status: String,
    },
    /// 3-D Secure step-up: the caller completes authentication out-of-band
    /// and resubmits.
    RequiresAction {
        client_secret: String,
        payment_intent_id: String,
    },
    Failed(ConfirmationFailure),
}

impl ConfirmationOutcome {
    pub fn failed(status: FailureStatus, message: impl Into<String>, http_status: u16) -> Self {
        ConfirmationOutcome::Failed(ConfirmationFailure::new(status, message, http_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_status_strings() {
        assert_eq!(
            serde_json::to_value(FailureStatus::PaymentIntentConfirmationFailed).unwrap(),
            serde_json::json!("payment_intent_confirmation_failed")
        );
        assert_eq!(serde_json::to_value(FailureStatus::Unknown).unwrap(), serde_json::json!("unknown"));
        assert_eq!(FailureStatus::OfferExpired.as_str(), "offer_expired");
    }
}
