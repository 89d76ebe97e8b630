use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentStatus::RequiresAction => "requires_action",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// The gateway's handle for an authorization-in-progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String, // Provider's ID (e.g., pi_123)
    /// Amount in the currency's minor unit (cents).
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub client_secret: Option<String>,
}

/// Card fields the gateway needs for the detailed second-phase confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
}

/// Payment-method descriptor as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Option<String>,
    pub card: Option<CardDetails>,
}

impl PaymentMethod {
    /// Card details are mandatory for the second confirmation phase; missing
    /// fields are a hard validation error, never defaulted.
    pub fn complete_card(&self) -> Option<&CardDetails> {
        self.card.as_ref().filter(|c| !c.number.is_empty() && !c.cvc.is_empty())
    }
}

/// Outcome of a confirmation call against the gateway.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub success: bool,
    pub status: PaymentStatus,
    pub intent: Option<PaymentIntent>,
    pub requires_action: bool,
    pub client_secret: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Payment gateway transport failure: {0}")]
    Transport(String),

    #[error("Payment gateway returned a malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// First-phase confirmation using the payment-method reference alone.
    async fn confirm_payment(
        &self,
        intent_id: &str,
        method: &PaymentMethod,
        return_url: Option<&str>,
    ) -> Result<PaymentConfirmation, GatewayError>;

    /// Second-phase confirmation carrying full card details.
    async fn confirm_with_card(
        &self,
        intent_id: &str,
        card: &CardDetails,
        return_url: Option<&str>,
    ) -> Result<PaymentConfirmation, GatewayError>;

    /// Void/refund an intent whose order never materialized.
    async fn cancel_intent(&self, intent_id: &str) -> Result<(), GatewayError>;
}
