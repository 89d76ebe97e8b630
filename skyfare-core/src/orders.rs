use serde::{Deserialize, Serialize};

use crate::passenger::Traveler;

/// Order-creation request sent to the booking platform.
///
/// The platform enforces one offer per order, so this carries exactly the
/// selected offer id; the remaining requested ids travel only inside
/// `metadata` for audit.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub offer_id: String,
    pub passengers: Vec<Traveler>,
    pub payment_intent_id: String,
    /// Charged amount in major units, already reconciled from the offer.
    pub amount: f64,
    pub currency: String,
    pub metadata: serde_json::Value,
}

/// The platform's durable record of a purchased itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: String,
    pub booking_reference: String,
    pub status: Option<String>,
    pub total_amount: Option<String>,
    pub total_currency: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order rejected by booking platform: {message}")]
    Rejected {
        message: String,
        http_status: u16,
        /// Itemized sub-errors, when the platform provides them.
        errors: Option<serde_json::Value>,
    },

    #[error("Booking platform transport failure: {0}")]
    Transport(String),
}

impl OrderError {
    /// Best-effort classification of "offer gone" rejections, which the
    /// platform only signals through its error text.
    pub fn is_offer_not_found(&self) -> bool {
        match self {
            OrderError::Rejected { message, .. } => {
                message.to_lowercase().contains("not found")
            }
            OrderError::Transport(_) => false,
        }
    }
}
