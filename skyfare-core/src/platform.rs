use async_trait::async_trait;

use crate::offers::OfferSnapshot;
use crate::orders::{CreatedOrder, OrderError, OrderRequest};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Booking platform transport failure: {0}")]
    Transport(String),

    #[error("Booking platform returned a malformed response: {0}")]
    Malformed(String),

    #[error("Booking platform rejected the request: HTTP {0}")]
    Status(u16),
}

/// Seam to the external flight-booking platform.
#[async_trait]
pub trait BookingPlatform: Send + Sync {
    /// Fetch the live snapshot of an offer. `Ok(None)` means the platform
    /// no longer knows the id (404).
    async fn get_offer(&self, offer_id: &str) -> Result<Option<OfferSnapshot>, PlatformError>;

    /// Create an order from exactly one offer.
    async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, OrderError>;
}
