use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One directional portion of an itinerary (outbound or return).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferSlice {
    pub id: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departing_at: Option<DateTime<Utc>>,
}

/// The booking platform's live snapshot of a priced itinerary.
///
/// Always fetched fresh per request; never cached, so stale pricing can't
/// leak into an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferSnapshot {
    #[serde(default)]
    pub id: String,
    pub total_amount: String,
    pub total_currency: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub slices: Vec<OfferSlice>,
}

impl OfferSnapshot {
    /// Check if the offer's price guarantee has lapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// A round trip is modeled upstream as one offer with multiple slices.
    pub fn is_multi_leg(&self) -> bool {
        self.slices.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot(expires_in: Duration, slices: usize) -> OfferSnapshot {
        OfferSnapshot {
            id: "off_1".to_string(),
            total_amount: "250.00".to_string(),
            total_currency: Some("USD".to_string()),
            expires_at: Utc::now() + expires_in,
            slices: (0..slices)
                .map(|_| OfferSlice { id: None, origin: None, destination: None, departing_at: None })
                .collect(),
        }
    }

    #[test]
    fn test_expiry_gate() {
        assert!(!snapshot(Duration::minutes(15), 1).is_expired());
        assert!(snapshot(Duration::minutes(-1), 1).is_expired());
    }

    #[test]
    fn test_multi_leg_detection() {
        assert!(!snapshot(Duration::minutes(15), 1).is_multi_leg());
        assert!(snapshot(Duration::minutes(15), 2).is_multi_leg());
    }
}
