use skyfare_core::offers::OfferSnapshot;
use skyfare_core::platform::BookingPlatform;

use crate::outcome::FailureStatus;

/// Why a batch was rejected. One bad offer fails the whole batch: the
/// platform needs a single coherent offer per order, so partial success is
/// useless to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRejection {
    /// 404 or a snapshot with no id.
    Invalid { offer_id: String },
    /// `expires_at` in the past.
    Expired { offer_id: String },
    /// Network or parse failure while checking.
    VerificationFailed { offer_id: String, detail: String },
}

impl BatchRejection {
    pub fn status(&self) -> FailureStatus {
        match self {
            BatchRejection::Invalid { .. } => FailureStatus::OfferInvalid,
            BatchRejection::Expired { .. } => FailureStatus::OfferExpired,
            BatchRejection::VerificationFailed { .. } => FailureStatus::OfferVerificationFailed,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            BatchRejection::Invalid { .. } | BatchRejection::Expired { .. } => 400,
            BatchRejection::VerificationFailed { .. } => 500,
        }
    }

    pub fn message(&self) -> String {
        match self {
            BatchRejection::Invalid { offer_id } => {
                format!("Offer {} is no longer available - please search again", offer_id)
            }
            BatchRejection::Expired { offer_id } => {
                format!("Offer {} has expired - please search again", offer_id)
            }
            BatchRejection::VerificationFailed { offer_id, .. } => {
                format!("Could not verify offer {} - please try again", offer_id)
            }
        }
    }
}

/// Tagged result of verifying a set of offer ids as one atomic unit.
#[derive(Debug)]
pub enum VerifiedBatch {
    AllValid(Vec<OfferSnapshot>),
    Rejected(BatchRejection),
}

/// Re-verify every requested offer against the platform's live store, one
/// sequential lookup per id. Snapshots are fetched fresh on every request so
/// stale pricing never reaches order creation.
pub async fn verify_offers(platform: &dyn BookingPlatform, offer_ids: &[String]) -> VerifiedBatch {
    let mut verified = Vec::with_capacity(offer_ids.len());

    for offer_id in offer_ids {
        let snapshot = match platform.get_offer(offer_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::warn!(%offer_id, "offer not found during verification");
                return VerifiedBatch::Rejected(BatchRejection::Invalid {
                    offer_id: offer_id.clone(),
                });
            }
            Err(err) => {
                tracing::error!(%offer_id, error = %err, "offer verification transport failure");
                return VerifiedBatch::Rejected(BatchRejection::VerificationFailed {
                    offer_id: offer_id.clone(),
                    detail: err.to_string(),
                });
            }
        };

        if snapshot.id.is_empty() {
            return VerifiedBatch::Rejected(BatchRejection::Invalid {
                offer_id: offer_id.clone(),
            });
        }
        if snapshot.is_expired() {
            tracing::warn!(%offer_id, expires_at = %snapshot.expires_at, "offer expired");
            return VerifiedBatch::Rejected(BatchRejection::Expired {
                offer_id: offer_id.clone(),
            });
        }

        verified.push(snapshot);
    }

    VerifiedBatch::AllValid(verified)
}
