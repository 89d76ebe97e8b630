use serde::{Deserialize, Serialize};
use skyfare_core::passenger::PassengerInput;
use skyfare_core::payment::PaymentMethod;

/// Free-form hints the client attaches to a confirmation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub trip_type: Option<String>,
    /// Snake case on the wire; the payment gateway's own field name.
    #[serde(rename = "return_url")]
    pub return_url: Option<String>,
}

/// Client-submitted confirmation payload. Request-scoped; never persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Client-side display amount. Never charged; the offer's authoritative
    /// total wins.
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Legacy single-offer field.
    #[serde(default)]
    pub offer_id: Option<String>,
    /// Newer multi-offer field; merged with `offer_id` and de-duplicated.
    #[serde(default)]
    pub offer_ids: Option<Vec<String>>,
    #[serde(default)]
    pub passengers: Vec<PassengerInput>,
    #[serde(default)]
    pub metadata: Option<RequestMetadata>,
    #[serde(default)]
    pub is_confirming: Option<bool>,
    #[serde(default)]
    pub is_roundtrip: Option<bool>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Missing payment card details")]
    MissingCardDetails,
}

/// The fields a request must carry before any collaborator is contacted,
/// borrowed out of the raw payload by [`ConfirmationRequest::validate`].
#[derive(Debug)]
pub struct ValidatedRequest<'a> {
    pub payment_intent_id: &'a str,
    pub payment_method: &'a PaymentMethod,
    pub card: &'a skyfare_core::payment::CardDetails,
    pub offer_ids: Vec<String>,
    pub passengers: &'a [PassengerInput],
}

impl ConfirmationRequest {
    /// Merge the legacy `offerId` and the newer `offerIds` into one ordered,
    /// de-duplicated set, dropping empty ids.
    pub fn merged_offer_ids(&self) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        let candidates = self
            .offer_id
            .iter()
            .chain(self.offer_ids.iter().flatten());
        for id in candidates {
            if !id.is_empty() && !merged.iter().any(|m| m == id) {
                merged.push(id.clone());
            }
        }
        merged
    }

    /// Authoritative trip type: either signal wins.
    pub fn is_roundtrip(&self) -> bool {
        let hinted = self
            .metadata
            .as_ref()
            .and_then(|m| m.trip_type.as_deref())
            .map(|t| t == "roundtrip")
            .unwrap_or(false);
        hinted || self.is_roundtrip.unwrap_or(false)
    }

    pub fn return_url(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.return_url.as_deref())
    }

    /// Fail-fast validation: runs before any collaborator call.
    pub fn validate(&self) -> Result<ValidatedRequest<'_>, ValidationError> {
        let payment_intent_id = self
            .payment_intent_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingField("paymentIntentId"))?;
        let payment_method = self
            .payment_method
            .as_ref()
            .ok_or(ValidationError::MissingField("paymentMethod"))?;
        let offer_ids = self.merged_offer_ids();
        if offer_ids.is_empty() {
            return Err(ValidationError::MissingField("offerId"));
        }
        if self.passengers.is_empty() {
            return Err(ValidationError::MissingField("passengers"));
        }
        // Card fields are required up front; the second confirmation phase
        // must never substitute placeholder card data.
        let card = payment_method
            .complete_card()
            .ok_or(ValidationError::MissingCardDetails)?;

        Ok(ValidatedRequest {
            payment_intent_id,
            payment_method,
            card,
            offer_ids,
            passengers: &self.passengers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfare_core::payment::CardDetails;

    fn passenger() -> PassengerInput {
        serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "dateOfBirth": "1990-04-21",
            "gender": "female",
            "email": "ada@example.com",
            "phone": "+15551234567"
        }))
        .unwrap()
    }

    fn valid_request() -> ConfirmationRequest {
        ConfirmationRequest {
            payment_intent_id: Some("pi_123".to_string()),
            payment_method: Some(PaymentMethod {
                id: Some("pm_123".to_string()),
                card: Some(CardDetails {
                    number: "4242424242424242".to_string(),
                    exp_month: 12,
                    exp_year: 2030,
                    cvc: "123".to_string(),
                }),
            }),
            amount: Some(199.0),
            currency: Some("USD".to_string()),
            offer_id: Some("off_1".to_string()),
            offer_ids: Some(vec!["off_1".to_string(), "off_2".to_string()]),
            passengers: vec![passenger()],
            metadata: None,
            is_confirming: Some(true),
            is_roundtrip: None,
        }
    }

    #[test]
    fn test_offer_id_merge_dedup() {
        let req = valid_request();
        assert_eq!(req.merged_offer_ids(), vec!["off_1", "off_2"]);
    }

    #[test]
    fn test_empty_ids_dropped() {
        let mut req = valid_request();
        req.offer_id = Some(String::new());
        req.offer_ids = Some(vec!["off_9".to_string(), String::new()]);
        assert_eq!(req.merged_offer_ids(), vec!["off_9"]);
    }

    #[test]
    fn test_valid_request_passes() {
        let req = valid_request();
        let validated = req.validate().unwrap();
        assert_eq!(validated.payment_intent_id, "pi_123");
        assert_eq!(validated.offer_ids, vec!["off_1", "off_2"]);
        assert_eq!(validated.passengers.len(), 1);
        assert_eq!(validated.card.number, "4242424242424242");
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut req = valid_request();
        req.payment_intent_id = None;
        assert_eq!(req.validate().err(), Some(ValidationError::MissingField("paymentIntentId")));

        let mut req = valid_request();
        req.payment_method = None;
        assert_eq!(req.validate().err(), Some(ValidationError::MissingField("paymentMethod")));

        let mut req = valid_request();
        req.offer_id = None;
        req.offer_ids = None;
        assert_eq!(req.validate().err(), Some(ValidationError::MissingField("offerId")));

        let mut req = valid_request();
        req.passengers.clear();
        assert_eq!(req.validate().err(), Some(ValidationError::MissingField("passengers")));
    }

    #[test]
    fn test_incomplete_card_rejected() {
        let mut req = valid_request();
        req.payment_method.as_mut().unwrap().card = None;
        assert_eq!(req.validate().err(), Some(ValidationError::MissingCardDetails));
    }

    #[test]
    fn test_roundtrip_resolution() {
        let mut req = valid_request();
        assert!(!req.is_roundtrip());

        req.is_roundtrip = Some(true);
        assert!(req.is_roundtrip());

        req.is_roundtrip = None;
        req.metadata = Some(RequestMetadata {
            trip_type: Some("roundtrip".to_string()),
            return_url: None,
        });
        assert!(req.is_roundtrip());

        req.metadata = Some(RequestMetadata {
            trip_type: Some("oneway".to_string()),
            return_url: None,
        });
        assert!(!req.is_roundtrip());
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let req: ConfirmationRequest = serde_json::from_value(serde_json::json!({
            "paymentIntentId": "pi_1",
            "paymentMethod": { "id": "pm_1", "card": null },
            "offerId": "off_1",
            "passengers": [],
            "metadata": { "tripType": "roundtrip", "return_url": "https://x.test/done" },
            "isRoundtrip": false
        }))
        .unwrap();
        assert_eq!(req.payment_intent_id.as_deref(), Some("pi_1"));
        assert!(req.is_roundtrip());
        assert_eq!(req.return_url(), Some("https://x.test/done"));
    }
}
