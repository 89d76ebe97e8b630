use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use skyfare_core::offers::OfferSnapshot;
use skyfare_core::orders::{CreatedOrder, OrderError, OrderRequest};
use skyfare_core::platform::{BookingPlatform, PlatformError};

use crate::app_config::PlatformConfig;

/// Duffel-backed booking platform client. Every call carries the bearer
/// token and the pinned API version header.
pub struct DuffelClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    api_version: String,
}

/// Duffel wraps every payload in a `data` envelope.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<PlatformErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct PlatformErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderPayload {
    id: String,
    booking_reference: Option<String>,
    status: Option<String>,
    total_amount: Option<String>,
    total_currency: Option<String>,
}

impl DuffelClient {
    pub fn new(config: &PlatformConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_token)
            .header("Duffel-Version", &self.api_version)
            .header("Accept", "application/json")
    }
}

fn first_error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .errors
        .into_iter()
        .next()
        .and_then(|e| e.message.or(e.title))
}

#[async_trait]
impl BookingPlatform for DuffelClient {
    async fn get_offer(&self, offer_id: &str) -> Result<Option<OfferSnapshot>, PlatformError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/air/offers/{}", offer_id))
            .send()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let envelope: DataEnvelope<OfferSnapshot> = response
                    .json()
                    .await
                    .map_err(|e| PlatformError::Malformed(e.to_string()))?;
                Ok(Some(envelope.data))
            }
            status => {
                tracing::warn!(offer_id, %status, "offer lookup rejected");
                Err(PlatformError::Status(status.as_u16()))
            }
        }
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, OrderError> {
        let body = serde_json::json!({
            "data": {
                "type": "instant",
                "selected_offers": [request.offer_id],
                "passengers": request.passengers,
                "payments": [{
                    "type": "balance",
                    "amount": format!("{:.2}", request.amount),
                    "currency": request.currency,
                }],
                "metadata": request.metadata,
            }
        });

        let response = self
            .request(reqwest::Method::POST, "/air/orders")
            .json(&body)
            .send()
            .await
            .map_err(|e| OrderError::Transport(e.to_string()))?;

        let http_status = response.status();
        if http_status.is_success() {
            let envelope: DataEnvelope<OrderPayload> = response
                .json()
                .await
                .map_err(|e| OrderError::Transport(e.to_string()))?;
            let order = envelope.data;
            Ok(CreatedOrder {
                booking_reference: order.booking_reference.unwrap_or_else(|| order.id.clone()),
                id: order.id,
                status: order.status,
                total_amount: order.total_amount,
                total_currency: order.total_currency,
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            let errors: Option<serde_json::Value> = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("errors").cloned());
            let message = first_error_message(&body)
                .unwrap_or_else(|| format!("Order creation rejected: HTTP {}", http_status));
            tracing::warn!(%http_status, %message, "order creation rejected");
            Err(OrderError::Rejected {
                message,
                http_status: http_status.as_u16(),
                errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_parse() {
        let body = r#"{"errors": [{"title": "Not Found", "message": "The offer was not found"}]}"#;
        assert_eq!(first_error_message(body).as_deref(), Some("The offer was not found"));

        let title_only = r#"{"errors": [{"title": "Validation error"}]}"#;
        assert_eq!(first_error_message(title_only).as_deref(), Some("Validation error"));

        assert_eq!(first_error_message("not json"), None);
        assert_eq!(first_error_message(r#"{"errors": []}"#), None);
    }

    #[test]
    fn test_offer_envelope_parse() {
        let envelope: DataEnvelope<OfferSnapshot> = serde_json::from_str(
            r#"{"data": {
                "id": "off_1",
                "total_amount": "250.00",
                "total_currency": "GBP",
                "expires_at": "2030-01-01T00:00:00Z",
                "slices": [{"id": "sli_1", "origin": "LHR", "destination": "JFK", "departing_at": null}]
            }}"#,
        )
        .unwrap();
        assert_eq!(envelope.data.id, "off_1");
        assert_eq!(envelope.data.slices.len(), 1);
        assert!(!envelope.data.is_expired());
    }
}
