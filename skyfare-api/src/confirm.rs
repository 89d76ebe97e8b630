use axum::extract::rejection::JsonRejection;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use skyfare_booking::{ConfirmationOutcome, ConfirmationRequest};
use skyfare_core::orders::CreatedOrder;
use skyfare_core::payment::PaymentIntent;

use crate::state::AppState;

/// Wire response for the confirmation endpoint. Field names and the set of
/// `status` values are part of the client contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_action: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<CreatedOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<PaymentIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl ConfirmResponse {
    fn empty(success: bool) -> Self {
        Self {
            success,
            error: None,
            status: None,
            requires_action: None,
            client_secret: None,
            payment_intent_id: None,
            order: None,
            payment_intent: None,
            booking_reference: None,
            order_id: None,
            payment_status: None,
            errors: None,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/bookings/confirm", post(confirm_booking))
}

/// POST /api/bookings/confirm
/// Drive payment confirmation and order creation to one terminal outcome.
pub async fn confirm_booking(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConfirmResponse>), crate::error::AppError> {
    // Malformed bodies get the same structured JSON shape as workflow failures.
    let Json(request) = payload
        .map_err(|e| crate::error::AppError::ValidationError(format!("Invalid request body: {}", e)))?;

    let outcome = state.workflow.confirm_and_create_order(&request).await;

    Ok(match outcome {
        ConfirmationOutcome::Completed {
            order,
            payment_intent,
            booking_reference,
            order_id,
            payment_status,
        } => {
            let response = ConfirmResponse {
                status: Some("completed".to_string()),
                order: Some(order),
                payment_intent,
                booking_reference: Some(booking_reference),
                order_id: Some(order_id),
                payment_status: Some(payment_status),
                ..ConfirmResponse::empty(true)
            };
            (StatusCode::OK, Json(response))
        }
        ConfirmationOutcome::RequiresAction { client_secret, payment_intent_id } => {
            let response = ConfirmResponse {
                requires_action: Some(true),
                client_secret: Some(client_secret),
                payment_intent_id: Some(payment_intent_id),
                ..ConfirmResponse::empty(false)
            };
            (StatusCode::OK, Json(response))
        }
        ConfirmationOutcome::Failed(failure) => {
            let status_code = StatusCode::from_u16(failure.http_status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let response = ConfirmResponse {
                error: Some(failure.message),
                status: Some(failure.status.as_str().to_string()),
                errors: failure.errors,
                ..ConfirmResponse::empty(false)
            };
            (status_code, Json(response))
        }
    })
}
