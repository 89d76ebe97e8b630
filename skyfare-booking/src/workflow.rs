use std::sync::Arc;

use skyfare_core::orders::{OrderError, OrderRequest};
use skyfare_core::passenger::Traveler;
use skyfare_core::payment::{PaymentConfirmation, PaymentGateway};
use skyfare_core::phone::PhoneDefaults;
use skyfare_core::platform::BookingPlatform;
use uuid::Uuid;

use crate::outcome::{Compensation, ConfirmationFailure, ConfirmationOutcome, FailureStatus};
use crate::pricing::{build_order_metadata, select_offer, OfferPrice};
use crate::request::ConfirmationRequest;
use crate::verify::{verify_offers, VerifiedBatch};

/// Drives one client confirmation request to a single terminal outcome:
/// validate, normalize, confirm payment, re-verify offers, select one,
/// reconcile pricing, re-confirm with card details, create the order.
///
/// No step is retried; every failure is terminal for the request. The one
/// exception to "terminal" is the 3-D Secure step-up, which hands control
/// back to the caller to finish authentication and resubmit.
pub struct ConfirmationWorkflow {
    gateway: Arc<dyn PaymentGateway>,
    platform: Arc<dyn BookingPlatform>,
    phone_defaults: PhoneDefaults,
}

impl ConfirmationWorkflow {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        platform: Arc<dyn BookingPlatform>,
        phone_defaults: PhoneDefaults,
    ) -> Self {
        Self { gateway, platform, phone_defaults }
    }

    /// Top-level entry point. Nothing escapes as an error; unexpected
    /// internals collapse into a generic `confirmation_error`.
    pub async fn confirm_and_create_order(&self, request: &ConfirmationRequest) -> ConfirmationOutcome {
        let correlation_id = Uuid::new_v4();
        match self.run(correlation_id, request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(%correlation_id, error = ?err, "unexpected confirmation failure");
                ConfirmationOutcome::failed(
                    FailureStatus::ConfirmationError,
                    "An unexpected error occurred during confirmation",
                    500,
                )
            }
        }
    }

    async fn run(
        &self,
        correlation_id: Uuid,
        request: &ConfirmationRequest,
    ) -> anyhow::Result<ConfirmationOutcome> {
        // 1. Validate before touching any collaborator
        let validated = match request.validate() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(%correlation_id, error = %err, "confirmation request rejected");
                return Ok(ConfirmationOutcome::failed(FailureStatus::Unknown, err.to_string(), 400));
            }
        };
        let intent_id = validated.payment_intent_id;
        let is_roundtrip = request.is_roundtrip();
        let return_url = request.return_url();

        tracing::info!(
            %correlation_id,
            payment_intent = intent_id,
            offers = validated.offer_ids.len(),
            passengers = validated.passengers.len(),
            is_roundtrip,
            "starting booking confirmation"
        );

        // 2. Normalize passengers to the platform shape
        let travelers: Vec<Traveler> = validated
            .passengers
            .iter()
            .map(|p| p.to_traveler(&self.phone_defaults))
            .collect();

        // 3. First-phase payment confirmation
        let confirmation = match self
            .gateway
            .confirm_payment(intent_id, validated.payment_method, return_url)
            .await
        {
            Ok(confirmation) => confirmation,
            Err(err) => {
                tracing::error!(%correlation_id, error = %err, "payment confirmation transport failure");
                return Ok(ConfirmationOutcome::failed(
                    FailureStatus::PaymentFailed,
                    "Payment confirmation failed - please try again",
                    402,
                ));
            }
        };
        if let Some(outcome) = self.non_success_payment(
            correlation_id,
            intent_id,
            &confirmation,
            FailureStatus::PaymentFailed,
            402,
        ) {
            return Ok(outcome);
        }

        // 4. Re-verify every requested offer against the live offer store
        let offers = match verify_offers(self.platform.as_ref(), &validated.offer_ids).await {
            VerifiedBatch::AllValid(offers) => offers,
            VerifiedBatch::Rejected(rejection) => {
                return Ok(ConfirmationOutcome::failed(
                    rejection.status(),
                    rejection.message(),
                    rejection.http_status(),
                ));
            }
        };

        // 5. Exactly one offer goes to order creation
        let Some(selected) = select_offer(&offers, is_roundtrip) else {
            return Ok(ConfirmationOutcome::failed(
                FailureStatus::NoValidOffers,
                "No valid offers available - please search again",
                400,
            ));
        };
        tracing::info!(
            %correlation_id,
            selected_offer = %selected.id,
            slices = selected.slices.len(),
            "offer selected for booking"
        );

        // 6. Authoritative pricing from the offer, never the client amount
        let price = OfferPrice::from_offer(selected);

        // 7. Second-phase confirmation with full card details
        let confirmation = match self
            .gateway
            .confirm_with_card(intent_id, validated.card, return_url)
            .await
        {
            Ok(confirmation) => confirmation,
            Err(err) => {
                tracing::error!(%correlation_id, error = %err, "card confirmation transport failure");
                return Ok(ConfirmationOutcome::failed(
                    FailureStatus::PaymentIntentConfirmationError,
                    "Payment intent confirmation failed - please try again",
                    500,
                ));
            }
        };
        if let Some(outcome) = self.non_success_payment(
            correlation_id,
            intent_id,
            &confirmation,
            FailureStatus::PaymentIntentConfirmationFailed,
            402,
        ) {
            return Ok(outcome);
        }
        let intent = confirmation.intent;

        // 8. Create the order with the single selected offer
        let metadata = build_order_metadata(
            is_roundtrip,
            &price,
            intent.as_ref(),
            &validated.offer_ids,
            &selected.id,
        );
        let order_request = OrderRequest {
            offer_id: selected.id.clone(),
            passengers: travelers,
            payment_intent_id: intent_id.to_string(),
            amount: price.amount,
            currency: price.currency.clone(),
            metadata,
        };

        // 9. Interpret the platform's verdict
        match self.platform.create_order(&order_request).await {
            Ok(order) => {
                let payment_status = intent
                    .as_ref()
                    .map(|i| i.status.as_str().to_string())
                    .unwrap_or_else(|| "succeeded".to_string());
                tracing::info!(
                    %correlation_id,
                    order_id = %order.id,
                    booking_reference = %order.booking_reference,
                    "order created"
                );
                Ok(ConfirmationOutcome::Completed {
                    booking_reference: order.booking_reference.clone(),
                    order_id: order.id.clone(),
                    payment_status,
                    payment_intent: intent,
                    order,
                })
            }
            Err(err) => {
                // Payment is already captured; void it so the gateway and
                // the platform never disagree about this request.
                let compensation = self.compensate(correlation_id, intent_id).await;
                Ok(ConfirmationOutcome::Failed(self.classify_order_error(
                    correlation_id,
                    err,
                    compensation,
                )))
            }
        }
    }

    /// Shared handling for both confirmation phases: step-up goes back to the
    /// caller, anything else non-successful becomes the given failure status.
    fn non_success_payment(
        &self,
        correlation_id: Uuid,
        intent_id: &str,
        confirmation: &PaymentConfirmation,
        failure_status: FailureStatus,
        http_status: u16,
    ) -> Option<ConfirmationOutcome> {
        if confirmation.requires_action {
            tracing::info!(%correlation_id, payment_intent = intent_id, "payment requires 3-D Secure step-up");
            return Some(ConfirmationOutcome::RequiresAction {
                client_secret: confirmation.client_secret.clone().unwrap_or_default(),
                payment_intent_id: intent_id.to_string(),
            });
        }
        if !confirmation.success {
            let message = confirmation
                .error
                .clone()
                .unwrap_or_else(|| format!("Payment not confirmed: {}", confirmation.status.as_str()));
            tracing::warn!(%correlation_id, payment_intent = intent_id, %message, "payment not confirmed");
            return Some(ConfirmationOutcome::failed(failure_status, message, http_status));
        }
        None
    }

    async fn compensate(&self, correlation_id: Uuid, intent_id: &str) -> Compensation {
        match self.gateway.cancel_intent(intent_id).await {
            Ok(()) => {
                tracing::info!(%correlation_id, payment_intent = intent_id, "payment intent voided after order failure");
                Compensation::PaymentVoided
            }
            Err(err) => {
                tracing::error!(
                    %correlation_id,
                    payment_intent = intent_id,
                    error = %err,
                    "failed to void payment intent; manual reconciliation required"
                );
                Compensation::VoidFailed(err.to_string())
            }
        }
    }

    fn classify_order_error(
        &self,
        correlation_id: Uuid,
        err: OrderError,
        compensation: Compensation,
    ) -> ConfirmationFailure {
        tracing::warn!(%correlation_id, error = %err, "order creation failed");
        if err.is_offer_not_found() {
            return ConfirmationFailure::new(
                FailureStatus::OfferInvalid,
                "Offer is no longer available - please search again",
                400,
            )
            .with_compensation(compensation);
        }
        match err {
            OrderError::Rejected { message, http_status, errors } => {
                ConfirmationFailure::new(FailureStatus::OrderCreationFailed, message, http_status)
                    .with_errors(errors)
                    .with_compensation(compensation)
            }
            OrderError::Transport(_) => ConfirmationFailure::new(
                FailureStatus::OrderCreationError,
                "Order creation failed - please try again",
                500,
            )
            .with_compensation(compensation),
        }
    }
}
