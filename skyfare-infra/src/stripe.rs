use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use skyfare_core::payment::{
    CardDetails, GatewayError, PaymentConfirmation, PaymentGateway, PaymentIntent, PaymentMethod,
    PaymentStatus,
};

use crate::app_config::GatewayConfig;

/// Stripe-backed payment gateway. Confirmation is form-encoded against the
/// payment-intents API with the account's secret key.
pub struct StripeGateway {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct StripeIntent {
    id: String,
    status: String,
    amount: i64,
    currency: String,
    client_secret: Option<String>,
    last_payment_error: Option<StripeErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetail,
}

fn map_status(status: &str) -> PaymentStatus {
    match status {
        "succeeded" => PaymentStatus::Succeeded,
        "processing" => PaymentStatus::Processing,
        "requires_action" | "requires_source_action" => PaymentStatus::RequiresAction,
        "requires_payment_method" => PaymentStatus::RequiresPaymentMethod,
        "canceled" => PaymentStatus::Canceled,
        _ => PaymentStatus::Failed,
    }
}

impl StripeGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    async fn confirm(
        &self,
        intent_id: &str,
        form: &[(String, String)],
    ) -> Result<PaymentConfirmation, GatewayError> {
        let url = format!("{}/v1/payment_intents/{}/confirm", self.base_url, intent_id);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .form(form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if response.status().is_success() {
            let intent: StripeIntent = response
                .json()
                .await
                .map_err(|e| GatewayError::Malformed(e.to_string()))?;
            let status = map_status(&intent.status);
            let requires_action = status == PaymentStatus::RequiresAction;
            let success = status == PaymentStatus::Succeeded;
            let error = intent
                .last_payment_error
                .and_then(|e| e.message)
                .filter(|_| !success);
            Ok(PaymentConfirmation {
                success,
                requires_action,
                client_secret: intent.client_secret.clone(),
                intent: Some(PaymentIntent {
                    id: intent.id,
                    amount: intent.amount,
                    currency: intent.currency,
                    status: status.clone(),
                    client_secret: intent.client_secret,
                }),
                status,
                error,
            })
        } else {
            // Declines and parameter errors come back as an error envelope;
            // they are collaborator verdicts, not transport failures.
            let http_status = response.status();
            let envelope: StripeErrorEnvelope = response
                .json()
                .await
                .map_err(|e| GatewayError::Malformed(e.to_string()))?;
            let message = envelope
                .error
                .message
                .unwrap_or_else(|| format!("Payment confirmation rejected: HTTP {}", http_status));
            tracing::warn!(intent_id, %http_status, %message, "gateway rejected confirmation");
            Ok(PaymentConfirmation {
                success: false,
                status: PaymentStatus::Failed,
                intent: None,
                requires_action: false,
                client_secret: None,
                error: Some(message),
            })
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn confirm_payment(
        &self,
        intent_id: &str,
        method: &PaymentMethod,
        return_url: Option<&str>,
    ) -> Result<PaymentConfirmation, GatewayError> {
        let mut form: Vec<(String, String)> = Vec::new();
        if let Some(id) = &method.id {
            form.push(("payment_method".to_string(), id.clone()));
        }
        if let Some(url) = return_url {
            form.push(("return_url".to_string(), url.to_string()));
        }
        self.confirm(intent_id, &form).await
    }

    async fn confirm_with_card(
        &self,
        intent_id: &str,
        card: &CardDetails,
        return_url: Option<&str>,
    ) -> Result<PaymentConfirmation, GatewayError> {
        let mut form: Vec<(String, String)> = vec![
            ("payment_method_data[type]".to_string(), "card".to_string()),
            ("payment_method_data[card][number]".to_string(), card.number.clone()),
            ("payment_method_data[card][exp_month]".to_string(), card.exp_month.to_string()),
            ("payment_method_data[card][exp_year]".to_string(), card.exp_year.to_string()),
            ("payment_method_data[card][cvc]".to_string(), card.cvc.clone()),
        ];
        if let Some(url) = return_url {
            form.push(("return_url".to_string(), url.to_string()));
        }
        self.confirm(intent_id, &form).await
    }

    async fn cancel_intent(&self, intent_id: &str) -> Result<(), GatewayError> {
        let url = format!("{}/v1/payment_intents/{}/cancel", self.base_url, intent_id);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::Transport(format!(
                "cancel rejected: HTTP {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status("succeeded"), PaymentStatus::Succeeded);
        assert_eq!(map_status("requires_action"), PaymentStatus::RequiresAction);
        assert_eq!(map_status("requires_source_action"), PaymentStatus::RequiresAction);
        assert_eq!(map_status("requires_payment_method"), PaymentStatus::RequiresPaymentMethod);
        assert_eq!(map_status("processing"), PaymentStatus::Processing);
        assert_eq!(map_status("canceled"), PaymentStatus::Canceled);
        assert_eq!(map_status("weird"), PaymentStatus::Failed);
    }

    #[test]
    fn test_intent_envelope_parse() {
        let intent: StripeIntent = serde_json::from_value(serde_json::json!({
            "id": "pi_1",
            "status": "succeeded",
            "amount": 25000,
            "currency": "usd",
            "client_secret": "pi_1_secret",
            "last_payment_error": null
        }))
        .unwrap();
        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.amount, 25000);
    }
}
