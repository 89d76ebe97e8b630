//! Mock collaborators with call recording, shared by unit and API tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use skyfare_core::offers::OfferSnapshot;
use skyfare_core::orders::{CreatedOrder, OrderError, OrderRequest};
use skyfare_core::payment::{
    CardDetails, GatewayError, PaymentConfirmation, PaymentGateway, PaymentIntent, PaymentMethod,
    PaymentStatus,
};
use skyfare_core::platform::{BookingPlatform, PlatformError};

/// Scripted behavior for a gateway confirmation call.
#[derive(Debug, Clone)]
pub enum ScriptedConfirm {
    Succeed,
    Decline(String),
    RequiresAction { client_secret: String },
    TransportFailure,
}

pub struct MockPaymentGateway {
    pub phase_one: ScriptedConfirm,
    pub phase_two: ScriptedConfirm,
    /// Minor units reported on confirmed intents.
    pub intent_amount: i64,
    pub confirm_calls: AtomicUsize,
    pub card_confirm_calls: AtomicUsize,
    pub canceled_intents: Mutex<Vec<String>>,
    pub fail_cancel: bool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            phase_one: ScriptedConfirm::Succeed,
            phase_two: ScriptedConfirm::Succeed,
            intent_amount: 25_000,
            confirm_calls: AtomicUsize::new(0),
            card_confirm_calls: AtomicUsize::new(0),
            canceled_intents: Mutex::new(Vec::new()),
            fail_cancel: false,
        }
    }

    pub fn with_phase_one(mut self, script: ScriptedConfirm) -> Self {
        self.phase_one = script;
        self
    }

    pub fn with_phase_two(mut self, script: ScriptedConfirm) -> Self {
        self.phase_two = script;
        self
    }

    pub fn with_intent_amount(mut self, minor: i64) -> Self {
        self.intent_amount = minor;
        self
    }

    pub fn with_failing_cancel(mut self) -> Self {
        self.fail_cancel = true;
        self
    }

    pub fn total_confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst) + self.card_confirm_calls.load(Ordering::SeqCst)
    }

    fn respond(&self, intent_id: &str, script: &ScriptedConfirm) -> Result<PaymentConfirmation, GatewayError> {
        let intent = |status: PaymentStatus, secret: Option<String>| PaymentIntent {
            id: intent_id.to_string(),
            amount: self.intent_amount,
            currency: "USD".to_string(),
            status,
            client_secret: secret,
        };

        match script {
            ScriptedConfirm::Succeed => Ok(PaymentConfirmation {
                success: true,
                status: PaymentStatus::Succeeded,
                intent: Some(intent(PaymentStatus::Succeeded, None)),
                requires_action: false,
                client_secret: None,
                error: None,
            }),
            ScriptedConfirm::Decline(message) => Ok(PaymentConfirmation {
                success: false,
                status: PaymentStatus::Failed,
                intent: Some(intent(PaymentStatus::Failed, None)),
                requires_action: false,
                client_secret: None,
                error: Some(message.clone()),
            }),
            ScriptedConfirm::RequiresAction { client_secret } => Ok(PaymentConfirmation {
                success: false,
                status: PaymentStatus::RequiresAction,
                intent: Some(intent(PaymentStatus::RequiresAction, Some(client_secret.clone()))),
                requires_action: true,
                client_secret: Some(client_secret.clone()),
                error: None,
            }),
            ScriptedConfirm::TransportFailure => {
                Err(GatewayError::Transport("connection reset".to_string()))
            }
        }
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn confirm_payment(
        &self,
        intent_id: &str,
        _method: &PaymentMethod,
        _return_url: Option<&str>,
    ) -> Result<PaymentConfirmation, GatewayError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(intent_id, &self.phase_one)
    }

    async fn confirm_with_card(
        &self,
        intent_id: &str,
        _card: &CardDetails,
        _return_url: Option<&str>,
    ) -> Result<PaymentConfirmation, GatewayError> {
        self.card_confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(intent_id, &self.phase_two)
    }

    async fn cancel_intent(&self, intent_id: &str) -> Result<(), GatewayError> {
        if self.fail_cancel {
            return Err(GatewayError::Transport("cancel endpoint unavailable".to_string()));
        }
        self.canceled_intents.lock().unwrap().push(intent_id.to_string());
        Ok(())
    }
}

/// Scripted behavior for the order-creation call.
#[derive(Debug, Clone)]
pub enum ScriptedOrder {
    Succeed,
    Reject {
        message: String,
        http_status: u16,
        errors: Option<serde_json::Value>,
    },
    TransportFailure,
}

pub struct MockBookingPlatform {
    offers: HashMap<String, OfferSnapshot>,
    failing_offers: HashSet<String>,
    order_script: ScriptedOrder,
    pub offer_lookups: AtomicUsize,
    pub order_requests: Mutex<Vec<OrderRequest>>,
}

impl MockBookingPlatform {
    pub fn new() -> Self {
        Self {
            offers: HashMap::new(),
            failing_offers: HashSet::new(),
            order_script: ScriptedOrder::Succeed,
            offer_lookups: AtomicUsize::new(0),
            order_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_offer(mut self, offer: OfferSnapshot) -> Self {
        self.offers.insert(offer.id.clone(), offer);
        self
    }

    /// Make lookups of this id fail at the transport level.
    pub fn with_offer_failure(mut self, offer_id: &str) -> Self {
        self.failing_offers.insert(offer_id.to_string());
        self
    }

    pub fn with_order_script(mut self, script: ScriptedOrder) -> Self {
        self.order_script = script;
        self
    }

    pub fn order_call_count(&self) -> usize {
        self.order_requests.lock().unwrap().len()
    }

    pub fn lookup_count(&self) -> usize {
        self.offer_lookups.load(Ordering::SeqCst)
    }
}

impl Default for MockBookingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingPlatform for MockBookingPlatform {
    async fn get_offer(&self, offer_id: &str) -> Result<Option<OfferSnapshot>, PlatformError> {
        self.offer_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_offers.contains(offer_id) {
            return Err(PlatformError::Transport("connection reset".to_string()));
        }
        Ok(self.offers.get(offer_id).cloned())
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, OrderError> {
        self.order_requests.lock().unwrap().push(request.clone());
        match &self.order_script {
            ScriptedOrder::Succeed => Ok(CreatedOrder {
                id: "ord_mock_1".to_string(),
                booking_reference: "SKY123".to_string(),
                status: Some("confirmed".to_string()),
                total_amount: Some(format!("{:.2}", request.amount)),
                total_currency: Some(request.currency.clone()),
            }),
            ScriptedOrder::Reject { message, http_status, errors } => Err(OrderError::Rejected {
                message: message.clone(),
                http_status: *http_status,
                errors: errors.clone(),
            }),
            ScriptedOrder::TransportFailure => {
                Err(OrderError::Transport("connection reset".to_string()))
            }
        }
    }
}
