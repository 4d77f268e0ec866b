//! Payment provider webhooks.
//!
//! The signature header has the form `t=<unix seconds>,v1=<hex>[,v1=...]`
//! where each `v1` is HMAC-SHA256 of `"<t>.<raw body>"` keyed with the
//! endpoint secret. Verification happens before the body is parsed.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{info, warn};

use crate::mailer::{Email, Mailer};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Maximum accepted age of a signed timestamp, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook secret not configured")]
    MissingSecret,

    #[error("Missing signature header")]
    MissingSignature,

    #[error("Malformed signature header")]
    MalformedSignature,

    #[error("Signature timestamp outside tolerance")]
    StaleTimestamp,

    #[error("Signature verification failed")]
    SignatureMismatch,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Check `header` against `payload` at time `now` (unix seconds).
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| WebhookError::MalformedSignature)?,
                );
            }
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedSignature)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedSignature);
    }
    if now.abs_diff(timestamp) > TIMESTAMP_TOLERANCE_SECS.unsigned_abs() {
        return Err(WebhookError::StaleTimestamp);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::MissingSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    // verify_slice compares in constant time
    if signatures
        .iter()
        .any(|signature| mac.clone().verify_slice(signature).is_ok())
    {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    CheckoutCompleted,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    InvoicePaymentFailed,
    Unrecognized,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => Self::CheckoutCompleted,
            "customer.subscription.created" => Self::SubscriptionCreated,
            "customer.subscription.updated" => Self::SubscriptionUpdated,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            _ => Self::Unrecognized,
        }
    }
}

/// Buyer details from a completed checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub email: Option<String>,
    pub plan: Option<String>,
}

impl CompletedCheckout {
    pub fn from_session(session: &serde_json::Value) -> Self {
        let email = session["customer_details"]["email"]
            .as_str()
            .or_else(|| session["customer_email"].as_str())
            .filter(|email| !email.is_empty())
            .map(str::to_string);
        let plan = session["metadata"]["plan"].as_str().map(str::to_string);
        Self { email, plan }
    }
}

/// Act on a verified event. Side effects are best-effort: failures are
/// logged and the event still counts as received.
pub async fn handle_event(event: &WebhookEvent, mailer: &dyn Mailer) -> EventKind {
    let kind = event.kind();
    let id = event.id.as_deref().unwrap_or("-");

    match kind {
        EventKind::CheckoutCompleted => {
            let checkout = CompletedCheckout::from_session(&event.data.object);
            info!(event_id = id, plan = ?checkout.plan, "checkout completed");
            match checkout.email {
                Some(email) => {
                    let message = Email::purchase_confirmation(&email, checkout.plan.as_deref());
                    if let Err(e) = mailer.send(&message).await {
                        warn!(event_id = id, error = %e, "failed to send confirmation email");
                    }
                }
                None => warn!(event_id = id, "completed checkout has no customer email"),
            }
        }
        EventKind::SubscriptionCreated
        | EventKind::SubscriptionUpdated
        | EventKind::SubscriptionDeleted => {
            let subscription = event.data.object["id"].as_str().unwrap_or("-");
            info!(
                event_id = id,
                event_type = %event.event_type,
                subscription,
                "subscription changed"
            );
        }
        EventKind::InvoicePaymentFailed => {
            let customer = event.data.object["customer"].as_str().unwrap_or("-");
            warn!(event_id = id, customer, "invoice payment failed");
        }
        EventKind::Unrecognized => {
            info!(event_id = id, event_type = %event.event_type, "ignoring unhandled event type");
        }
    }

    kind
}

/// Build a signature header the way the provider does.
#[cfg(test)]
pub(crate) fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}
