//! Payment processor webhook verification and parsing

use chrono::Utc;
use hmac::{Hmac, Mac};
use routewise_types::PaymentId;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, error, instrument, warn};

use crate::error::BillingError;

/// Header carrying the `t=…,v1=…` signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a signed webhook, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// What a webhook event asks us to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEventKind {
    /// A charge failed
    Failed { reason: Option<String> },
    /// A charge succeeded
    Succeeded,
    /// Any event type we don't act on
    Ignored,
}

/// A verified webhook event
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    /// Processor event id
    pub id: String,
    /// Processor event type, e.g. `payment_intent.payment_failed`
    pub event_type: String,
    /// Action to take
    pub kind: PaymentEventKind,
    /// Internal payment the event refers to, from `metadata.payment_id`
    pub payment_id: Option<PaymentId>,
    /// Processor id of the charge, used to count each charge once
    pub charge_id: Option<String>,
    /// When the processor created the event (Unix timestamp)
    pub created: i64,
}

/// Verifies and parses processor webhooks
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Option<String>,
}

impl WebhookVerifier {
    /// Create a verifier; `None` accepts unsigned events
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Whether signatures are being checked
    pub fn is_enforcing(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify and parse a webhook payload
    #[instrument(skip(self, payload, signature))]
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<PaymentEvent, BillingError> {
        match (&self.secret, signature) {
            (Some(secret), Some(header)) => {
                verify_signature(secret, payload, header, Utc::now().timestamp())?
            }
            (Some(_), None) => {
                warn!("Webhook rejected: missing signature header");
                return Err(BillingError::Webhook("Missing signature".to_string()));
            }
            (None, _) => warn!("Webhook secret not configured; accepting unsigned event"),
        }

        parse_event(payload)
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("enforcing", &self.is_enforcing())
            .finish()
    }
}

/// Verify a `t=…,v1=…` signature header against `payload` at time `now`
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: i64,
) -> Result<(), BillingError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        if let Some((key, value)) = part.trim().split_once('=') {
            match key {
                "t" => timestamp = Some(value),
                "v1" => signatures.push(value),
                _ => {}
            }
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        warn!("Missing timestamp in webhook signature");
        BillingError::Webhook("Missing timestamp".to_string())
    })?;

    if signatures.is_empty() {
        warn!("Missing v1 signature in webhook signature");
        return Err(BillingError::Webhook("Missing signature".to_string()));
    }

    let expected = sign(secret, timestamp, payload)?;

    // The processor sends several v1 entries while a secret is being rolled
    let matched = signatures
        .iter()
        .any(|sig| bool::from(sig.as_bytes().ct_eq(expected.as_bytes())));
    if !matched {
        error!("Webhook signature verification failed");
        return Err(BillingError::Webhook(
            "Signature verification failed".to_string(),
        ));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| BillingError::Webhook("Invalid timestamp format".to_string()))?;
    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        warn!(timestamp = ts, now = now, "Webhook timestamp too old");
        return Err(BillingError::Webhook("Timestamp too old".to_string()));
    }

    Ok(())
}

/// Compute the hex `v1` signature for `payload` signed at `timestamp`
pub fn sign(secret: &str, timestamp: &str, payload: &[u8]) -> Result<String, BillingError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::Internal("HMAC error".to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Parse a webhook body into a [`PaymentEvent`]
pub fn parse_event(payload: &[u8]) -> Result<PaymentEvent, BillingError> {
    let raw: RawEvent =
        serde_json::from_slice(payload).map_err(|e| BillingError::Webhook(e.to_string()))?;

    debug!(event_id = %raw.id, event_type = %raw.event_type, "Parsed webhook event");

    let failed = match raw.event_type.as_str() {
        "payment_intent.payment_failed" | "invoice.payment_failed" => true,
        "payment_intent.succeeded" | "invoice.paid" | "invoice.payment_succeeded" => false,
        _ => {
            return Ok(PaymentEvent {
                id: raw.id,
                event_type: raw.event_type,
                kind: PaymentEventKind::Ignored,
                payment_id: None,
                charge_id: None,
                created: raw.created,
            })
        }
    };

    let object: RawObject = serde_json::from_value(raw.data.object)
        .map_err(|e| BillingError::Webhook(e.to_string()))?;

    let kind = if failed {
        PaymentEventKind::Failed {
            reason: object
                .last_payment_error
                .as_ref()
                .and_then(|e| e.message.clone()),
        }
    } else {
        PaymentEventKind::Succeeded
    };

    let payment_id = object
        .metadata
        .as_ref()
        .and_then(|m| m.payment_id.as_deref())
        .and_then(|raw_id| match PaymentId::parse(raw_id) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(payment_id = %raw_id, "Webhook metadata carries a malformed payment id");
                None
            }
        });

    // Invoices point at the intent that charged them; use it so both event
    // families agree on the charge identity
    let charge_id = object.payment_intent.or(object.id);

    Ok(PaymentEvent {
        id: raw.id,
        event_type: raw.event_type,
        kind,
        payment_id,
        charge_id,
        created: raw.created,
    })
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
    #[serde(default)]
    created: i64,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct RawObject {
    id: Option<String>,
    payment_intent: Option<String>,
    metadata: Option<RawMetadata>,
    last_payment_error: Option<RawPaymentError>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    payment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPaymentError {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    fn body(event_type: &str, payment_id: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": event_type,
            "created": 1_700_000_000,
            "data": { "object": {
                "id": "pi_123",
                "metadata": { "payment_id": payment_id },
                "last_payment_error": { "message": "Your card was declined." }
            }}
        }))
        .unwrap()
    }

    fn header_for(payload: &[u8], ts: i64) -> String {
        format!("t={ts},v1={}", sign(SECRET, &ts.to_string(), payload).unwrap())
    }

    #[test]
    fn test_valid_signature() {
        let payload = body("payment_intent.payment_failed", "x");
        let header = header_for(&payload, 1_700_000_000);
        assert!(verify_signature(SECRET, &payload, &header, 1_700_000_100).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = body("payment_intent.payment_failed", "x");
        let header = header_for(&payload, 1_700_000_000);
        assert!(verify_signature("whsec_other", &payload, &header, 1_700_000_000).is_err());
    }

    #[test]
    fn test_modified_payload_rejected() {
        let payload = body("payment_intent.payment_failed", "x");
        let header = header_for(&payload, 1_700_000_000);
        let tampered = body("payment_intent.succeeded", "x");
        assert!(verify_signature(SECRET, &tampered, &header, 1_700_000_000).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = body("payment_intent.payment_failed", "x");
        let header = header_for(&payload, 1_700_000_000);
        let err = verify_signature(SECRET, &payload, &header, 1_700_000_301).unwrap_err();
        assert!(err.to_string().contains("Timestamp too old"));
    }

    #[test]
    fn test_any_matching_v1_accepted() {
        let payload = body("invoice.paid", "x");
        let good = sign(SECRET, "1700000000", &payload).unwrap();
        let header = format!("t=1700000000,v1={},v1={good}", "0".repeat(64));
        assert!(verify_signature(SECRET, &payload, &header, 1_700_000_000).is_ok());
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let payload = body("invoice.paid", "x");
        assert!(verify_signature(SECRET, &payload, "", 0).is_err());
        assert!(verify_signature(SECRET, &payload, "t=1700000000", 1_700_000_000).is_err());
        assert!(verify_signature(SECRET, &payload, "v1=abcd", 1_700_000_000).is_err());
    }

    #[test]
    fn test_missing_header_rejected_when_enforcing() {
        let verifier = WebhookVerifier::new(Some(SECRET.to_string()));
        let payload = body("invoice.paid", "x");
        assert!(verifier.verify_and_parse(&payload, None).is_err());
    }

    #[test]
    fn test_unsigned_accepted_without_secret() {
        let verifier = WebhookVerifier::new(Some(String::new()));
        assert!(!verifier.is_enforcing());

        let id = PaymentId::new();
        let payload = body("payment_intent.payment_failed", &id.to_string());
        let event = verifier.verify_and_parse(&payload, None).unwrap();

        assert_eq!(event.id, "evt_1");
        assert_eq!(event.payment_id, Some(id));
        assert_eq!(event.charge_id.as_deref(), Some("pi_123"));
        assert_eq!(
            event.kind,
            PaymentEventKind::Failed {
                reason: Some("Your card was declined.".to_string())
            }
        );
    }

    #[test]
    fn test_event_kinds() {
        let kind = |t: &str| parse_event(&body(t, "x")).unwrap().kind;
        assert_eq!(kind("payment_intent.succeeded"), PaymentEventKind::Succeeded);
        assert_eq!(kind("invoice.paid"), PaymentEventKind::Succeeded);
        assert!(matches!(kind("invoice.payment_failed"), PaymentEventKind::Failed { .. }));
        assert_eq!(kind("customer.created"), PaymentEventKind::Ignored);
    }

    #[test]
    fn test_malformed_payment_id_is_dropped() {
        let event = parse_event(&body("invoice.paid", "not-a-uuid")).unwrap();
        assert_eq!(event.payment_id, None);
    }

    #[test]
    fn test_invoice_uses_payment_intent_as_charge() {
        let payload = serde_json::to_vec(&json!({
            "id": "evt_2",
            "type": "invoice.payment_failed",
            "data": { "object": { "id": "in_9", "payment_intent": "pi_9" } }
        }))
        .unwrap();
        let event = parse_event(&payload).unwrap();
        assert_eq!(event.charge_id.as_deref(), Some("pi_9"));
        assert_eq!(event.kind, PaymentEventKind::Failed { reason: None });
    }

    #[test]
    fn test_garbage_payload_rejected() {
        assert!(parse_event(b"not json").is_err());
        assert!(parse_event(br#"{"id":"evt"}"#).is_err());
    }
}
