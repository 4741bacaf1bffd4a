//! # Webhook Event Types
//!
//! Verified payment-provider events. A `WebhookEvent` is produced only by
//! successful signature verification; everything before that is untrusted
//! bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event types the dispatcher distinguishes.
///
/// Only `checkout.session.completed` triggers any action; every other type
/// is acknowledged and logged. Providers send many event types over time,
/// so unknown types must never fail the webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    /// Checkout session completed — forwarded to the downstream relay
    CheckoutCompleted,
    /// Any other event type (acknowledged, not acted upon)
    Unknown(String),
}

impl EventType {
    /// Map a provider wire name to an event type
    pub fn from_wire(name: &str) -> Self {
        match name {
            "checkout.session.completed" => EventType::CheckoutCompleted,
            other => EventType::Unknown(other.to_string()),
        }
    }

    /// The provider wire name for this event type
    pub fn as_wire(&self) -> &str {
        match self {
            EventType::CheckoutCompleted => "checkout.session.completed",
            EventType::Unknown(name) => name,
        }
    }
}

/// A signature-verified webhook event
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// Event id from the provider (`evt_...`)
    pub event_id: String,

    /// Event type
    pub event_type: EventType,

    /// The `data.object` payload, forwarded verbatim to the relay
    pub data_object: serde_json::Map<String, serde_json::Value>,

    /// Provider-side creation time
    pub created: DateTime<Utc>,
}

impl WebhookEvent {
    /// Session identifier from the event payload, when present
    pub fn session_id(&self) -> Option<&str> {
        self.data_object.get("id").and_then(|v| v.as_str())
    }
}

/// Acknowledgement returned to the webhook caller.
///
/// Always `success` once signature verification passed, regardless of
/// downstream relay outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_mapping() {
        assert_eq!(
            EventType::from_wire("checkout.session.completed"),
            EventType::CheckoutCompleted
        );
        assert_eq!(
            EventType::from_wire("invoice.paid"),
            EventType::Unknown("invoice.paid".into())
        );
        assert_eq!(
            EventType::Unknown("invoice.paid".into()).as_wire(),
            "invoice.paid"
        );
    }

    #[test]
    fn test_session_id_extraction() {
        let object = json!({"id": "cs_test_123", "payment_status": "paid"});
        let event = WebhookEvent {
            event_id: "evt_1".into(),
            event_type: EventType::CheckoutCompleted,
            data_object: object.as_object().unwrap().clone(),
            created: Utc::now(),
        };
        assert_eq!(event.session_id(), Some("cs_test_123"));
    }

    #[test]
    fn test_ack_shape() {
        let ack = WebhookAck::success();
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            json!({"status": "success"})
        );
    }
}
