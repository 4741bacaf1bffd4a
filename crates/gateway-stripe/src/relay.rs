//! # Event Dispatcher
//!
//! Routes verified webhook events by type. The one handled type,
//! `checkout.session.completed`, is forwarded to the downstream relay
//! application; everything else is acknowledged and logged.
//!
//! Relay failures are logged and swallowed: the provider retries webhook
//! delivery on non-2xx responses only, and a transient relay outage must
//! not trigger provider-side redelivery that would duplicate side effects
//! downstream once the relay recovers. At-most-once per dispatch, no dedup.

use async_trait::async_trait;
use gateway_core::{EventType, GatewayError, GatewayResult, WebhookAck, WebhookEvent};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// Relay endpoint path under the frontend base URL
const RELAY_PATH: &str = "/api/payments/webhook";

/// Seam between event dispatch and the outbound relay call
#[async_trait]
pub trait EventForwarder: Send + Sync {
    /// Deliver a completed-checkout event downstream
    async fn forward_checkout_completed(&self, event: &WebhookEvent) -> GatewayResult<()>;
}

/// HTTP relay to the downstream web application
pub struct HttpRelay {
    client: Client,
    url: String,
}

impl HttpRelay {
    /// Create a relay targeting `{frontend_base_url}/api/payments/webhook`
    pub fn new(frontend_base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: format!("{}{}", frontend_base_url.trim_end_matches('/'), RELAY_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EventForwarder for HttpRelay {
    #[instrument(skip(self, event), fields(event_id = %event.event_id))]
    async fn forward_checkout_completed(&self, event: &WebhookEvent) -> GatewayResult<()> {
        let payload = json!({
            "type": event.event_type.as_wire(),
            "data": {"object": event.data_object},
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::NetworkError(format!(
                "relay returned HTTP {}",
                status
            )));
        }

        Ok(())
    }
}

/// Dispatch a verified event to its handler.
///
/// Always returns a success ack once signature verification passed,
/// regardless of relay outcome.
pub async fn dispatch_event(forwarder: &dyn EventForwarder, event: &WebhookEvent) -> WebhookAck {
    match &event.event_type {
        EventType::CheckoutCompleted => {
            let session_id = event.session_id().unwrap_or("unknown");
            info!(
                "Checkout completed: event={}, session={}",
                event.event_id, session_id
            );

            if let Err(e) = forwarder.forward_checkout_completed(event).await {
                // Deliberately swallowed; see module docs
                error!(
                    "Relay delivery failed for event {}: {}",
                    event.event_id, e
                );
            }
        }
        EventType::Unknown(name) => {
            debug!("Unhandled webhook event type: {}", name);
        }
    }

    WebhookAck::success()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn checkout_event() -> WebhookEvent {
        let object = json!({"id": "cs_test_123", "payment_status": "paid"});
        WebhookEvent {
            event_id: "evt_1".into(),
            event_type: EventType::CheckoutCompleted,
            data_object: object.as_object().unwrap().clone(),
            created: Utc::now(),
        }
    }

    fn unknown_event() -> WebhookEvent {
        WebhookEvent {
            event_id: "evt_2".into(),
            event_type: EventType::Unknown("invoice.paid".into()),
            data_object: serde_json::Map::new(),
            created: Utc::now(),
        }
    }

    struct RecordingForwarder {
        calls: AtomicU32,
        fail: bool,
    }

    impl RecordingForwarder {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl EventForwarder for RecordingForwarder {
        async fn forward_checkout_completed(&self, _event: &WebhookEvent) -> GatewayResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(GatewayError::NetworkError("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_checkout_completed_is_forwarded() {
        let forwarder = RecordingForwarder::new(false);
        let ack = dispatch_event(&forwarder, &checkout_event()).await;

        assert_eq!(ack.status, "success");
        assert_eq!(forwarder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_forwarded() {
        let forwarder = RecordingForwarder::new(false);
        let ack = dispatch_event(&forwarder, &unknown_event()).await;

        assert_eq!(ack.status, "success");
        assert_eq!(forwarder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_relay_failure_is_swallowed() {
        let forwarder = RecordingForwarder::new(true);
        let ack = dispatch_event(&forwarder, &checkout_event()).await;

        assert_eq!(ack.status, "success");
        assert_eq!(forwarder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_double_dispatch_forwards_twice() {
        // At-most-once per call, no dedup
        let forwarder = RecordingForwarder::new(false);
        let event = checkout_event();
        dispatch_event(&forwarder, &event).await;
        dispatch_event(&forwarder, &event).await;

        assert_eq!(forwarder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_http_relay_posts_event_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payments/webhook"))
            .and(body_partial_json(json!({
                "type": "checkout.session.completed",
                "data": {"object": {"id": "cs_test_123"}}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let relay = HttpRelay::new(&server.uri());
        relay
            .forward_checkout_completed(&checkout_event())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_http_relay_non_2xx_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payments/webhook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let relay = HttpRelay::new(&server.uri());
        let err = relay
            .forward_checkout_completed(&checkout_event())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NetworkError(_)));
    }
}
