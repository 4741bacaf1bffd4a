//! # Request Handlers
//!
//! Axum request handlers for the payments gateway. The checkout route is
//! rate-limited and requires a verified identity; the webhook route
//! authenticates itself through signature verification instead.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use gateway_auth::bearer_token;
use gateway_core::{CheckoutRequest, GatewayError, WebhookAck};
use gateway_stripe::dispatch_event;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout request body.
///
/// Identity fields are deliberately absent: user id and email come from
/// the verified bearer token, never from the body.
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutBody {
    /// Stripe price id (`price_...`)
    pub price_id: String,
    /// Subscription vs one-time payment
    #[serde(default)]
    pub subscription: bool,
}

/// Create checkout response
#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    /// Provider session id for the hosted checkout page
    pub session_id: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

type ErrorReply = (StatusCode, HeaderMap, Json<ErrorResponse>);

fn error_reply(err: GatewayError) -> ErrorReply {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    if let GatewayError::RateLimited { retry_after_secs } = &err {
        if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
            headers.insert(header::RETRY_AFTER, value);
        }
    }

    (status, headers, Json(ErrorResponse::new(err.to_string())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness marker at the root
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "RemitMatch gateway is running"
    }))
}

/// Health check endpoint.
///
/// Runs a dependency check against the auth provider's key set (served
/// from cache once primed) and degrades status when it fails.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let auth_keys_ok = state.verifier.check_keys().await.is_ok();
    let status = if auth_keys_ok { "healthy" } else { "unhealthy" };

    Json(serde_json::json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "auth_keys": if auth_keys_ok { "ok" } else { "unavailable" },
        }
    }))
}

/// Create a checkout session for the authenticated user
#[instrument(skip(state, headers, body), fields(client = %addr.ip()))]
pub async fn create_checkout(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<CreateCheckoutBody>,
) -> Result<(StatusCode, Json<CreateCheckoutResponse>), ErrorReply> {
    state.limiter.check(addr.ip()).map_err(|e| {
        warn!("Rate limit hit: client={}", addr.ip());
        error_reply(e)
    })?;

    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    let token = bearer_token(authorization).map_err(error_reply)?;

    let identity = state.verifier.verify(token).await.map_err(|e| {
        warn!("Token verification failed: {}", e);
        error_reply(e)
    })?;

    let request = CheckoutRequest::new(&identity, &body.price_id, body.subscription)
        .map_err(error_reply)?;

    info!(
        "Creating checkout: user={}, price={}, subscription={}",
        request.user_id,
        request.price_id,
        request.is_subscription()
    );

    let session_id = state.stripe.create_session(&request).await.map_err(|e| {
        error!(
            "Checkout creation failed: user={}, price={}: {}",
            request.user_id, request.price_id, e
        );
        error_reply(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCheckoutResponse { session_id }),
    ))
}

/// Handle a Stripe webhook delivery.
///
/// Signature verification runs over the raw body bytes before any
/// parsing. Once it passes, the response is a success ack regardless of
/// downstream relay outcome; the provider's retry policy only governs
/// non-2xx responses.
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ErrorReply> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            error_reply(GatewayError::SignatureVerificationFailed(
                "missing stripe-signature header".to_string(),
            ))
        })?;

    let event = state.webhooks.verify(&body, signature).map_err(|e| {
        warn!("Webhook verification failed: {}", e);
        error_reply(e)
    })?;

    info!(
        "Received webhook: id={}, type={}",
        event.event_id,
        event.event_type.as_wire()
    );

    let ack = dispatch_event(state.relay.as_ref(), &event).await;
    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reply_maps_status() {
        let (status, headers, Json(body)) = error_reply(GatewayError::MissingToken);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "Authorization header required");
        assert!(headers.get(header::RETRY_AFTER).is_none());

        let (status, _, _) = error_reply(GatewayError::SignatureVerificationFailed("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rate_limited_reply_carries_retry_after_header() {
        let (status, headers, _) = error_reply(GatewayError::RateLimited {
            retry_after_secs: 30,
        });
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            headers.get(header::RETRY_AFTER).and_then(|v| v.to_str().ok()),
            Some("30")
        );
    }

    #[test]
    fn test_checkout_body_defaults() {
        let body: CreateCheckoutBody =
            serde_json::from_str(r#"{"price_id": "price_ab12cd34ef56gh"}"#).unwrap();
        assert!(!body.subscription);
    }
}
