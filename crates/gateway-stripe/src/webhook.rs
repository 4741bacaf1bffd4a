//! # Webhook Signature Verification
//!
//! Validates inbound Stripe event payloads against the shared signing
//! secret. Verification runs over the exact bytes received, before any
//! JSON parsing: re-serialization is not guaranteed to reproduce the
//! original bytes and would break signature matching.

use crate::config::StripeConfig;
use chrono::{DateTime, Utc};
use gateway_core::{EventType, GatewayError, GatewayResult, WebhookEvent};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, instrument};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a webhook timestamp (seconds)
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Verifies `stripe-signature` headers and parses events
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            secret: config.webhook_secret.clone(),
            tolerance_secs: TIMESTAMP_TOLERANCE_SECS,
        }
    }

    /// Verify a raw payload against its signature header.
    ///
    /// Returns a typed event only when the signature matches; every header
    /// problem (absent parts, bad timestamp, mismatch) is a
    /// `SignatureVerificationFailed`.
    #[instrument(skip(self, payload, signature_header))]
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> GatewayResult<WebhookEvent> {
        let sig_parts = parse_signature_header(signature_header)?;

        let now = Utc::now().timestamp();
        if (now - sig_parts.timestamp).abs() > self.tolerance_secs {
            return Err(GatewayError::SignatureVerificationFailed(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let expected = compute_signature(&self.secret, sig_parts.timestamp, payload);

        // Accept any v1 candidate; comparison is constant-time
        let valid = sig_parts
            .signatures
            .iter()
            .any(|sig| constant_time_compare(sig, &expected));

        if !valid {
            return Err(GatewayError::SignatureVerificationFailed(
                "signature mismatch".to_string(),
            ));
        }

        // Only now is the body trusted enough to parse
        let raw: RawEvent = serde_json::from_slice(payload)
            .map_err(|e| GatewayError::WebhookParse(format!("invalid event body: {}", e)))?;

        let event_type = EventType::from_wire(&raw.event_type);
        debug!("Verified webhook: id={}, type={}", raw.id, raw.event_type);

        Ok(WebhookEvent {
            event_id: raw.id,
            event_type,
            data_object: raw.data.object,
            created: DateTime::from_timestamp(raw.created, 0).unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> GatewayResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.splitn(2, '=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0].trim() {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        GatewayError::SignatureVerificationFailed("missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(GatewayError::SignatureVerificationFailed(
            "no v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// HMAC-SHA256 over `"{timestamp}." + payload`, hex-encoded.
///
/// The payload bytes are fed to the MAC untouched.
fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Build a `stripe-signature` header value for a payload (test helper,
/// mirrors what the provider sends)
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(secret, timestamp, payload)
    )
}
