//! # Gateway Error Types
//!
//! Closed error taxonomy for the payments gateway.
//! All gateway operations return `Result<T, GatewayError>`.

use thiserror::Error;

/// Core error type for all gateway operations.
///
/// Each variant maps to exactly one HTTP status via [`GatewayError::status_code`].
/// Provider SDK failures are folded into this closed enumeration at the
/// boundary instead of being matched by exception type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No bearer token supplied on a protected route
    #[error("Authorization header required")]
    MissingToken,

    /// Token cannot be parsed, or its header carries no key id
    #[error("Invalid token format: {0}")]
    MalformedToken(String),

    /// Token's key id is not present in the cached key set
    #[error("Unknown signing key: {kid}")]
    UnknownKey { kid: String },

    /// Signature check failed, claims mismatch, or token expired
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    /// Signature valid but the token carries no subject claim
    #[error("Token has no subject claim")]
    MissingSubject,

    /// Key set retrieval from the auth provider failed
    #[error("Authentication service unavailable: {0}")]
    AuthUnavailable(String),

    /// Webhook signature verification failed (absent/malformed header included)
    #[error("Webhook signature verification failed: {0}")]
    SignatureVerificationFailed(String),

    /// Webhook payload parsing error (after a valid signature)
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Price id does not match the `price_` + alphanumeric pattern
    #[error("Invalid price id: {price_id}")]
    InvalidPriceId { price_id: String },

    /// Client exceeded the per-address request budget
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Payment provider rejected the request (invalid payment request)
    #[error("Provider rejected request: {message}")]
    ProviderRejected { message: String },

    /// Payment was declined (card declined and friends)
    #[error("Payment declined: {reason}")]
    PaymentDeclined { reason: String },

    /// Network/HTTP error communicating with an upstream service
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Configuration(_) => 500,
            GatewayError::InvalidRequest(_) => 400,
            GatewayError::MissingToken => 401,
            GatewayError::MalformedToken(_) => 401,
            GatewayError::UnknownKey { .. } => 401,
            GatewayError::InvalidToken(_) => 401,
            GatewayError::MissingSubject => 401,
            GatewayError::AuthUnavailable(_) => 503,
            GatewayError::SignatureVerificationFailed(_) => 400,
            GatewayError::WebhookParse(_) => 400,
            GatewayError::InvalidPriceId { .. } => 400,
            GatewayError::RateLimited { .. } => 429,
            GatewayError::ProviderRejected { .. } => 400,
            GatewayError::PaymentDeclined { .. } => 402,
            GatewayError::NetworkError(_) => 503,
            GatewayError::Serialization(_) => 500,
            GatewayError::Internal(_) => 500,
        }
    }

    /// Returns true if this is an authentication failure (401 family)
    pub fn is_auth_failure(&self) -> bool {
        self.status_code() == 401
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_map_to_401() {
        assert_eq!(GatewayError::MissingToken.status_code(), 401);
        assert_eq!(
            GatewayError::MalformedToken("no kid".into()).status_code(),
            401
        );
        assert_eq!(
            GatewayError::UnknownKey { kid: "k1".into() }.status_code(),
            401
        );
        assert_eq!(
            GatewayError::InvalidToken("expired".into()).status_code(),
            401
        );
        assert_eq!(GatewayError::MissingSubject.status_code(), 401);
        assert!(GatewayError::MissingToken.is_auth_failure());
    }

    #[test]
    fn test_webhook_failures_map_to_400() {
        assert_eq!(
            GatewayError::SignatureVerificationFailed("mismatch".into()).status_code(),
            400
        );
        assert_eq!(
            GatewayError::WebhookParse("bad json".into()).status_code(),
            400
        );
    }

    #[test]
    fn test_upstream_and_limit_codes() {
        assert_eq!(
            GatewayError::AuthUnavailable("fetch failed".into()).status_code(),
            503
        );
        assert_eq!(
            GatewayError::NetworkError("timeout".into()).status_code(),
            503
        );
        assert_eq!(
            GatewayError::RateLimited {
                retry_after_secs: 42
            }
            .status_code(),
            429
        );
        assert_eq!(
            GatewayError::PaymentDeclined {
                reason: "card_declined".into()
            }
            .status_code(),
            402
        );
        assert_eq!(
            GatewayError::InvalidPriceId {
                price_id: "prc_123".into()
            }
            .status_code(),
            400
        );
    }
}
