//! # Stripe Checkout Sessions
//!
//! Creates hosted checkout sessions from validated, authenticated input.
//! The hosted page keeps card data off this service entirely.

use crate::config::StripeConfig;
use gateway_core::{CheckoutRequest, GatewayError, GatewayResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Redirect URLs for the hosted checkout flow.
///
/// The `{CHECKOUT_SESSION_ID}` placeholder is resolved by Stripe at
/// redirect time.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    base_url: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url: String = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn success_url(&self) -> String {
        format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", self.base_url)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/cancel", self.base_url)
    }
}

/// Stripe Checkout Sessions API client
pub struct StripeClient {
    config: StripeConfig,
    urls: CheckoutUrls,
    client: Client,
}

impl StripeClient {
    /// Create a new client with redirect URLs rooted at `frontend_base_url`
    pub fn new(config: StripeConfig, frontend_base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            urls: CheckoutUrls::new(frontend_base_url),
            client,
        }
    }

    /// Build the form parameters for the session-creation call
    fn build_form_params(&self, request: &CheckoutRequest) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), request.mode.as_str().to_string()),
            ("success_url".to_string(), self.urls.success_url()),
            ("cancel_url".to_string(), self.urls.cancel_url()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (
                "line_items[0][price]".to_string(),
                request.price_id.as_str().to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];

        if request.is_subscription() {
            params.push(("allow_promotion_codes".to_string(), "true".to_string()));
        }

        // Identity metadata is opaque reconciliation data, not authorization.
        // The downstream app reads `userId`, so the key is camelCase.
        params.push(("metadata[userId]".to_string(), request.user_id.clone()));
        if let Some(ref email) = request.email {
            params.push(("metadata[email]".to_string(), email.clone()));
        }
        params.push((
            "metadata[subscription]".to_string(),
            request.is_subscription().to_string(),
        ));

        params
    }

    /// Create a checkout session and return the provider's session id
    #[instrument(skip(self, request), fields(user_id = %request.user_id, price_id = %request.price_id))]
    pub async fn create_session(&self, request: &CheckoutRequest) -> GatewayResult<String> {
        let form_params = self.build_form_params(request);
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let idempotency_key = Uuid::new_v4().to_string();

        debug!("Creating checkout session: mode={}", request.mode.as_str());

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);
            return Err(map_stripe_error(status.as_u16(), &body));
        }

        let session: SessionResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::Serialization(format!("failed to parse Stripe response: {}", e))
        })?;

        info!(
            "Created checkout session: id={}, user={}",
            session.id, request.user_id
        );
        Ok(session.id)
    }
}

/// Fold a Stripe error response into the closed error taxonomy
fn map_stripe_error(status: u16, body: &str) -> GatewayError {
    if let Ok(parsed) = serde_json::from_str::<StripeErrorResponse>(body) {
        if parsed.error.code.as_deref() == Some("card_declined") {
            return GatewayError::PaymentDeclined {
                reason: parsed.error.message,
            };
        }
        return GatewayError::ProviderRejected {
            message: parsed.error.message,
        };
    }

    if status >= 500 {
        GatewayError::NetworkError(format!("Stripe returned HTTP {}", status))
    } else {
        GatewayError::ProviderRejected {
            message: format!("HTTP {}", status),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::Identity;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_request(subscription: bool) -> CheckoutRequest {
        let identity = Identity {
            user_id: "user_2abc".into(),
            email: Some("dev@example.com".into()),
            session_id: None,
        };
        CheckoutRequest::new(&identity, "price_ab12cd34ef56gh", subscription).unwrap()
    }

    fn client(server: &MockServer) -> StripeClient {
        let config =
            StripeConfig::new("sk_test_abc", "whsec_test").with_api_base_url(server.uri());
        StripeClient::new(config, "https://app.example.com")
    }

    #[test]
    fn test_redirect_urls() {
        let urls = CheckoutUrls::new("https://app.example.com/");
        assert_eq!(
            urls.success_url(),
            "https://app.example.com/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(urls.cancel_url(), "https://app.example.com/cancel");
    }

    #[test]
    fn test_form_params_payment_mode() {
        let server_config = StripeConfig::new("sk_test_abc", "whsec_test");
        let client = StripeClient::new(server_config, "https://app.example.com");
        let params = client.build_form_params(&test_request(false));

        assert!(params.contains(&("mode".to_string(), "payment".to_string())));
        assert!(params.contains(&(
            "line_items[0][price]".to_string(),
            "price_ab12cd34ef56gh".to_string()
        )));
        assert!(params.contains(&("metadata[userId]".to_string(), "user_2abc".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "metadata[user_id]"));
        assert!(!params
            .iter()
            .any(|(k, _)| k == "allow_promotion_codes"));
    }

    #[test]
    fn test_form_params_subscription_mode() {
        let server_config = StripeConfig::new("sk_test_abc", "whsec_test");
        let client = StripeClient::new(server_config, "https://app.example.com");
        let params = client.build_form_params(&test_request(true));

        assert!(params.contains(&("mode".to_string(), "subscription".to_string())));
        assert!(params.contains(&("allow_promotion_codes".to_string(), "true".to_string())));
        assert!(params.contains(&("metadata[subscription]".to_string(), "true".to_string())));
    }

    #[tokio::test]
    async fn test_create_session_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains("price_ab12cd34ef56gh"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "cs_test_456"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session_id = client(&server)
            .create_session(&test_request(false))
            .await
            .unwrap();
        assert_eq!(session_id, "cs_test_456");
    }

    #[tokio::test]
    async fn test_api_rejection_maps_to_provider_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "No such price", "code": "resource_missing"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_session(&test_request(false))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ProviderRejected { ref message } if message == "No such price"));
    }

    #[tokio::test]
    async fn test_card_declined_maps_to_payment_declined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": {"message": "Your card was declined.", "code": "card_declined"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_session(&test_request(false))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::PaymentDeclined { .. }));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_session(&test_request(false))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NetworkError(_)));
    }
}
