//! # Application State
//!
//! Shared state for the Axum application. Every component (token verifier,
//! Stripe client, webhook verifier, relay, rate limiter) is constructed
//! once at process start and injected by handle, never reached through
//! module-level singletons.

use crate::limiter::FixedWindowLimiter;
use gateway_auth::{AuthConfig, TokenVerifier};
use gateway_stripe::{HttpRelay, StripeClient, StripeConfig, WebhookVerifier};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Frontend base URL for redirects and the webhook relay
    pub frontend_url: String,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec![frontend_url.clone()]);

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8001),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            frontend_url,
            cors_origins,
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: Arc<AppConfig>,
    /// Bearer token verifier (owns the JWKS cache)
    pub verifier: Arc<TokenVerifier>,
    /// Stripe Checkout Sessions client
    pub stripe: Arc<StripeClient>,
    /// Webhook signature verifier
    pub webhooks: Arc<WebhookVerifier>,
    /// Downstream event relay
    pub relay: Arc<HttpRelay>,
    /// Checkout endpoint rate limiter
    pub limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    /// Build state for production from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let stripe_config = StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Stripe config: {}", e))?;
        let auth_config = AuthConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load auth config: {}", e))?;

        let verifier = TokenVerifier::new(&auth_config);
        let webhooks = WebhookVerifier::new(&stripe_config);
        let stripe = StripeClient::new(stripe_config, &config.frontend_url);
        let relay = HttpRelay::new(&config.frontend_url);

        Ok(Self::with_components(
            config,
            verifier,
            stripe,
            webhooks,
            relay,
            FixedWindowLimiter::new(),
        ))
    }

    /// Build state from explicit components (used by tests to substitute
    /// doubles and short rate-limit windows)
    pub fn with_components(
        config: AppConfig,
        verifier: TokenVerifier,
        stripe: StripeClient,
        webhooks: WebhookVerifier,
        relay: HttpRelay,
        limiter: FixedWindowLimiter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            stripe: Arc::new(stripe),
            webhooks: Arc::new(webhooks),
            relay: Arc::new(relay),
            limiter: Arc::new(limiter),
        }
    }
}
