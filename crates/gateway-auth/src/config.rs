//! # Auth Configuration
//!
//! Clerk-side configuration for token verification.
//! Secrets and domains are loaded from environment variables.

use gateway_core::{GatewayError, GatewayResult};
use std::env;

/// Authentication provider configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Clerk instance domain (e.g. `example.clerk.accounts.dev`)
    pub domain: String,

    /// Expected `aud` claim on incoming tokens
    pub audience: String,
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `CLERK_DOMAIN`
    /// - `CLERK_AUDIENCE`
    pub fn from_env() -> GatewayResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let domain = env::var("CLERK_DOMAIN")
            .map_err(|_| GatewayError::Configuration("CLERK_DOMAIN not set".to_string()))?;

        let audience = env::var("CLERK_AUDIENCE")
            .map_err(|_| GatewayError::Configuration("CLERK_AUDIENCE not set".to_string()))?;

        if domain.is_empty() {
            return Err(GatewayError::Configuration(
                "CLERK_DOMAIN must not be empty".to_string(),
            ));
        }

        Ok(Self { domain, audience })
    }

    /// Create config with explicit values (for testing)
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
        }
    }

    /// Well-known JWKS URL for this Clerk instance
    pub fn jwks_url(&self) -> String {
        format!("https://clerk.{}/.well-known/jwks.json", self.domain)
    }

    /// Expected `iss` claim on incoming tokens
    pub fn issuer(&self) -> String {
        format!("https://clerk.{}", self.domain)
    }
}
