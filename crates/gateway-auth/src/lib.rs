//! # gateway-auth
//!
//! Bearer token verification for the RemitMatch gateway.
//!
//! This crate provides:
//! - `JwksCache` — lazy, process-lifetime cache of the auth provider's
//!   public-key set
//! - `TokenVerifier` — RS256 verification with audience/issuer checks,
//!   producing an `Identity`
//! - `bearer_token` — `Authorization` header extraction
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gateway_auth::{AuthConfig, TokenVerifier, bearer_token};
//!
//! let config = AuthConfig::from_env()?;
//! let verifier = TokenVerifier::new(&config);
//!
//! let token = bearer_token(authorization_header)?;
//! let identity = verifier.verify(token).await?;
//! println!("authenticated: {}", identity.user_id);
//! ```

pub mod config;
pub mod jwks;
pub mod verifier;

// Re-exports
pub use config::AuthConfig;
pub use jwks::{Jwk, JwkSet, JwksCache};
pub use verifier::{bearer_token, TokenVerifier};
