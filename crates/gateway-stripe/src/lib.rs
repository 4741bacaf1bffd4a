//! # gateway-stripe
//!
//! Stripe integration for the RemitMatch gateway.
//!
//! This crate provides:
//!
//! 1. **StripeClient** — hosted Checkout Sessions API
//!    - One-time payment and subscription modes
//!    - Identity metadata for reconciliation
//!    - Idempotency keys on every create call
//!
//! 2. **WebhookVerifier** — inbound event authentication
//!    - HMAC-SHA256 over the exact bytes received
//!    - Constant-time signature comparison
//!    - Timestamp tolerance against replay
//!
//! 3. **Event dispatch** — routes verified events by type and relays
//!    `checkout.session.completed` to the downstream application
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use gateway_stripe::{WebhookVerifier, HttpRelay, dispatch_event};
//!
//! let event = verifier.verify(&raw_body, signature_header)?;
//! let ack = dispatch_event(&relay, &event).await;
//! ```

pub mod checkout;
pub mod config;
pub mod relay;
pub mod webhook;

// Re-exports
pub use checkout::{CheckoutUrls, StripeClient};
pub use config::StripeConfig;
pub use relay::{dispatch_event, EventForwarder, HttpRelay};
pub use webhook::{sign_payload, WebhookVerifier};
