//! # gateway-core
//!
//! Core types for the RemitMatch payments gateway.
//!
//! This crate provides:
//! - `Identity` for claims extracted from a verified bearer token
//! - `PriceId` and `CheckoutRequest` for validated checkout input
//! - `WebhookEvent`, `EventType`, and `WebhookAck` for the webhook flow
//! - `GatewayError` for typed error handling across the gateway

pub mod checkout;
pub mod error;
pub mod event;
pub mod identity;

// Re-exports for convenience
pub use checkout::{CheckoutMode, CheckoutRequest, PriceId};
pub use error::{GatewayError, GatewayResult};
pub use event::{EventType, WebhookAck, WebhookEvent};
pub use identity::Identity;
