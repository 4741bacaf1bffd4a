//! # gateway-api
//!
//! HTTP API layer for the RemitMatch payments gateway.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Bearer-authenticated checkout session creation
//! - Signature-authenticated webhook handling with relay dispatch
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Liveness marker |
//! | GET | `/health` | Health check |
//! | POST | `/checkout` | Create checkout session |
//! | POST | `/webhook` | Stripe webhook |

pub mod handlers;
pub mod limiter;
pub mod routes;
pub mod state;

pub use limiter::FixedWindowLimiter;
pub use routes::create_router;
pub use state::{AppConfig, AppState};
