//! # RemitMatch Gateway
//!
//! Payments gateway: bearer-token auth, hosted Stripe checkout, webhook
//! verification and relay dispatch.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export CLERK_DOMAIN=example.clerk.accounts.dev
//! export CLERK_AUDIENCE=remitmatch
//! export FRONTEND_URL=https://app.remitmatch.io
//!
//! # Run the server
//! remit-gateway
//! ```

use gateway_api::{routes, state::AppState};
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::from_env()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Frontend URL: {}", state.config.frontend_url);

    // Create router
    let app = routes::create_router(state);

    // Start server; ConnectInfo feeds the per-address rate limiter
    info!("RemitMatch gateway starting on http://{}", addr);

    if !is_prod {
        info!("Checkout: POST http://{}/checkout", addr);
        info!("Webhook:  POST http://{}/webhook", addr);
        info!("Health:   GET  http://{}/health", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
