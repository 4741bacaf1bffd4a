//! # Checkout Types
//!
//! Validated input for checkout session creation.

use crate::error::{GatewayError, GatewayResult};
use crate::identity::Identity;
use serde::{Deserialize, Serialize};

/// Minimum number of characters after the `price_` prefix
const PRICE_ID_MIN_SUFFIX: usize = 14;

/// A validated Stripe price identifier.
///
/// Accepts `price_` followed by at least 14 ASCII-alphanumeric characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceId(String);

impl PriceId {
    /// Parse and validate a raw price id
    pub fn parse(raw: &str) -> GatewayResult<Self> {
        let suffix = raw.strip_prefix("price_").ok_or_else(|| {
            GatewayError::InvalidPriceId {
                price_id: raw.to_string(),
            }
        })?;

        if suffix.len() < PRICE_ID_MIN_SUFFIX || !suffix.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(GatewayError::InvalidPriceId {
                price_id: raw.to_string(),
            });
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PriceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checkout mode for the hosted session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// One-time payment
    Payment,
    /// Recurring subscription (promotion codes allowed)
    Subscription,
}

impl CheckoutMode {
    /// Stripe's wire name for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
        }
    }
}

/// A validated checkout session request.
///
/// Immutable once constructed. `user_id` and `email` come from the
/// verified [`Identity`] only, never from unauthenticated body fields.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub email: Option<String>,
    pub price_id: PriceId,
    pub mode: CheckoutMode,
}

impl CheckoutRequest {
    /// Build a checkout request from an authenticated identity.
    ///
    /// The raw price id is validated here; callers never see an
    /// unvalidated request.
    pub fn new(identity: &Identity, price_id: &str, subscription: bool) -> GatewayResult<Self> {
        let price_id = PriceId::parse(price_id)?;
        let mode = if subscription {
            CheckoutMode::Subscription
        } else {
            CheckoutMode::Payment
        };

        Ok(Self {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            price_id,
            mode,
        })
    }

    pub fn is_subscription(&self) -> bool {
        self.mode == CheckoutMode::Subscription
    }
}
