//! # Identity
//!
//! Identity claims extracted from a verified bearer token.
//! Lives for exactly one request and is never persisted.

use serde::{Deserialize, Serialize};

/// Identity derived from a verified token.
///
/// Constructed only by the token verifier after signature and claim
/// validation succeed. `user_id` is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject claim of the verified token
    pub user_id: String,

    /// Email claim, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Session claim, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Identity {
    /// Create an identity from verified claims.
    ///
    /// Returns `None` when the subject is absent or empty, which callers
    /// must surface as a missing-subject failure.
    pub fn from_claims(
        sub: Option<String>,
        email: Option<String>,
        session_id: Option<String>,
    ) -> Option<Self> {
        let user_id = sub.filter(|s| !s.is_empty())?;
        Some(Self {
            user_id,
            email,
            session_id,
        })
    }
}
