//! # JWKS Key Cache
//!
//! Fetches the auth provider's public-key set on first use and caches it
//! for the process lifetime. Fetch failures are never cached, so the next
//! request retries. The cache never expires on its own: if the provider
//! rotates keys, tokens signed by new keys fail verification until restart
//! (documented staleness trade-off; `invalidate` exists for controlled
//! refresh but nothing calls it in the request path).

use gateway_core::{GatewayError, GatewayResult};
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// A single RSA public key from the provider's key set
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key id, matched against the token header's `kid`
    pub kid: String,

    /// Key type (`RSA`)
    pub kty: String,

    /// Signing algorithm, when published
    #[serde(default)]
    pub alg: Option<String>,

    /// Intended use, when published (`sig`)
    #[serde(rename = "use", default)]
    pub key_use: Option<String>,

    /// RSA modulus, base64url
    pub n: String,

    /// RSA exponent, base64url
    pub e: String,
}

/// The provider's published key set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Linear scan by key id, first match wins
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}

/// Lazily populated, process-lifetime key cache.
///
/// Concurrent cold-start requests may each fetch; the fetched value is
/// immutable, so a bounded number of redundant fetches with last-write-wins
/// is acceptable.
pub struct JwksCache {
    client: reqwest::Client,
    url: String,
    cached: RwLock<Option<Arc<JwkSet>>>,
}

impl JwksCache {
    /// Create a cache that fetches from the given JWKS URL
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: url.into(),
            cached: RwLock::new(None),
        }
    }

    /// Get the key set, fetching it on first use
    pub async fn get(&self) -> GatewayResult<Arc<JwkSet>> {
        if let Some(set) = self.read_cached() {
            return Ok(set);
        }

        let set = Arc::new(self.fetch().await?);
        debug!("Cached JWKS with {} keys", set.keys.len());

        let mut guard = self.cached.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(set.clone());
        Ok(set)
    }

    /// Drop the cached key set; the next `get` fetches again
    pub fn invalidate(&self) {
        let mut guard = self.cached.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Whether a key set is currently cached
    pub fn is_primed(&self) -> bool {
        self.read_cached().is_some()
    }

    fn read_cached(&self) -> Option<Arc<JwkSet>> {
        self.cached
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    async fn fetch(&self) -> GatewayResult<JwkSet> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GatewayError::AuthUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("JWKS fetch failed: status={}", status);
            return Err(GatewayError::AuthUnavailable(format!(
                "JWKS endpoint returned HTTP {}",
                status
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| GatewayError::AuthUnavailable(format!("invalid JWKS body: {}", e)))
    }
}
