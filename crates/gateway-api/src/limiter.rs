//! # Rate Limiter
//!
//! Fixed-window request counter keyed by client address. Ephemeral and
//! process-local; constructed once at startup and injected through
//! `AppState` so tests can substitute their own windows.

use gateway_core::{GatewayError, GatewayResult};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Checkout endpoint budget: requests per window
const DEFAULT_MAX_REQUESTS: u32 = 10;

/// Checkout endpoint window length
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window limiter: the first request from an address opens a window;
/// requests beyond the budget inside that window are rejected until it
/// expires.
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl FixedWindowLimiter {
    /// Limiter with the checkout defaults (10 requests / 60 s)
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }

    /// Limiter with explicit limits (for testing)
    pub fn with_limits(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `addr`, rejecting it when over budget
    pub fn check(&self, addr: IpAddr) -> GatewayResult<()> {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|p| p.into_inner());

        let entry = windows.entry(addr).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        entry.count += 1;
        if entry.count > self.max_requests {
            let elapsed = now.duration_since(entry.started);
            let retry_after_secs = self.window.saturating_sub(elapsed).as_secs().max(1);
            return Err(GatewayError::RateLimited { retry_after_secs });
        }

        Ok(())
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    #[test]
    fn test_tenth_allowed_eleventh_rejected() {
        let limiter = FixedWindowLimiter::new();

        for i in 1..=10 {
            assert!(limiter.check(addr(1)).is_ok(), "request {i} should pass");
        }

        let err = limiter.check(addr(1)).unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited { .. }));
    }

    #[test]
    fn test_addresses_are_independent() {
        let limiter = FixedWindowLimiter::with_limits(1, Duration::from_secs(60));

        assert!(limiter.check(addr(1)).is_ok());
        assert!(limiter.check(addr(1)).is_err());
        assert!(limiter.check(addr(2)).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = FixedWindowLimiter::with_limits(2, Duration::from_millis(50));

        assert!(limiter.check(addr(1)).is_ok());
        assert!(limiter.check(addr(1)).is_ok());
        assert!(limiter.check(addr(1)).is_err());

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.check(addr(1)).is_ok());
    }

    #[test]
    fn test_retry_after_is_bounded_by_window() {
        let limiter = FixedWindowLimiter::with_limits(1, Duration::from_secs(60));
        limiter.check(addr(1)).unwrap();

        match limiter.check(addr(1)).unwrap_err() {
            GatewayError::RateLimited { retry_after_secs } => {
                assert!(retry_after_secs >= 1 && retry_after_secs <= 60);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
