//! Connection settings and transport failures shared by the external
//! gateway front doors.

use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;

/// Transaction ids the external gateways issue on success.
///
/// Ids outside this range were never produced by a gateway, so cancel
/// requests for them are refused locally without a remote call.
pub const VALID_TRANSACTION_IDS: RangeInclusive<i64> = 10_000..=99_999_999;

/// Sentinel transaction id carried by failed results.
pub const FAILED_TRANSACTION_ID: i64 = -1;

/// Connection settings for one external gateway.
///
/// Each gateway reads its own settings from the environment under a
/// distinct prefix, e.g. `PAYMENT_GATEWAY_BASE_URL`.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the remote service.
    pub base_url: String,

    /// Budget for a single remote call attempt.
    pub request_timeout: Duration,

    /// Total attempts per call, the first try included. Clamped to at
    /// least one.
    pub retry_attempts: u32,

    /// Fixed pause between attempts.
    pub retry_delay: Duration,

    /// When false the gateway refuses work without calling out.
    pub enabled: bool,
}

impl GatewayConfig {
    /// Creates a config with default timeouts and retries.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(10),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(2),
            enabled: true,
        }
    }

    /// Loads configuration from environment variables under `prefix`.
    ///
    /// Recognized variables, with `PAYMENT_GATEWAY` as the example
    /// prefix:
    /// - `PAYMENT_GATEWAY_BASE_URL`
    /// - `PAYMENT_GATEWAY_REQUEST_TIMEOUT_SECS`
    /// - `PAYMENT_GATEWAY_RETRY_ATTEMPTS`
    /// - `PAYMENT_GATEWAY_RETRY_DELAY_SECS`
    /// - `PAYMENT_GATEWAY_ENABLED`
    pub fn from_env(prefix: &str, default_base_url: &str) -> Self {
        let defaults = Self::new(default_base_url);
        Self {
            base_url: env::var(format!("{prefix}_BASE_URL"))
                .unwrap_or_else(|_| defaults.base_url),
            request_timeout: env_secs(prefix, "REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout),
            retry_attempts: env_parse(prefix, "RETRY_ATTEMPTS")
                .unwrap_or(defaults.retry_attempts),
            retry_delay: env_secs(prefix, "RETRY_DELAY_SECS").unwrap_or(defaults.retry_delay),
            enabled: env_parse(prefix, "ENABLED").unwrap_or(defaults.enabled),
        }
    }

    /// Returns a copy with retries and delays suppressed, useful in
    /// tests that exercise failure paths without waiting.
    pub fn without_retries(mut self) -> Self {
        self.retry_attempts = 1;
        self.retry_delay = Duration::ZERO;
        self
    }
}

fn env_parse<T: std::str::FromStr>(prefix: &str, key: &str) -> Option<T> {
    env::var(format!("{prefix}_{key}")).ok()?.parse().ok()
}

fn env_secs(prefix: &str, key: &str) -> Option<Duration> {
    env_parse::<u64>(prefix, key).map(Duration::from_secs)
}

/// A transport-level failure while talking to a remote gateway.
///
/// Transient by definition. Business refusals arrive as ordinary
/// responses, never as this error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not complete within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// The remote endpoint could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),
}
