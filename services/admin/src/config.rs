//! Gateway runtime configuration

use std::time::Duration;

use crate::error::AuthError;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address.
    pub bind_addr: String,
    /// Mark session cookies `Secure`. Set in production behind TLS.
    pub secure_cookies: bool,
    /// Upper bound on guard-side session validation.
    pub validate_timeout: Duration,
    /// Interval between expired-session sweeps.
    pub sweep_interval: Duration,
}

impl GatewayConfig {
    /// Create a new GatewayConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GATEWAY_BIND_ADDR`: listen address (default: 0.0.0.0:3000)
    /// - `GATEWAY_SECURE_COOKIES`: "true" to mark cookies Secure (default: false)
    /// - `GATEWAY_VALIDATE_TIMEOUT_SECS`: session validation bound (default: 5)
    /// - `GATEWAY_SWEEP_INTERVAL_SECS`: sweep cadence (default: 3600)
    pub fn from_env() -> Result<Self, AuthError> {
        let bind_addr =
            std::env::var("GATEWAY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let secure_cookies = std::env::var("GATEWAY_SECURE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let validate_timeout = std::env::var("GATEWAY_VALIDATE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let sweep_interval = std::env::var("GATEWAY_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        Ok(GatewayConfig {
            bind_addr,
            secure_cookies,
            validate_timeout: Duration::from_secs(validate_timeout),
            sweep_interval: Duration::from_secs(sweep_interval),
        })
    }
}
