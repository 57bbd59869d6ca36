//! Configuration for handshake verification.

use serde::{Deserialize, Serialize};

/// Default freshness window for payload timestamps, in milliseconds.
pub const DEFAULT_MAX_SKEW_MS: u64 = 10_000;

/// Configuration for the payload verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeConfig {
    /// Shared secret the proxy fleet signs payloads with.
    pub secret: String,

    /// Maximum tolerated distance between payload issuance and
    /// verification time, in milliseconds. Bounds the replay window for a
    /// captured valid payload.
    #[serde(default = "default_max_skew_ms")]
    pub max_skew_ms: u64,
}

fn default_max_skew_ms() -> u64 {
    DEFAULT_MAX_SKEW_MS
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            max_skew_ms: DEFAULT_MAX_SKEW_MS,
        }
    }
}

impl HandshakeConfig {
    /// Create a config with the given shared secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            max_skew_ms: DEFAULT_MAX_SKEW_MS,
        }
    }

    /// Set the freshness window.
    #[must_use]
    pub fn with_max_skew_ms(mut self, max_skew_ms: u64) -> Self {
        self.max_skew_ms = max_skew_ms;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.is_empty() {
            return Err("handshake.secret cannot be empty".to_string());
        }

        if self.max_skew_ms == 0 {
            return Err("handshake.max_skew_ms must be greater than zero".to_string());
        }

        Ok(())
    }
}
