//! Configuration for the remote list fetcher.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the remote list fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Endpoint serving the authoritative proxy-IP list, one CIDR per
    /// line.
    pub endpoint: String,

    /// Request timeout in milliseconds; a fetch that exceeds it fails
    /// without touching the on-disk list.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Backing file the validated list is written to. Must be one of the
    /// whitelist store's configured files.
    #[serde(default = "default_target_file")]
    pub target_file: PathBuf,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_target_file() -> PathBuf {
    PathBuf::from("whitelist/ranges.list")
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            target_file: default_target_file(),
        }
    }
}

impl FetcherConfig {
    /// Create a config for the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            target_file: default_target_file(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the backing file the list is written to.
    #[must_use]
    pub fn with_target_file(mut self, target_file: impl Into<PathBuf>) -> Self {
        self.target_file = target_file.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.endpoint.starts_with("https://") && !self.endpoint.starts_with("http://") {
            return Err(format!(
                "fetcher.endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            ));
        }

        if self.timeout_ms == 0 {
            return Err("fetcher.timeout_ms must be greater than zero".to_string());
        }

        if self.target_file.as_os_str().is_empty() {
            return Err("fetcher.target_file cannot be empty".to_string());
        }

        Ok(())
    }
}
