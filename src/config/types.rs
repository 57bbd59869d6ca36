//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::fetcher::FetcherConfig;
use crate::handshake::HandshakeConfig;
use crate::whitelist::WhitelistConfig;

/// Root configuration for the address-trust guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Reject connections from peers outside the proxy whitelist.
    ///
    /// When disabled, untrusted peers are let through on a degraded path
    /// that never adopts a payload-claimed identity.
    #[serde(default = "default_require_proxy")]
    pub require_proxy: bool,

    /// Whitelist store configuration.
    pub whitelist: WhitelistConfig,

    /// Remote list fetcher configuration.
    pub fetcher: FetcherConfig,

    /// Handshake verification configuration.
    pub handshake: HandshakeConfig,
}

fn default_require_proxy() -> bool {
    true
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            require_proxy: true,
            whitelist: WhitelistConfig::default(),
            fetcher: FetcherConfig::default(),
            handshake: HandshakeConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the whitelist section.
    #[must_use]
    pub fn with_whitelist(mut self, whitelist: WhitelistConfig) -> Self {
        self.whitelist = whitelist;
        self
    }

    /// Set the fetcher section.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: FetcherConfig) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Set the handshake section.
    #[must_use]
    pub fn with_handshake(mut self, handshake: HandshakeConfig) -> Self {
        self.handshake = handshake;
        self
    }

    /// Allow connections from peers outside the whitelist.
    #[must_use]
    pub fn with_passthrough(mut self) -> Self {
        self.require_proxy = false;
        self
    }

    /// Validate the configuration as a whole.
    pub fn validate(&self) -> Result<(), String> {
        self.whitelist.validate()?;
        self.fetcher.validate()?;
        self.handshake.validate()?;

        // The fetched list must land in a file the store actually reads.
        if !self.whitelist.files.contains(&self.fetcher.target_file) {
            return Err(format!(
                "fetcher.target_file '{}' is not one of whitelist.files",
                self.fetcher.target_file.display()
            ));
        }

        Ok(())
    }
}
