//! # Configuration System
//!
//! TOML-based configuration for the address-trust guard: parsing,
//! validation and (re)serialization.
//!
//! ## Example Configuration
//!
//! ```toml
//! require_proxy = true
//!
//! [whitelist]
//! files = ["whitelist/ranges.list"]
//!
//! [fetcher]
//! endpoint = "https://ranges.example.net/v4/"
//! timeout_ms = 10000
//! target_file = "whitelist/ranges.list"
//!
//! [handshake]
//! secret = "change-me"
//! max_skew_ms = 10000
//! ```

mod error;
mod loader;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use types::GuardConfig;
