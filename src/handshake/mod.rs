//! # Handshake Module
//!
//! Parses and verifies the signed, timestamped payload a trusted proxy
//! substitutes for a player's raw network origin, recovering the player's
//! true identity behind the proxy hop.
//!
//! ## Features
//!
//! - **Signature Verification**: pluggable scheme, HMAC-SHA256 shipped,
//!   constant-time comparison
//! - **Replay Bounding**: issuance timestamps checked against a freshness
//!   window
//! - **Forge Compatibility**: the legacy `\0FML\0` marker is detected and
//!   stripped without affecting the signed bytes
//!
//! ## Usage
//!
//! ```ignore
//! use proxyward::handshake::{HandshakeConfig, PayloadVerifier};
//!
//! let verifier = PayloadVerifier::new(&HandshakeConfig::new(secret));
//! let payload = verifier.verify(raw, now_millis)?;
//! println!("real client: {}", payload.client_socket());
//! ```

mod config;
mod error;
mod payload;
mod signature;
mod verifier;

pub use config::{HandshakeConfig, DEFAULT_MAX_SKEW_MS};
pub use error::{HandshakeError, HandshakeResult};
pub use payload::{HandshakePayload, FIELD_COUNT, FIELD_DELIMITER, FORGE_MARKER};
pub use signature::{HmacSha256Scheme, SignatureScheme};
pub use verifier::PayloadVerifier;
