//! # Proxyward
//!
//! Address-trust core for game servers fronted by a reverse-proxy fleet.
//! Proxyward decides, for every inbound connection, whether the declared
//! origin is trustworthy: the peer must be inside a fresh whitelist of
//! proxy IP ranges, and the identity it carries must arrive as a signed,
//! timestamped handshake payload.
//!
//! ## Features
//!
//! - IPv4 CIDR matching against hot-swappable whitelist generations
//! - Remote list refresh with all-or-nothing validation and atomic
//!   persistence
//! - Signed payload verification (pluggable scheme, HMAC-SHA256 shipped)
//!   with a bounded replay window
//! - Lock-free trust queries safe under concurrent reload
//!
//! ## Architecture
//!
//! The host server owns scheduling and the network listener; Proxyward is
//! called through two seams: [`fetcher::IpListUpdater::fetch_and_apply`]
//! on a timer, and [`guard::ProxyGuard::evaluate_now`] once per inbound
//! connection.

pub mod config;
pub mod fetcher;
pub mod guard;
pub mod handshake;
pub mod whitelist;

pub use config::{ConfigLoader, GuardConfig};
pub use guard::{ConnectionDecision, ProxyGuard};
pub use handshake::{HandshakePayload, PayloadVerifier};
pub use whitelist::WhitelistStore;
