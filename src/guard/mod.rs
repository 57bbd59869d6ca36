//! # Guard Module
//!
//! The connection-acceptance entry point: one explicitly-owned instance
//! ties the whitelist store and the payload verifier together and turns a
//! peer address plus handshake frame into a single trust decision.
//!
//! ## Usage
//!
//! ```ignore
//! use proxyward::guard::{ConnectionDecision, ProxyGuard};
//!
//! let guard = ProxyGuard::new(&config);
//! guard.reload_whitelist()?;
//!
//! match guard.evaluate_now(peer, raw_handshake) {
//!     ConnectionDecision::Trusted(payload) => { /* adopt payload.client_socket() */ },
//!     ConnectionDecision::Passthrough => { /* serve without identity */ },
//!     _ => { /* reject */ },
//! }
//! ```

mod handler;

pub use handler::{ConnectionDecision, GuardStats, ProxyGuard};
