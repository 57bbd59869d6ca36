//! # Whitelist Module
//!
//! Maintains the set of IP ranges belonging to the trusted reverse-proxy
//! fleet and answers "is this peer a trusted proxy" on the
//! connection-acceptance path.
//!
//! ## Features
//!
//! - **CIDR Matching**: IPv4 `address/prefix` ranges, bare addresses as `/32`
//! - **Generational Snapshots**: reloads build a complete new generation and
//!   swap it in atomically; readers never see a partially-loaded set
//! - **Defense in Depth**: a single malformed line rejects the whole reload
//!   and the previous generation keeps serving
//!
//! ## Usage
//!
//! ```ignore
//! use proxyward::whitelist::{WhitelistConfig, WhitelistStore};
//!
//! let store = WhitelistStore::new(&WhitelistConfig::new("whitelist/ranges.list"));
//! store.reload()?;
//!
//! if store.is_trusted(peer_addr) {
//!     // proceed to handshake verification
//! }
//! ```

mod cidr;
mod config;
mod error;
mod store;

pub use cidr::CidrRange;
pub use config::WhitelistConfig;
pub use error::{CidrError, WhitelistError, WhitelistResult};
pub use store::{Generation, WhitelistStore};
