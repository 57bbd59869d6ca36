//! # Fetcher Module
//!
//! Retrieves the authoritative proxy-IP list from the remote endpoint,
//! validates it, persists it to the whitelist store's backing file and
//! triggers a reload.
//!
//! ## Features
//!
//! - **All-or-Nothing Validation**: every line must parse as a CIDR before
//!   any of the response is applied
//! - **Atomic Persistence**: write-new-then-rename, so a crash mid-write
//!   never leaves a truncated list
//! - **Graceful Degradation**: any failure keeps the last known-good list
//!   serving; the external schedule retries later
//!
//! ## Usage
//!
//! ```ignore
//! use proxyward::fetcher::IpListUpdater;
//!
//! let updater = IpListUpdater::new(config.fetcher.clone(), store)?;
//! // on a timer owned by the host:
//! if let Err(e) = updater.fetch_and_apply().await {
//!     // logged already; retry at the next interval
//! }
//! ```

mod config;
mod error;
mod updater;

pub use config::{FetcherConfig, DEFAULT_TIMEOUT_MS};
pub use error::{FetchError, FetchResult};
pub use updater::{validate_body, Applied, IpListUpdater};
