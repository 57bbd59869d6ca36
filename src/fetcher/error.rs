//! Remote list fetcher error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::whitelist::{CidrError, WhitelistError};

/// Result type for fetcher operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while fetching and applying the remote proxy-IP
/// list.
///
/// All of these are recoverable: the previous on-disk list and the active
/// whitelist generation are left untouched, and the schedule simply
/// retries at the next interval.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint answered with a non-200 status.
    #[error("list endpoint returned status {status}")]
    RemoteUnavailable {
        /// The HTTP status received.
        status: u16,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to list endpoint timed out")]
    Timeout,

    /// Any other transport-level failure.
    #[error("network error talking to list endpoint: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body contained an entry that is not a valid CIDR.
    ///
    /// A partially-trustworthy response is never partially applied.
    #[error("remote list contains malformed entry '{entry}': {source}")]
    MalformedEntry {
        /// The offending line, trimmed.
        entry: String,
        /// The parse failure.
        #[source]
        source: CidrError,
    },

    /// The response contained no entries after validation.
    ///
    /// An authoritative list is never silently replaced by "trust
    /// nothing".
    #[error("list endpoint returned an empty list")]
    EmptyResponse,

    /// The validated list could not be written to the backing file.
    #[error("failed to persist fetched list to {}: {source}", path.display())]
    Persist {
        /// The file or directory that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The whitelist reload after a successful persist failed.
    #[error("whitelist reload after fetch failed: {0}")]
    Reload(#[source] WhitelistError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
