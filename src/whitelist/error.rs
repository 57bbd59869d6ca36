//! Whitelist error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for whitelist operations.
pub type WhitelistResult<T> = Result<T, WhitelistError>;

/// Errors produced while parsing a single CIDR literal.
///
/// A failed parse must be treated as a poisoned entry, never as a
/// match-everything range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// The address part did not have exactly four octets.
    #[error("expected 4 octets, found {found} in '{input}'")]
    OctetCount {
        /// Number of dot-separated parts found.
        found: usize,
        /// The offending input.
        input: String,
    },

    /// An octet was not an integer in [0, 255].
    #[error("invalid octet '{octet}' in '{input}'")]
    InvalidOctet {
        /// The octet that failed to parse.
        octet: String,
        /// The offending input.
        input: String,
    },

    /// The prefix length was not a non-negative integer.
    #[error("invalid prefix length '{prefix}' in '{input}'")]
    InvalidPrefix {
        /// The prefix that failed to parse.
        prefix: String,
        /// The offending input.
        input: String,
    },

    /// The prefix length was outside [0, 32].
    #[error("prefix length must be 0-32, got {prefix_len} in '{input}'")]
    PrefixOutOfRange {
        /// The out-of-range prefix length.
        prefix_len: u32,
        /// The offending input.
        input: String,
    },
}

/// Errors that can occur while loading a whitelist generation.
#[derive(Debug, Error)]
pub enum WhitelistError {
    /// A backing file could not be read.
    #[error("failed to read whitelist file {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A backing file contained an entry that is not a valid CIDR.
    ///
    /// One malformed entry rejects the whole reload; the previous
    /// generation keeps serving.
    #[error("malformed entry '{entry}' at {}:{line}: {source}", path.display())]
    MalformedEntry {
        /// The offending line, trimmed.
        entry: String,
        /// The file containing it.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The parse failure.
        #[source]
        source: CidrError,
    },

    /// No backing files are configured.
    #[error("no whitelist files configured")]
    NoFiles,
}
