//! Handshake verification error types.

use thiserror::Error;

/// Result type for handshake verification.
pub type HandshakeResult<T> = Result<T, HandshakeError>;

/// Errors that can occur while verifying a proxy handshake payload.
///
/// Any of these is an authoritative "untrusted" decision for the
/// connection; the claimed identity must not be adopted.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The payload did not have the expected number of fields.
    #[error("expected {expected} payload fields, found {found}")]
    FieldCount {
        /// Expected field count.
        expected: usize,
        /// Fields actually found.
        found: usize,
    },

    /// The timestamp field was not a decimal integer.
    #[error("timestamp field '{field}' is not a decimal integer")]
    MalformedTimestamp {
        /// The offending field.
        field: String,
    },

    /// The signature field was not valid base64.
    #[error("signature field is not valid base64: {0}")]
    MalformedSignature(#[source] base64::DecodeError),

    /// The client address field was not an `ip:port` pair.
    #[error("client address field '{field}' is not an ip:port pair")]
    MalformedAddress {
        /// The offending field.
        field: String,
    },

    /// The signature did not match the payload contents.
    ///
    /// Treated as a security event, not a soft parse failure.
    #[error("payload signature mismatch")]
    Forged,

    /// The payload was issued outside the accepted freshness window.
    #[error("payload issued {age_millis}ms outside the accepted window")]
    Expired {
        /// Distance between issuance and verification time.
        age_millis: u64,
    },
}

impl HandshakeError {
    /// Check if this is a malformed-payload error.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::FieldCount { .. }
                | Self::MalformedTimestamp { .. }
                | Self::MalformedSignature(_)
                | Self::MalformedAddress { .. }
        )
    }

    /// Check if this error indicates a forged or replayed payload.
    ///
    /// These warrant a security-event log entry rather than a parse
    /// diagnostic.
    #[must_use]
    pub fn is_security_event(&self) -> bool {
        matches!(self, Self::Forged | Self::Expired { .. })
    }
}
