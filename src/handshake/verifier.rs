//! Signed payload verification.

use std::fmt;
use std::net::Ipv4Addr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, warn};

use super::config::HandshakeConfig;
use super::error::HandshakeError;
use super::payload::{HandshakePayload, RawFrame};
use super::signature::{HmacSha256Scheme, SignatureScheme};

/// Verifies the signed handshake payload a trusted proxy injects in place
/// of the player's raw network address.
///
/// Stateless apart from the key material; safe to call concurrently.
pub struct PayloadVerifier {
    scheme: Box<dyn SignatureScheme>,
    max_skew_ms: u64,
}

impl PayloadVerifier {
    /// Create a verifier with the shipped HMAC-SHA256 scheme.
    #[must_use]
    pub fn new(config: &HandshakeConfig) -> Self {
        Self {
            scheme: Box::new(HmacSha256Scheme::new(config.secret.as_bytes().to_vec())),
            max_skew_ms: config.max_skew_ms,
        }
    }

    /// Create a verifier with a custom signature scheme.
    #[must_use]
    pub fn with_scheme(scheme: Box<dyn SignatureScheme>, max_skew_ms: u64) -> Self {
        Self {
            scheme,
            max_skew_ms,
        }
    }

    /// Verify a raw payload at the given wall-clock time.
    ///
    /// `now_millis` is milliseconds since the Unix epoch. On success the
    /// returned payload carries the normalized hostname and the
    /// skew-checked issuance time.
    pub fn verify(&self, raw: &str, now_millis: i64) -> Result<HandshakePayload, HandshakeError> {
        let frame = RawFrame::parse(raw)?;

        // The wire field carries epoch seconds; the freshness window is
        // evaluated in milliseconds.
        let issued_at_millis = frame
            .timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .ok_or_else(|| HandshakeError::MalformedTimestamp {
                field: frame.timestamp.to_string(),
            })?;

        let signature =
            BASE64.decode(frame.signature).map_err(HandshakeError::MalformedSignature)?;

        // Verified over the bytes exactly as received; a Forge marker in
        // the hostname field was signed by the proxy and stays in place.
        if !self.scheme.verify(frame.message.as_bytes(), &signature) {
            warn!(
                "handshake payload signature mismatch for '{}', rejecting",
                frame.normalized_hostname()
            );
            return Err(HandshakeError::Forged);
        }

        let age_millis = now_millis.abs_diff(issued_at_millis);
        if age_millis > self.max_skew_ms {
            warn!("handshake payload outside freshness window by {age_millis}ms, rejecting");
            return Err(HandshakeError::Expired { age_millis });
        }

        let (client_addr, client_port) = parse_client_addr(frame.addr)?;

        debug!(
            "verified handshake payload for '{}' from {client_addr}:{client_port}",
            frame.normalized_hostname()
        );

        Ok(HandshakePayload {
            hostname: frame.normalized_hostname().to_string(),
            client_addr,
            client_port,
            issued_at_millis,
            forge_client: frame.forge_marker,
        })
    }
}

impl fmt::Debug for PayloadVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadVerifier")
            .field("max_skew_ms", &self.max_skew_ms)
            .finish_non_exhaustive()
    }
}

/// Parse the `ip:port` field into its parts.
fn parse_client_addr(field: &str) -> Result<(Ipv4Addr, u16), HandshakeError> {
    let malformed = || HandshakeError::MalformedAddress {
        field: field.to_string(),
    };

    let (ip, port) = field.rsplit_once(':').ok_or_else(malformed)?;
    let addr: Ipv4Addr = ip.parse().map_err(|_| malformed())?;
    let port: u16 = port.parse().map_err(|_| malformed())?;

    Ok((addr, port))
}
