//! Wire format of the signed handshake payload.

use std::net::{Ipv4Addr, SocketAddrV4};

use super::error::HandshakeError;

/// Delimiter between payload fields. Multi-character so it cannot legally
/// appear inside any field.
pub const FIELD_DELIMITER: &str = "///";

/// Legacy Forge compatibility marker a modded client appends to the
/// hostname it sends.
pub const FORGE_MARKER: &str = "\0FML\0";

/// Number of delimiter-separated fields in a payload.
pub const FIELD_COUNT: usize = 4;

/// The verified identity a trusted proxy carries in place of the player's
/// raw network origin.
///
/// Ephemeral, one per connection attempt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakePayload {
    /// Hostname the client originally connected to, with any Forge marker
    /// stripped.
    pub hostname: String,

    /// The player's real address as seen by the proxy.
    pub client_addr: Ipv4Addr,

    /// The player's real source port.
    pub client_port: u16,

    /// Payload issuance time, milliseconds since the Unix epoch.
    pub issued_at_millis: i64,

    /// Whether the client requested Forge compatibility mode.
    pub forge_client: bool,
}

impl HandshakePayload {
    /// The player's real socket address.
    #[must_use]
    pub fn client_socket(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.client_addr, self.client_port)
    }
}

/// A payload split into its raw fields, before any verification.
///
/// Field slices point into the input exactly as received; `message` is the
/// byte range the proxy signed.
#[derive(Debug)]
pub(super) struct RawFrame<'a> {
    /// Hostname field as received, Forge marker included if present.
    pub hostname: &'a str,

    /// The `ip:port` field.
    pub addr: &'a str,

    /// The decimal timestamp field.
    pub timestamp: &'a str,

    /// The encoded signature field.
    pub signature: &'a str,

    /// Everything before the final delimiter; the signature is computed
    /// over these bytes exactly as received.
    pub message: &'a str,

    /// Whether a Forge marker was found on the hostname field or trailing
    /// the whole payload.
    pub forge_marker: bool,
}

impl<'a> RawFrame<'a> {
    /// Split a raw payload into fields.
    ///
    /// A Forge client may append the marker after the signature; that
    /// trailing copy sits outside the signed bytes and is stripped before
    /// splitting. A marker inside the hostname field was signed by the
    /// proxy as-is and stays part of `message`.
    pub fn parse(raw: &'a str) -> Result<Self, HandshakeError> {
        let (raw, trailing_marker) = match raw.strip_suffix(FORGE_MARKER) {
            Some(stripped) => (stripped, true),
            None => (raw, false),
        };

        let fields: Vec<&str> = raw.split(FIELD_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(HandshakeError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        let signature = fields[FIELD_COUNT - 1];
        let message = &raw[..raw.len() - signature.len() - FIELD_DELIMITER.len()];
        let hostname = fields[0];

        Ok(Self {
            hostname,
            addr: fields[1],
            timestamp: fields[2],
            signature,
            message,
            forge_marker: trailing_marker || hostname.ends_with(FORGE_MARKER),
        })
    }

    /// The hostname with any Forge marker stripped.
    pub fn normalized_hostname(&self) -> &'a str {
        self.hostname.strip_suffix(FORGE_MARKER).unwrap_or(self.hostname)
    }
}
