//! IPv4 CIDR range parsing and matching.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use super::error::CidrError;

/// A parsed IPv4 CIDR range.
///
/// The base address is stored as written; matching masks both sides, so an
/// unmasked entry like `10.1.2.3/16` behaves the same as `10.1.0.0/16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrRange {
    /// Base address in host byte order.
    base: u32,

    /// Prefix length in [0, 32].
    prefix_len: u8,
}

impl CidrRange {
    /// Create a range from an address and prefix length.
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> Result<Self, CidrError> {
        if prefix_len > 32 {
            return Err(CidrError::PrefixOutOfRange {
                prefix_len: u32::from(prefix_len),
                input: format!("{base}/{prefix_len}"),
            });
        }

        Ok(Self {
            base: u32::from(base),
            prefix_len,
        })
    }

    /// The base address as written.
    #[must_use]
    pub fn base(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.base)
    }

    /// The prefix length.
    #[must_use]
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The network mask for this range.
    fn mask(&self) -> u32 {
        if self.prefix_len == 0 {
            0
        } else {
            !0u32 << (32 - self.prefix_len)
        }
    }

    /// Check whether an address falls inside this range.
    ///
    /// A `/0` range matches every address; `/32` requires exact equality.
    #[must_use]
    pub fn matches(&self, addr: Ipv4Addr) -> bool {
        let mask = self.mask();
        (u32::from(addr) & mask) == (self.base & mask)
    }
}

impl FromStr for CidrRange {
    type Err = CidrError;

    /// Parse `a.b.c.d/n` or a bare `a.b.c.d` (treated as `/32`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip_str, prefix_len) = if let Some((ip, prefix)) = s.split_once('/') {
            let prefix_len: u32 = prefix.parse().map_err(|_| CidrError::InvalidPrefix {
                prefix: prefix.to_string(),
                input: s.to_string(),
            })?;

            if prefix_len > 32 {
                return Err(CidrError::PrefixOutOfRange {
                    prefix_len,
                    input: s.to_string(),
                });
            }

            (ip, prefix_len as u8)
        } else {
            (s, 32)
        };

        Ok(Self {
            base: parse_octets(ip_str, s)?,
            prefix_len,
        })
    }
}

impl fmt::Display for CidrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base(), self.prefix_len)
    }
}

/// Parse a dotted-quad address into a host-order u32.
fn parse_octets(ip: &str, input: &str) -> Result<u32, CidrError> {
    let parts: Vec<&str> = ip.split('.').collect();

    if parts.len() != 4 {
        return Err(CidrError::OctetCount {
            found: parts.len(),
            input: input.to_string(),
        });
    }

    let mut addr = 0u32;
    for (i, part) in parts.iter().enumerate() {
        let octet: u8 = part.parse().map_err(|_| CidrError::InvalidOctet {
            octet: (*part).to_string(),
            input: input.to_string(),
        })?;
        addr |= u32::from(octet) << (24 - i * 8);
    }

    Ok(addr)
}
