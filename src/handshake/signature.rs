//! Message-authentication schemes for handshake payloads.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// A message-authentication scheme the proxy fleet signs payloads with.
///
/// The wire format does not pin an algorithm; a deployment selects the
/// scheme matching its proxy fleet and validates it against known-good
/// sample payloads.
pub trait SignatureScheme: Send + Sync {
    /// Compute the signature over a message.
    fn sign(&self, message: &[u8]) -> Vec<u8>;

    /// Verify a signature against a message in constant time.
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;
}

/// HMAC-SHA256 over the raw message bytes, keyed with the shared secret.
pub struct HmacSha256Scheme {
    secret: Vec<u8>,
}

impl HmacSha256Scheme {
    /// Create a scheme keyed with the given secret.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length")
    }
}

impl SignatureScheme for HmacSha256Scheme {
    fn sign(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let mut mac = self.mac();
        mac.update(message);
        // verify_slice is a constant-time comparison.
        mac.verify_slice(signature).is_ok()
    }
}
