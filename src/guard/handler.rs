//! Connection-path guard handler.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::config::GuardConfig;
use crate::handshake::{HandshakeError, HandshakePayload, PayloadVerifier};
use crate::whitelist::WhitelistStore;

/// Statistics for the guard handler.
#[derive(Debug, Default)]
pub struct GuardStats {
    /// Total connections evaluated.
    pub connections_checked: AtomicU64,
    /// Connections accepted with a verified identity.
    pub connections_trusted: AtomicU64,
    /// Connections from peers outside the whitelist.
    pub untrusted_peers: AtomicU64,
    /// Untrusted peers let through on the degraded path.
    pub passthrough_connections: AtomicU64,
    /// Trusted peers whose payload failed verification.
    pub rejected_payloads: AtomicU64,
}

impl GuardStats {
    /// Create new stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision.
    fn record(&self, decision: &ConnectionDecision) {
        self.connections_checked.fetch_add(1, Ordering::Relaxed);
        match decision {
            ConnectionDecision::Trusted(_) => {
                self.connections_trusted.fetch_add(1, Ordering::Relaxed);
            },
            ConnectionDecision::UntrustedPeer => {
                self.untrusted_peers.fetch_add(1, Ordering::Relaxed);
            },
            ConnectionDecision::Passthrough => {
                self.untrusted_peers.fetch_add(1, Ordering::Relaxed);
                self.passthrough_connections.fetch_add(1, Ordering::Relaxed);
            },
            ConnectionDecision::Rejected(_) => {
                self.rejected_payloads.fetch_add(1, Ordering::Relaxed);
            },
        }
    }
}

/// Outcome of evaluating one inbound connection.
#[derive(Debug)]
pub enum ConnectionDecision {
    /// The peer is a trusted proxy and the payload verified; the carried
    /// identity is authoritative.
    Trusted(HandshakePayload),

    /// The peer is not in the proxy whitelist; reject the connection.
    UntrustedPeer,

    /// The peer is not in the whitelist but passthrough mode is enabled;
    /// serve it without any payload-claimed identity.
    Passthrough,

    /// The peer is a trusted proxy but its payload failed verification;
    /// reject the connection.
    Rejected(HandshakeError),
}

impl ConnectionDecision {
    /// Whether the connection may proceed at all.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Trusted(_) | Self::Passthrough)
    }

    /// The verified identity, if there is one.
    #[must_use]
    pub fn payload(&self) -> Option<&HandshakePayload> {
        match self {
            Self::Trusted(payload) => Some(payload),
            _ => None,
        }
    }
}

/// The address-trust guard on the connection-acceptance path.
///
/// One instance owns the whitelist store and the payload verifier for the
/// process: initialized at startup, refreshed on the fetch schedule, torn
/// down at shutdown. Safe to share across connection workers.
#[derive(Debug)]
pub struct ProxyGuard {
    store: Arc<WhitelistStore>,
    verifier: PayloadVerifier,
    require_proxy: bool,
    stats: GuardStats,
}

impl ProxyGuard {
    /// Create a guard from configuration.
    ///
    /// The whitelist starts empty; call [`ProxyGuard::reload_whitelist`]
    /// (or run the fetcher) to populate it.
    #[must_use]
    pub fn new(config: &GuardConfig) -> Self {
        Self::with_store(config, Arc::new(WhitelistStore::new(&config.whitelist)))
    }

    /// Create a guard around an existing store.
    #[must_use]
    pub fn with_store(config: &GuardConfig, store: Arc<WhitelistStore>) -> Self {
        Self {
            store,
            verifier: PayloadVerifier::new(&config.handshake),
            require_proxy: config.require_proxy,
            stats: GuardStats::new(),
        }
    }

    /// The shared whitelist store, for wiring up the fetcher.
    #[must_use]
    pub fn store(&self) -> Arc<WhitelistStore> {
        Arc::clone(&self.store)
    }

    /// Reload the whitelist from its backing files.
    pub fn reload_whitelist(&self) -> crate::whitelist::WhitelistResult<usize> {
        self.store.reload()
    }

    /// Evaluate one inbound connection at the given wall-clock time.
    ///
    /// `peer` is the raw transport-level source address; `raw_handshake`
    /// is the in-band metadata frame it delivered.
    pub fn evaluate(
        &self,
        peer: Ipv4Addr,
        raw_handshake: &str,
        now_millis: i64,
    ) -> ConnectionDecision {
        let decision = self.evaluate_inner(peer, raw_handshake, now_millis);
        self.stats.record(&decision);
        decision
    }

    /// Evaluate one inbound connection at the current wall-clock time.
    pub fn evaluate_now(&self, peer: Ipv4Addr, raw_handshake: &str) -> ConnectionDecision {
        self.evaluate(peer, raw_handshake, unix_millis())
    }

    fn evaluate_inner(
        &self,
        peer: Ipv4Addr,
        raw_handshake: &str,
        now_millis: i64,
    ) -> ConnectionDecision {
        if !self.store.is_trusted(peer) {
            if self.require_proxy {
                warn!("rejecting connection from unproxied peer {peer}");
                return ConnectionDecision::UntrustedPeer;
            }
            debug!("passing through connection from unproxied peer {peer}");
            return ConnectionDecision::Passthrough;
        }

        match self.verifier.verify(raw_handshake, now_millis) {
            Ok(payload) => ConnectionDecision::Trusted(payload),
            Err(e) => {
                if e.is_security_event() {
                    warn!("rejecting payload from trusted proxy {peer}: {e}");
                } else {
                    debug!("rejecting malformed payload from trusted proxy {peer}: {e}");
                }
                ConnectionDecision::Rejected(e)
            },
        }
    }

    /// Handler statistics.
    #[must_use]
    pub fn stats(&self) -> &GuardStats {
        &self.stats
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as i64
}
