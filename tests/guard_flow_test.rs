//! Integration tests for the address-trust flow: remote fetch, whitelist
//! hot-swap and connection evaluation.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use proxyward::config::GuardConfig;
use proxyward::fetcher::{FetchError, FetcherConfig, IpListUpdater};
use proxyward::guard::{ConnectionDecision, ProxyGuard};
use proxyward::handshake::{HandshakeConfig, HmacSha256Scheme, SignatureScheme};
use proxyward::whitelist::{WhitelistConfig, WhitelistStore};

const SECRET: &str = "integration-secret";
const NOW_MILLIS: i64 = 1_589_573_485_000 + 1_000;

/// Serve one canned HTTP response on a fresh local port, returning the
/// endpoint URL.
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}/v4/")
}

fn signed_payload(hostname: &str) -> String {
    let message = format!("{hostname}///79.227.33.179:53462///1589573485");
    let scheme = HmacSha256Scheme::new(SECRET.as_bytes().to_vec());
    let signature = BASE64.encode(scheme.sign(message.as_bytes()));
    format!("{message}///{signature}")
}

fn config_for(target: &Path, endpoint: &str) -> GuardConfig {
    GuardConfig::new()
        .with_whitelist(WhitelistConfig::new(target))
        .with_fetcher(FetcherConfig::new(endpoint).with_target_file(target))
        .with_handshake(HandshakeConfig::new(SECRET).with_max_skew_ms(5_000))
}

#[tokio::test]
async fn fetch_applies_list_and_guard_trusts_proxy() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("ranges.list");
    let endpoint = serve_once("200 OK", "51.161.19.224/27\n\n167.114.0.0/17\n").await;

    let config = config_for(&target, &endpoint);
    config.validate().unwrap();

    let guard = ProxyGuard::new(&config);
    let updater = IpListUpdater::new(config.fetcher.clone(), guard.store()).unwrap();

    // Before the first fetch nothing is trusted.
    assert!(matches!(
        guard.evaluate(Ipv4Addr::new(51, 161, 19, 224), "irrelevant", NOW_MILLIS),
        ConnectionDecision::UntrustedPeer
    ));

    let applied = updater.fetch_and_apply().await.unwrap();
    assert_eq!(applied.entries, 2);
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "51.161.19.224/27\n167.114.0.0/17"
    );

    // A trusted proxy with a valid payload yields the real identity.
    let decision = guard.evaluate(
        Ipv4Addr::new(51, 161, 19, 230),
        &signed_payload("example.org"),
        NOW_MILLIS,
    );
    let payload = decision.payload().expect("decision should carry a payload");
    assert_eq!(payload.hostname, "example.org");
    assert_eq!(payload.client_addr, Ipv4Addr::new(79, 227, 33, 179));
    assert_eq!(payload.client_port, 53462);

    // An address outside the fetched ranges is still rejected.
    assert!(matches!(
        guard.evaluate(
            Ipv4Addr::new(1, 1, 1, 1),
            &signed_payload("example.org"),
            NOW_MILLIS
        ),
        ConnectionDecision::UntrustedPeer
    ));
}

#[tokio::test]
async fn fetch_404_leaves_state_untouched() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("ranges.list");
    fs::write(&target, "10.0.0.0/8\n").unwrap();

    let endpoint = serve_once("404 Not Found", "gone").await;
    let store = Arc::new(WhitelistStore::new(&WhitelistConfig::new(&target)));
    store.reload().unwrap();

    let updater = IpListUpdater::new(
        FetcherConfig::new(&endpoint).with_target_file(&target),
        Arc::clone(&store),
    )
    .unwrap();

    let err = updater.fetch_and_apply().await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::RemoteUnavailable { status: 404 }
    ));

    assert_eq!(fs::read_to_string(&target).unwrap(), "10.0.0.0/8\n");
    assert!(store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
}

#[tokio::test]
async fn fetch_with_one_malformed_line_is_rejected_whole() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("ranges.list");
    fs::write(&target, "10.0.0.0/8\n").unwrap();

    let endpoint = serve_once("200 OK", "192.0.2.0/24\nnot-a-cidr\n198.51.100.0/24\n").await;
    let store = Arc::new(WhitelistStore::new(&WhitelistConfig::new(&target)));
    store.reload().unwrap();

    let updater = IpListUpdater::new(
        FetcherConfig::new(&endpoint).with_target_file(&target),
        Arc::clone(&store),
    )
    .unwrap();

    let err = updater.fetch_and_apply().await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedEntry { .. }));

    // Neither the valid lines of the poisoned response nor anything else
    // was applied.
    assert_eq!(fs::read_to_string(&target).unwrap(), "10.0.0.0/8\n");
    assert!(store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
    assert!(!store.is_trusted(Ipv4Addr::new(192, 0, 2, 1)));
}

#[tokio::test]
async fn fetch_empty_body_is_rejected() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("ranges.list");
    fs::write(&target, "10.0.0.0/8\n").unwrap();

    let endpoint = serve_once("200 OK", "\n\n").await;
    let store = Arc::new(WhitelistStore::new(&WhitelistConfig::new(&target)));
    store.reload().unwrap();

    let updater = IpListUpdater::new(
        FetcherConfig::new(&endpoint).with_target_file(&target),
        Arc::clone(&store),
    )
    .unwrap();

    let err = updater.fetch_and_apply().await.unwrap_err();
    assert!(matches!(err, FetchError::EmptyResponse));
    assert!(store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
}

#[tokio::test]
async fn fetch_timeout_is_reported_and_state_unchanged() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("ranges.list");
    fs::write(&target, "10.0.0.0/8\n").unwrap();

    // Accept the connection but never answer.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        }
    });

    let store = Arc::new(WhitelistStore::new(&WhitelistConfig::new(&target)));
    store.reload().unwrap();

    let updater = IpListUpdater::new(
        FetcherConfig::new(format!("http://{addr}/v4/"))
            .with_timeout_ms(200)
            .with_target_file(&target),
        Arc::clone(&store),
    )
    .unwrap();

    let err = updater.fetch_and_apply().await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout));
    assert!(store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
}

/// Write a whitelist file atomically the way the fetcher does, so a
/// concurrent reload sees either the old or the new content.
fn write_atomic(path: &Path, content: &str) {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content).unwrap();
    fs::rename(&tmp, path).unwrap();
}

#[test]
fn concurrent_reload_never_exposes_a_mixed_generation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ranges.list");

    // Two disjoint file states; a snapshot must match exactly one.
    const GEN_A: &str = "10.0.0.0/8\n";
    const GEN_B: &str = "172.16.0.0/12\n";
    let in_a = Ipv4Addr::new(10, 1, 2, 3);
    let in_b = Ipv4Addr::new(172, 20, 1, 1);

    write_atomic(&path, GEN_A);
    let store = Arc::new(WhitelistStore::new(&WhitelistConfig::new(&path)));
    store.reload().unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let mut readers = Vec::new();

    for _ in 0..4 {
        let store = Arc::clone(&store);
        let stop = Arc::clone(&stop);
        readers.push(std::thread::spawn(move || {
            let mut checks = 0u64;
            while !stop.load(Ordering::Relaxed) {
                let snapshot = store.current();
                let a = snapshot.contains(in_a);
                let b = snapshot.contains(in_b);
                assert!(
                    a ^ b,
                    "observed a mixed or empty generation (a={a}, b={b})"
                );
                checks += 1;
            }
            checks
        }));
    }

    for i in 0..200 {
        write_atomic(&path, if i % 2 == 0 { GEN_B } else { GEN_A });
        store.reload().unwrap();
    }

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        let checks = reader.join().unwrap();
        assert!(checks > 0, "reader made no progress");
    }
}

#[tokio::test]
async fn repeated_fetch_replaces_list_wholesale() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("ranges.list");

    let store = Arc::new(WhitelistStore::new(&WhitelistConfig::new(&target)));

    let first = serve_once("200 OK", "10.0.0.0/8\n").await;
    let updater = IpListUpdater::new(
        FetcherConfig::new(&first).with_target_file(&target),
        Arc::clone(&store),
    )
    .unwrap();
    updater.fetch_and_apply().await.unwrap();
    assert!(store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));

    // A later fetch overwrites the file wholesale, not append.
    let second = serve_once("200 OK", "172.16.0.0/12\n").await;
    let updater = IpListUpdater::new(
        FetcherConfig::new(&second).with_target_file(&target),
        Arc::clone(&store),
    )
    .unwrap();
    updater.fetch_and_apply().await.unwrap();

    assert!(!store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
    assert!(store.is_trusted(Ipv4Addr::new(172, 20, 1, 1)));
    assert_eq!(fs::read_to_string(&target).unwrap(), "172.16.0.0/12");
}
