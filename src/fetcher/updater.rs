//! Fetches the authoritative proxy-IP list and applies it.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::config::FetcherConfig;
use super::error::{FetchError, FetchResult};
use crate::whitelist::{CidrRange, WhitelistStore};

/// Summary of a successfully applied fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Number of validated entries written and loaded.
    pub entries: usize,
}

/// Periodically invoked updater that refreshes the whitelist store's
/// backing file from the remote endpoint.
///
/// The schedule is owned by the caller; every failure is recoverable and
/// leaves both the on-disk list and the active generation untouched.
#[derive(Debug)]
pub struct IpListUpdater {
    config: FetcherConfig,
    client: reqwest::Client,
    store: Arc<WhitelistStore>,
}

impl IpListUpdater {
    /// Create an updater feeding the given store.
    pub fn new(config: FetcherConfig, store: Arc<WhitelistStore>) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            config,
            client,
            store,
        })
    }

    /// Fetch the remote list, validate it, persist it and reload the
    /// store.
    ///
    /// The response is accepted as a unit: any malformed entry, a non-200
    /// status or an empty validated result rejects the whole fetch.
    pub async fn fetch_and_apply(&self) -> FetchResult<Applied> {
        let body = self.fetch().await.map_err(|e| {
            warn!("proxy-IP list fetch from {} failed: {e}", self.config.endpoint);
            e
        })?;

        let entries = validate_body(&body).map_err(|e| {
            warn!("proxy-IP list from {} rejected: {e}", self.config.endpoint);
            e
        })?;

        self.persist(&entries)?;

        let loaded = self.store.reload().map_err(FetchError::Reload)?;
        info!(
            "applied proxy-IP list from {}: {} entries fetched, {loaded} ranges active",
            self.config.endpoint,
            entries.len()
        );

        Ok(Applied {
            entries: entries.len(),
        })
    }

    /// Issue the GET and return the body of a 200 response.
    async fn fetch(&self) -> FetchResult<String> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::RemoteUnavailable {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(map_transport_error)
    }

    /// Write the validated entries to the backing file atomically.
    ///
    /// The list is written to a sibling temp file and renamed over the
    /// target, so a crash mid-write can never leave a truncated file for
    /// the next reload to pick up.
    fn persist(&self, entries: &[String]) -> FetchResult<()> {
        let path = &self.config.target_file;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| FetchError::Persist {
                    path: parent.to_path_buf(),
                    source,
                })?;
                info!("created whitelist directory {}", parent.display());
            }
        }

        if !path.exists() {
            info!("materializing proxy-IP list file {}", path.display());
        }

        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, entries.join("\n")).map_err(|source| FetchError::Persist {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| FetchError::Persist {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Map a reqwest transport failure onto the fetch error taxonomy.
fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e)
    }
}

/// Validate a response body line by line.
///
/// Returns the trimmed non-empty lines, each checked to be a well-formed
/// CIDR. The first malformed line rejects the whole body; an all-empty
/// result is rejected as well.
pub fn validate_body(body: &str) -> FetchResult<Vec<String>> {
    let mut entries = Vec::new();

    for line in body.lines() {
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }

        entry
            .parse::<CidrRange>()
            .map_err(|source| FetchError::MalformedEntry {
                entry: entry.to_string(),
                source,
            })?;
        entries.push(entry.to_string());
    }

    if entries.is_empty() {
        return Err(FetchError::EmptyResponse);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whitelist::WhitelistConfig;
    use std::net::Ipv4Addr;

    #[test]
    fn test_validate_body_accepts_valid_lines() {
        let entries = validate_body("10.0.0.0/8\n\n192.0.2.7\r\n198.51.100.0/24\n").unwrap();
        assert_eq!(entries, vec!["10.0.0.0/8", "192.0.2.7", "198.51.100.0/24"]);
    }

    #[test]
    fn test_validate_body_rejects_malformed_line() {
        let err = validate_body("10.0.0.0/8\nnot-a-cidr\n192.0.2.0/24\n").unwrap_err();
        assert!(matches!(
            err,
            FetchError::MalformedEntry { ref entry, .. } if entry == "not-a-cidr"
        ));
    }

    #[test]
    fn test_validate_body_rejects_empty() {
        assert!(matches!(validate_body(""), Err(FetchError::EmptyResponse)));
        assert!(matches!(
            validate_body("\n  \n\n"),
            Err(FetchError::EmptyResponse)
        ));
    }

    #[test]
    fn test_persist_creates_directory_and_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("whitelist").join("ranges.list");

        let store = Arc::new(WhitelistStore::new(&WhitelistConfig::new(&target)));
        let config = FetcherConfig::new("https://ranges.example.net/v4/")
            .with_target_file(&target);
        let updater = IpListUpdater::new(config, Arc::clone(&store)).unwrap();

        updater.persist(&["10.0.0.0/8".to_string()]).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "10.0.0.0/8");

        updater
            .persist(&["172.16.0.0/12".to_string(), "192.0.2.7".to_string()])
            .unwrap();
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "172.16.0.0/12\n192.0.2.7"
        );

        // No temp file left behind.
        let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("ranges.list")]);

        store.reload().unwrap();
        assert!(store.is_trusted(Ipv4Addr::new(172, 20, 0, 1)));
    }
}
