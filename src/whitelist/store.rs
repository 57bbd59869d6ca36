//! Hot-swappable store of trusted proxy address ranges.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, info, warn};

use super::cidr::CidrRange;
use super::config::WhitelistConfig;
use super::error::{WhitelistError, WhitelistResult};

/// One immutable snapshot of the trusted-range set.
///
/// Built once per successful reload and never mutated; superseded
/// generations are dropped when the last in-flight reference goes away.
#[derive(Debug, Default)]
pub struct Generation {
    ranges: Vec<CidrRange>,
}

impl Generation {
    /// Check whether an address falls inside any trusted range.
    #[must_use]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.ranges.iter().any(|range| range.matches(addr))
    }

    /// Number of ranges in this generation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether this generation holds no ranges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// In-memory whitelist of trusted proxy ranges, loaded from backing files.
///
/// `is_trusted` is safe to call concurrently with `reload`: the active
/// generation is replaced with a single atomic pointer swap, so readers
/// always see either the old or the new complete generation, never a mix.
#[derive(Debug)]
pub struct WhitelistStore {
    /// Backing files, read in order on each reload.
    files: Vec<PathBuf>,

    /// The active generation.
    active: ArcSwap<Generation>,
}

impl WhitelistStore {
    /// Create a store with an empty initial generation.
    ///
    /// Call [`WhitelistStore::reload`] to populate it from the backing
    /// files.
    #[must_use]
    pub fn new(config: &WhitelistConfig) -> Self {
        Self {
            files: config.files.clone(),
            active: ArcSwap::new(Arc::new(Generation::default())),
        }
    }

    /// Check whether an address is inside the current trusted set.
    ///
    /// A miss is authoritative at query time; there is no negative cache.
    #[must_use]
    pub fn is_trusted(&self, addr: Ipv4Addr) -> bool {
        self.active.load().contains(addr)
    }

    /// Snapshot the active generation.
    ///
    /// Several queries against one snapshot are guaranteed to see a single
    /// consistent generation even if a reload lands in between.
    #[must_use]
    pub fn current(&self) -> Arc<Generation> {
        self.active.load_full()
    }

    /// Rebuild the trusted set from the backing files and swap it in.
    ///
    /// The new generation is fully constructed before it replaces the old
    /// one. Any malformed entry rejects the whole reload and the previous
    /// generation keeps serving; a partially-parsed set is never adopted.
    ///
    /// Backing files that do not exist yet (e.g. before the first remote
    /// fetch) are skipped with a warning.
    ///
    /// Returns the number of ranges in the new generation.
    pub fn reload(&self) -> WhitelistResult<usize> {
        if self.files.is_empty() {
            return Err(WhitelistError::NoFiles);
        }

        let mut ranges = Vec::new();
        for path in &self.files {
            if !path.exists() {
                warn!("whitelist file {} does not exist yet, skipping", path.display());
                continue;
            }
            Self::read_file(path, &mut ranges)?;
        }

        let generation = Generation { ranges };
        let count = generation.len();
        self.active.store(Arc::new(generation));
        info!("whitelist reloaded, {count} trusted ranges active");

        Ok(count)
    }

    /// Parse one backing file into the generation under construction.
    fn read_file(path: &Path, ranges: &mut Vec<CidrRange>) -> WhitelistResult<()> {
        let content = fs::read_to_string(path).map_err(|source| WhitelistError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        for (i, line) in content.lines().enumerate() {
            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }

            let range: CidrRange = entry.parse().map_err(|source| {
                warn!(
                    "malformed whitelist entry '{entry}' at {}:{}, rejecting reload",
                    path.display(),
                    i + 1
                );
                WhitelistError::MalformedEntry {
                    entry: entry.to_string(),
                    path: path.to_path_buf(),
                    line: i + 1,
                    source,
                }
            })?;
            ranges.push(range);
        }

        debug!("read whitelist file {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn store_for(files: Vec<PathBuf>) -> WhitelistStore {
        WhitelistStore::new(&WhitelistConfig { files })
    }

    #[test]
    fn test_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_for(vec![dir.path().join("missing.list")]);
        assert!(!store.is_trusted(Ipv4Addr::new(1, 2, 3, 4)));
        assert!(store.current().is_empty());
    }

    #[test]
    fn test_reload_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ranges.list", "51.161.19.224/27\n10.0.0.0/8\n");
        let store = store_for(vec![path]);

        assert_eq!(store.reload().unwrap(), 2);
        assert!(store.is_trusted(Ipv4Addr::new(51, 161, 19, 224)));
        assert!(store.is_trusted(Ipv4Addr::new(10, 99, 1, 1)));
        assert!(!store.is_trusted(Ipv4Addr::new(1, 1, 1, 1)));
    }

    #[test]
    fn test_blank_lines_and_bare_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ranges.list", "\n192.0.2.7\n\n  \n198.51.100.0/24\n");
        let store = store_for(vec![path]);

        assert_eq!(store.reload().unwrap(), 2);
        assert!(store.is_trusted(Ipv4Addr::new(192, 0, 2, 7)));
        assert!(!store.is_trusted(Ipv4Addr::new(192, 0, 2, 8)));
        assert!(store.is_trusted(Ipv4Addr::new(198, 51, 100, 200)));
    }

    #[test]
    fn test_multiple_files_merge() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a.list", "10.0.0.0/8\n");
        let b = write_file(&dir, "b.list", "172.16.0.0/12\n");
        let store = store_for(vec![a, b]);

        assert_eq!(store.reload().unwrap(), 2);
        assert!(store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
        assert!(store.is_trusted(Ipv4Addr::new(172, 20, 1, 1)));
    }

    #[test]
    fn test_malformed_entry_keeps_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ranges.list", "10.0.0.0/8\n");
        let store = store_for(vec![path.clone()]);
        store.reload().unwrap();

        // Corrupt the file out-of-band.
        fs::write(&path, "10.0.0.0/8\nnot-a-cidr\n192.0.2.0/24\n").unwrap();

        let err = store.reload().unwrap_err();
        assert!(matches!(
            err,
            WhitelistError::MalformedEntry { line: 2, .. }
        ));

        // Previous generation still serving; the valid third line of the
        // corrupt file was not adopted either.
        assert!(store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
        assert!(!store.is_trusted(Ipv4Addr::new(192, 0, 2, 1)));
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a.list", "10.0.0.0/8\n");
        let store = store_for(vec![a, dir.path().join("not-yet-fetched.list")]);

        assert_eq!(store.reload().unwrap(), 1);
        assert!(store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
    }

    #[test]
    fn test_no_files_is_an_error() {
        let store = store_for(Vec::new());
        assert!(matches!(store.reload(), Err(WhitelistError::NoFiles)));
    }

    #[test]
    fn test_snapshot_is_stable_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ranges.list", "10.0.0.0/8\n");
        let store = store_for(vec![path.clone()]);
        store.reload().unwrap();

        let snapshot = store.current();
        fs::write(&path, "172.16.0.0/12\n").unwrap();
        store.reload().unwrap();

        // The old snapshot still answers from the old generation.
        assert!(snapshot.contains(Ipv4Addr::new(10, 1, 1, 1)));
        assert!(!snapshot.contains(Ipv4Addr::new(172, 20, 1, 1)));

        // The store answers from the new one.
        assert!(!store.is_trusted(Ipv4Addr::new(10, 1, 1, 1)));
        assert!(store.is_trusted(Ipv4Addr::new(172, 20, 1, 1)));
    }
}
