//! Configuration for the whitelist store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the whitelist store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistConfig {
    /// Backing files, one CIDR or bare address per line.
    ///
    /// The fetcher owns one of these; any others are operator-managed
    /// additions loaded into the same generation.
    #[serde(default = "default_files")]
    pub files: Vec<PathBuf>,
}

fn default_files() -> Vec<PathBuf> {
    vec![PathBuf::from("whitelist/ranges.list")]
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            files: default_files(),
        }
    }
}

impl WhitelistConfig {
    /// Create a config with a single backing file.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            files: vec![file.into()],
        }
    }

    /// Add another backing file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.files.push(file.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.files.is_empty() {
            return Err("whitelist.files cannot be empty".to_string());
        }

        for (i, file) in self.files.iter().enumerate() {
            if file.as_os_str().is_empty() {
                return Err(format!("whitelist.files[{i}] is empty"));
            }
        }

        Ok(())
    }
}
