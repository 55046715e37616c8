//! Install configuration: where archives come from and which platforms to fetch.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::{Arch, Error, Os, PlatformKey, Result};

/// Base URL for official WebP releases.
pub const DEFAULT_BASE_URL: &str =
    "https://storage.googleapis.com/downloads.webmproject.org/releases/webp/";

/// Archive name prefix for official WebP releases.
pub const DEFAULT_TOOL_PREFIX: &str = "libwebp";

/// Version of libwebp binaries to download.
pub const DEFAULT_VERSION: &str = "1.5.0";

/// One row of the archive table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveEntry {
    /// Platform the archive targets.
    pub key: PlatformKey,
    /// Archive file name suffix, e.g. `"linux-x86-64.tar.gz"`.
    pub archive: String,
}

impl ArchiveEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(key: PlatformKey, archive: impl Into<String>) -> Self {
        Self {
            key,
            archive: archive.into(),
        }
    }
}

/// Ordered mapping of platform to archive suffix.
///
/// Entries are installed in table order. Keys are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ArchiveEntry>", into = "Vec<ArchiveEntry>")]
pub struct ArchiveTable {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveTable {
    /// Build a table, rejecting duplicate platform keys.
    pub fn new(entries: Vec<ArchiveEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.key) {
                return Err(Error::config(format!(
                    "duplicate platform '{}' in archive table",
                    entry.key
                )));
            }
            if entry.archive.is_empty() {
                return Err(Error::config(format!(
                    "empty archive name for platform '{}'",
                    entry.key
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Iterate entries in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, ArchiveEntry> {
        self.entries.iter()
    }

    /// Look up the archive suffix for a platform.
    #[must_use]
    pub fn get(&self, key: PlatformKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.archive.as_str())
    }

    /// Whether the table has an entry for `key`.
    #[must_use]
    pub fn contains(&self, key: PlatformKey) -> bool {
        self.get(key).is_some()
    }

    /// Platform keys in table order.
    #[must_use]
    pub fn keys(&self) -> Vec<PlatformKey> {
        self.entries.iter().map(|entry| entry.key).collect()
    }

    /// Comma-separated list of platform keys, for diagnostics.
    #[must_use]
    pub fn supported_list(&self) -> String {
        join_keys(&self.keys())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ArchiveTable {
    fn default() -> Self {
        Self {
            entries: vec![
                ArchiveEntry::new(PlatformKey::new(Os::Win32, Arch::X64), "windows-x64.zip"),
                ArchiveEntry::new(PlatformKey::new(Os::Linux, Arch::X64), "linux-x86-64.tar.gz"),
                ArchiveEntry::new(
                    PlatformKey::new(Os::Linux, Arch::Arm64),
                    "linux-aarch64.tar.gz",
                ),
                ArchiveEntry::new(PlatformKey::new(Os::Darwin, Arch::X64), "mac-x86-64.tar.gz"),
                ArchiveEntry::new(PlatformKey::new(Os::Darwin, Arch::Arm64), "mac-arm64.tar.gz"),
            ],
        }
    }
}

impl TryFrom<Vec<ArchiveEntry>> for ArchiveTable {
    type Error = Error;

    fn try_from(entries: Vec<ArchiveEntry>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<ArchiveTable> for Vec<ArchiveEntry> {
    fn from(table: ArchiveTable) -> Self {
        table.entries
    }
}

impl<'a> IntoIterator for &'a ArchiveTable {
    type Item = &'a ArchiveEntry;
    type IntoIter = std::slice::Iter<'a, ArchiveEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub(crate) fn join_keys(keys: &[PlatformKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Configuration for an install run.
///
/// Construct with [`InstallConfig::default`] for the official libwebp
/// release, or load from TOML with [`InstallConfig::load`]. Any field omitted
/// from the TOML keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
    /// URL prefix the archive file name is appended to.
    pub base_url: String,
    /// Archive name prefix, e.g. `"libwebp"`.
    pub tool_prefix: String,
    /// Release version, e.g. `"1.5.0"`.
    pub version: String,
    /// Platforms to install, in order.
    pub platforms: ArchiveTable,
    /// Optional HTTP timeout in seconds. Downloads are untimed when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tool_prefix: DEFAULT_TOOL_PREFIX.to_string(),
            version: DEFAULT_VERSION.to_string(),
            platforms: ArchiveTable::default(),
            timeout_secs: None,
        }
    }
}

impl InstallConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::config("base_url must not be empty"));
        }
        if self.tool_prefix.is_empty() {
            return Err(Error::config("tool_prefix must not be empty"));
        }
        if self.version.is_empty() {
            return Err(Error::config("version must not be empty"));
        }
        Ok(())
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the archive name prefix.
    #[must_use]
    pub fn with_tool_prefix(mut self, tool_prefix: impl Into<String>) -> Self {
        self.tool_prefix = tool_prefix.into();
        self
    }

    /// Set the release version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Replace the archive table.
    #[must_use]
    pub fn with_platforms(mut self, platforms: ArchiveTable) -> Self {
        self.platforms = platforms;
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// HTTP timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// `<tool_prefix>-<version>-<suffix>`
    #[must_use]
    pub fn archive_file_name(&self, suffix: &str) -> String {
        format!("{}-{}-{}", self.tool_prefix, self.version, suffix)
    }

    /// Full download URL for an archive file name.
    #[must_use]
    pub fn download_url(&self, archive_file_name: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, archive_file_name)
        } else {
            format!("{}/{}", self.base_url, archive_file_name)
        }
    }
}
