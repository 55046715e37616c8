//! Installer: download and unpack the archive for every platform in the table.
//!
//! Each platform goes through the same steps:
//!
//! 1. ensure `binaries/<os>/` exists
//! 2. fetch `<base_url><prefix>-<version>-<suffix>` to `binaries/<archive>`
//! 3. extract the archive into `binaries/<os>/`
//! 4. delete the archive
//! 5. rename the extracted folder to `binaries/<os>/<arch>`
//!
//! The first failure removes the whole `binaries/` directory, including
//! platforms that already succeeded, and is returned to the caller.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::ArchiveEntry;
use crate::extract::{extract_archive, extracted_dir_name};
use crate::fetch::{ArchiveFetcher, UrlFetcher};
use crate::layout::absolute;
use crate::platform::host_platform_string;
use crate::resolve::list_bin_dir;
use crate::{Error, InstallConfig, Layout, PlatformKey, Result};

/// A platform that was installed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlatform {
    /// The platform.
    pub key: PlatformKey,
    /// Its `bin` directory.
    pub bin_dir: PathBuf,
}

/// Outcome of the informational post-install check for the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfCheck {
    /// Binaries for the host platform are in place.
    Ready {
        /// Host platform.
        platform: PlatformKey,
        /// File names found in its `bin` directory.
        tools: Vec<String>,
    },
    /// The host platform is in the table but its `bin` directory is missing.
    MissingBinDir {
        /// Host platform.
        platform: PlatformKey,
        /// The expected `bin` directory.
        path: PathBuf,
    },
    /// The host platform is not in the table.
    Unsupported {
        /// Host platform description.
        platform: String,
        /// Supported platforms listing.
        supported: String,
    },
}

/// Summary of a successful install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Installed platforms, in table order.
    pub installed: Vec<InstalledPlatform>,
    /// Result of the host platform check.
    pub self_check: SelfCheck,
}

/// Downloads and unpacks binaries for every platform in an [`InstallConfig`].
#[derive(Debug)]
pub struct Installer<F = UrlFetcher> {
    config: InstallConfig,
    layout: Layout,
    fetcher: F,
}

impl Installer<UrlFetcher> {
    /// Create an installer that writes under `root` using the network.
    pub fn new(config: InstallConfig, root: impl Into<PathBuf>) -> Result<Self> {
        let fetcher = UrlFetcher::new(config.timeout())?;
        Ok(Self::with_fetcher(config, root, fetcher))
    }
}

impl<F: ArchiveFetcher> Installer<F> {
    /// Create an installer with a custom fetcher.
    pub fn with_fetcher(config: InstallConfig, root: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            config,
            layout: Layout::new(root),
            fetcher,
        }
    }

    /// The layout this installer writes.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Install every platform in table order.
    ///
    /// # Errors
    ///
    /// Returns the first failure after removing the `binaries/` directory.
    pub fn run(&self) -> Result<InstallReport> {
        info!(
            tool = %self.config.tool_prefix,
            version = %self.config.version,
            platforms = self.config.platforms.len(),
            "Downloading binaries"
        );

        let binaries = self.layout.binaries_dir();
        let mut installed = Vec::with_capacity(self.config.platforms.len());

        for entry in &self.config.platforms {
            info!(platform = %entry.key, "Processing platform");
            match self.install_platform(entry) {
                Ok(bin_dir) => {
                    info!(platform = %entry.key, path = %bin_dir.display(), "Installed");
                    installed.push(InstalledPlatform {
                        key: entry.key,
                        bin_dir,
                    });
                }
                Err(err) => {
                    error!(platform = %entry.key, error = %err, "Failed to install platform");
                    self.rollback(&binaries);
                    return Err(err);
                }
            }
        }

        info!(
            version = %self.config.version,
            count = installed.len(),
            "All binaries downloaded and extracted"
        );

        Ok(InstallReport {
            installed,
            self_check: self.self_check(),
        })
    }

    fn install_platform(&self, entry: &ArchiveEntry) -> Result<PathBuf> {
        let archive_name = self.config.archive_file_name(&entry.archive);
        let url = self.config.download_url(&archive_name);
        let os_dir = self.layout.os_dir(entry.key);

        std::fs::create_dir_all(&os_dir).map_err(|e| Error::io("create directory", &os_dir, e))?;

        let archive_path = self.layout.archive_path(&archive_name);
        info!(%url, "Downloading");
        let bytes = self.fetcher.fetch(&url, &archive_path)?;
        debug!(bytes, path = %archive_path.display(), "Downloaded archive");

        info!(archive = %archive_name, "Extracting");
        extract_archive(&archive_path, &os_dir)?;
        remove_file(&archive_path)?;

        let extracted = os_dir.join(extracted_dir_name(&archive_name));
        if !extracted.is_dir() {
            return Err(Error::extracted_layout(&archive_name, extracted));
        }

        let target = self.layout.arch_dir(entry.key);
        if target.exists() {
            debug!(path = %target.display(), "Removing previous install");
            remove_dir(&target)?;
        }
        std::fs::rename(&extracted, &target).map_err(|e| Error::io("rename", &extracted, e))?;

        let bin_dir = self.layout.bin_dir(entry.key);
        if !bin_dir.is_dir() {
            return Err(Error::extracted_layout(&archive_name, bin_dir));
        }
        absolute(&bin_dir)
    }

    fn rollback(&self, binaries: &Path) {
        if !binaries.exists() {
            return;
        }
        warn!(path = %binaries.display(), "Removing partially installed binaries");
        if let Err(e) = std::fs::remove_dir_all(binaries) {
            error!(path = %binaries.display(), error = %e, "Failed to remove binaries directory");
        }
    }

    /// Check whether the host platform's binaries are in place.
    ///
    /// Purely informational: logs what it finds and never fails.
    pub fn self_check(&self) -> SelfCheck {
        let supported = self.config.platforms.supported_list();

        let Some(platform) = PlatformKey::current().filter(|p| self.config.platforms.contains(*p))
        else {
            let platform = PlatformKey::current()
                .map_or_else(host_platform_string, |p| p.to_string());
            warn!(%platform, %supported, "Current platform is not officially supported");
            return SelfCheck::Unsupported {
                platform,
                supported,
            };
        };

        let bin_dir = self.layout.bin_dir(platform);
        match list_bin_dir(&bin_dir) {
            Ok(tools) => {
                info!(
                    %platform,
                    count = tools.len(),
                    tools = %tools.join(", "),
                    "Found tools for current platform"
                );
                SelfCheck::Ready { platform, tools }
            }
            Err(_) => {
                warn!(%platform, path = %bin_dir.display(), "Binary directory not found for current platform");
                SelfCheck::MissingBinDir {
                    platform,
                    path: bin_dir,
                }
            }
        }
    }
}

fn remove_file(path: &Path) -> Result<()> {
    std::fs::remove_file(path).map_err(|e| Error::io("remove file", path, e))
}

fn remove_dir(path: &Path) -> Result<()> {
    std::fs::remove_dir_all(path).map_err(|e| Error::io("remove directory", path, e))
}
