//! On-disk layout shared by the installer and the resolver.
//!
//! ```text
//! <root>/binaries/<archive file>          (transient, during install)
//! <root>/binaries/<os>/<extracted folder> (transient, during install)
//! <root>/binaries/<os>/<arch>/bin/<tool>
//! ```

use std::path::{Path, PathBuf};

use crate::{Error, PlatformKey, Result};

/// Name of the directory holding all installed platforms.
pub const BINARIES_DIR: &str = "binaries";

/// Paths under an install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Create a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The install root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/binaries`
    #[must_use]
    pub fn binaries_dir(&self) -> PathBuf {
        self.root.join(BINARIES_DIR)
    }

    /// `<root>/binaries/<os>`
    #[must_use]
    pub fn os_dir(&self, platform: PlatformKey) -> PathBuf {
        self.binaries_dir().join(platform.os.as_str())
    }

    /// `<root>/binaries/<os>/<arch>`
    #[must_use]
    pub fn arch_dir(&self, platform: PlatformKey) -> PathBuf {
        self.os_dir(platform).join(platform.arch.as_str())
    }

    /// `<root>/binaries/<os>/<arch>/bin`
    #[must_use]
    pub fn bin_dir(&self, platform: PlatformKey) -> PathBuf {
        self.arch_dir(platform).join("bin")
    }

    /// `<root>/binaries/<archive file name>`
    #[must_use]
    pub fn archive_path(&self, archive_file_name: &str) -> PathBuf {
        self.binaries_dir().join(archive_file_name)
    }
}

/// Make `path` absolute against the working directory without touching the
/// filesystem, so reported paths stay valid if the process changes directory.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::io("resolve path", path, e))
}
