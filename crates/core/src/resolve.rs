//! Resolver: map tool names to executables for a platform.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{ArchiveTable, join_keys};
use crate::layout::absolute;
use crate::platform::host_platform_string;
use crate::{Error, Layout, PlatformKey, Result};

/// Tool name to absolute executable path, for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ToolMap {
    #[serde(skip)]
    platform: PlatformKey,
    tools: BTreeMap<String, PathBuf>,
}

impl ToolMap {
    /// The platform these tools were resolved for.
    #[must_use]
    pub const fn platform(&self) -> PlatformKey {
        self.platform
    }

    /// Path of a tool, e.g. `get("cwebp")`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.tools.get(name).map(PathBuf::as_path)
    }

    /// Path of a tool, or [`Error::ToolNotFound`].
    pub fn require(&self, name: &str) -> Result<&Path> {
        self.get(name).ok_or_else(|| {
            let available: Vec<&str> = self.names().collect();
            Error::tool_not_found(name, self.platform.to_string(), &available)
        })
    }

    /// Whether a tool is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tool names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// `(name, path)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.tools
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Consume into the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, PathBuf> {
        self.tools
    }
}

/// Tool name for an executable's file name: everything before the first `.`.
///
/// `cwebp.exe` → `cwebp`; `webpmux` → `webpmux`.
#[must_use]
pub fn tool_name(file_name: &str) -> &str {
    file_name
        .split_once('.')
        .map_or(file_name, |(name, _)| name)
}

/// Resolves the tools installed under an install root.
#[derive(Debug, Clone)]
pub struct Resolver {
    layout: Layout,
    supported: Vec<PlatformKey>,
}

impl Resolver {
    /// Create a resolver for binaries installed under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::new(root),
            supported: ArchiveTable::default().keys(),
        }
    }

    /// Create a resolver rooted next to the running executable.
    pub fn from_default_root() -> Result<Self> {
        Ok(Self::new(default_root()?))
    }

    /// Override the platforms listed as supported in diagnostics.
    #[must_use]
    pub fn with_supported(mut self, supported: Vec<PlatformKey>) -> Self {
        self.supported = supported;
        self
    }

    /// Absolute `bin` directory for a platform.
    pub fn bin_dir(&self, platform: PlatformKey) -> Result<PathBuf> {
        absolute(&self.layout.bin_dir(platform))
    }

    /// Resolve tools for the platform of the running process.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedPlatform`] if the host is not a known platform,
    /// otherwise as [`Resolver::resolve_for`].
    pub fn resolve(&self) -> Result<ToolMap> {
        let platform = PlatformKey::current().ok_or_else(|| {
            Error::unsupported_platform(host_platform_string(), &join_keys(&self.supported))
        })?;
        self.resolve_for(platform)
    }

    /// Resolve tools for `platform`.
    ///
    /// # Errors
    ///
    /// [`Error::BinariesNotFound`] if the platform's `bin` directory does not
    /// exist, [`Error::Io`] if it cannot be read.
    pub fn resolve_for(&self, platform: PlatformKey) -> Result<ToolMap> {
        let bin_dir = self.bin_dir(platform)?;
        if !bin_dir.is_dir() {
            return Err(Error::binaries_not_found(
                platform.to_string(),
                bin_dir,
                &join_keys(&self.supported),
            ));
        }

        let mut tools = BTreeMap::new();
        for (file_name, path) in bin_entries(&bin_dir)? {
            let name = tool_name(&file_name).to_string();
            if let Some(replaced) = tools.insert(name, path) {
                warn!(
                    tool = tool_name(&file_name),
                    replaced = %replaced.display(),
                    "Duplicate tool name, using later file"
                );
            }
        }

        debug!(%platform, count = tools.len(), path = %bin_dir.display(), "Resolved tools");
        Ok(ToolMap { platform, tools })
    }
}

/// Directory containing the running executable, used as the default root.
pub fn default_root() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| Error::io("locate executable", Path::new("<current exe>"), e))?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::config(format!("{} has no parent directory", exe.display())))
}

/// Resolve tools for the current platform under [`default_root`].
///
/// The map is rebuilt on every call.
pub fn tools() -> Result<ToolMap> {
    Resolver::from_default_root()?.resolve()
}

/// File names in a `bin` directory, sorted.
pub(crate) fn list_bin_dir(bin_dir: &Path) -> Result<Vec<String>> {
    Ok(bin_entries(bin_dir)?
        .into_iter()
        .map(|(name, _)| name)
        .collect())
}

/// Regular files directly inside `dir` (symlinks followed), sorted by name.
fn bin_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| Error::io("read directory", dir, e))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| Error::io("read directory", dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            warn!(path = %path.display(), "Skipping file with a non-UTF-8 name");
            continue;
        };
        entries.push((name, path));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arch, ErrorKind, Os};
    use tempfile::TempDir;

    fn fixture(root: &Path, platform: PlatformKey, files: &[&str]) -> PathBuf {
        let bin = Layout::new(root).bin_dir(platform);
        std::fs::create_dir_all(&bin).unwrap();
        for file in files {
            std::fs::write(bin.join(file), b"#!/bin/sh\n").unwrap();
        }
        bin
    }

    #[test]
    fn test_tool_name() {
        assert_eq!(tool_name("cwebp.exe"), "cwebp");
        assert_eq!(tool_name("webpmux"), "webpmux");
        assert_eq!(tool_name("anim_diff.v2.exe"), "anim_diff");
        assert_eq!(tool_name(".hidden"), "");
    }

    #[test]
    fn test_resolve_fixture() {
        let temp = TempDir::new().unwrap();
        let platform = PlatformKey::new(Os::Win32, Arch::X64);
        let bin = fixture(temp.path(), platform, &["cwebp.exe", "dwebp.exe", "webpmux"]);

        let map = Resolver::new(temp.path()).resolve_for(platform).unwrap();

        assert_eq!(map.platform(), platform);
        assert_eq!(map.names().collect::<Vec<_>>(), ["cwebp", "dwebp", "webpmux"]);
        assert_eq!(map.get("cwebp"), Some(bin.join("cwebp.exe").as_path()));
        assert_eq!(map.get("dwebp"), Some(bin.join("dwebp.exe").as_path()));
        assert_eq!(map.get("webpmux"), Some(bin.join("webpmux").as_path()));
        assert!(map.iter().all(|(_, path)| path.is_absolute()));
    }

    #[test]
    fn test_bin_dir_is_absolute_for_relative_root() {
        let resolver = Resolver::new("relative/root");
        let bin = resolver
            .bin_dir(PlatformKey::new(Os::Linux, Arch::X64))
            .unwrap();
        assert!(bin.is_absolute());
        assert!(bin.ends_with("relative/root/binaries/linux/x64/bin"));
    }

    #[test]
    fn test_resolve_is_stable_across_scans() {
        let temp = TempDir::new().unwrap();
        let platform = PlatformKey::new(Os::Darwin, Arch::Arm64);
        fixture(temp.path(), platform, &["cwebp", "dwebp", "gif2webp", "img2webp"]);
        let resolver = Resolver::new(temp.path());

        let first = resolver.resolve_for(platform).unwrap();
        let second = resolver.resolve_for(platform).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_resolve_skips_directories() {
        let temp = TempDir::new().unwrap();
        let platform = PlatformKey::new(Os::Linux, Arch::Arm64);
        let bin = fixture(temp.path(), platform, &["cwebp"]);
        std::fs::create_dir_all(bin.join("nested/deeper")).unwrap();
        std::fs::write(bin.join("nested/dwebp"), b"x").unwrap();

        let map = Resolver::new(temp.path()).resolve_for(platform).unwrap();

        assert_eq!(map.names().collect::<Vec<_>>(), ["cwebp"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_resolve_skips_non_utf8_file_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let platform = PlatformKey::new(Os::Linux, Arch::X64);
        let bin = fixture(temp.path(), platform, &["cwebp"]);
        std::fs::write(bin.join(OsStr::from_bytes(b"dwebp\xff")), b"x").unwrap();

        let map = Resolver::new(temp.path()).resolve_for(platform).unwrap();

        assert_eq!(map.names().collect::<Vec<_>>(), ["cwebp"]);
        assert!(map.names().all(|name| !name.contains('\u{FFFD}')));
    }

    #[test]
    fn test_resolve_lists_custom_supported_platforms() {
        let temp = TempDir::new().unwrap();
        let custom = vec![PlatformKey::new(Os::Linux, Arch::Arm64)];

        let err = Resolver::new(temp.path())
            .with_supported(custom)
            .resolve_for(PlatformKey::new(Os::Linux, Arch::X64))
            .unwrap_err();

        let Error::BinariesNotFound { help, .. } = err else {
            unreachable!("expected BinariesNotFound");
        };
        assert!(help.ends_with("Supported platforms: linux-arm64"));
    }

    #[test]
    fn test_resolve_duplicate_base_name_later_file_wins() {
        let temp = TempDir::new().unwrap();
        let platform = PlatformKey::new(Os::Win32, Arch::X64);
        let bin = fixture(temp.path(), platform, &["cwebp.exe", "cwebp.pdb"]);

        let map = Resolver::new(temp.path()).resolve_for(platform).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("cwebp"), Some(bin.join("cwebp.pdb").as_path()));
    }

    #[test]
    fn test_resolve_missing_bin_dir() {
        let temp = TempDir::new().unwrap();
        let platform = PlatformKey::new(Os::Linux, Arch::X64);

        let err = Resolver::new(temp.path())
            .resolve_for(platform)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EnvironmentUnsupported);
        let Error::BinariesNotFound {
            platform: name,
            path,
            help,
        } = err
        else {
            unreachable!("expected BinariesNotFound");
        };
        assert_eq!(name, "linux-x64");
        assert!(path.ends_with("binaries/linux/x64/bin"));
        assert!(help.contains("win32-x64, linux-x64, linux-arm64, darwin-x64, darwin-arm64"));
    }

    #[test]
    fn test_resolve_current_platform() {
        let temp = TempDir::new().unwrap();
        let resolver = Resolver::new(temp.path());
        let Some(host) = PlatformKey::current() else {
            assert!(matches!(
                resolver.resolve(),
                Err(Error::UnsupportedPlatform { .. })
            ));
            return;
        };
        assert!(matches!(
            resolver.resolve(),
            Err(Error::BinariesNotFound { .. })
        ));

        fixture(temp.path(), host, &["cwebp"]);
        assert!(resolver.resolve().unwrap().contains("cwebp"));
    }

    #[test]
    fn test_require_lists_available_tools() {
        let temp = TempDir::new().unwrap();
        let platform = PlatformKey::new(Os::Linux, Arch::X64);
        fixture(temp.path(), platform, &["cwebp", "dwebp"]);
        let map = Resolver::new(temp.path()).resolve_for(platform).unwrap();

        assert!(map.require("cwebp").is_ok());
        let err = map.require("vwebp").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolMissing);
        assert!(err.to_string().contains("vwebp"));
    }

    #[test]
    fn test_default_root_is_absolute_directory() {
        let root = default_root().unwrap();
        assert!(root.is_absolute());
        assert!(root.is_dir());
    }
}
