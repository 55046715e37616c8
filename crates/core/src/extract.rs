//! Archive extraction.
//!
//! The archive format is chosen from the archive's own file name, so a
//! Windows `.zip` unpacks the same way whichever host runs the installer.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io;
use std::path::Path;
use tar::Archive;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.zip`
    Zip,
    /// `.tar.gz` / `.tgz`
    TarGz,
}

impl ArchiveFormat {
    /// Detect the format from an archive file name.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Name of the top-level folder an archive unpacks to.
///
/// This is the first three `.`-separated pieces of the archive file name,
/// rejoined with `.`: `libwebp-1.5.0-linux-x86-64.tar.gz` unpacks to
/// `libwebp-1.5.0-linux-x86-64`. The rule is plain string truncation; it does
/// not parse the version.
#[must_use]
pub fn extracted_dir_name(archive_file_name: &str) -> String {
    archive_file_name
        .split('.')
        .take(3)
        .collect::<Vec<_>>()
        .join(".")
}

/// Unpack `archive` into `dest`, creating `dest` if needed.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<ArchiveFormat> {
    let name = archive
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let format = ArchiveFormat::from_file_name(name)
        .ok_or_else(|| Error::extraction(archive, "unsupported archive type"))?;

    debug!(archive = %archive.display(), dest = %dest.display(), ?format, "Extracting archive");

    std::fs::create_dir_all(dest).map_err(|e| Error::io("create directory", dest, e))?;

    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest)?,
        ArchiveFormat::TarGz => extract_tar_gz(archive, dest)?,
    }
    Ok(format)
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::io("open archive", archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(dest)
        .map_err(|e| Error::extraction(archive, format!("failed to extract tar: {e}")))
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::io("open archive", archive, e))?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| Error::extraction(archive, format!("failed to open zip: {e}")))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| Error::extraction(archive, format!("failed to read zip entry: {e}")))?;

        let Some(relative) = entry.enclosed_name() else {
            trace!(name = entry.name(), "Skipping zip entry outside destination");
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| Error::io("create directory", &outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io("create directory", parent, e))?;
        }
        let mut out = File::create(&outpath).map_err(|e| Error::io("create file", &outpath, e))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| Error::extraction(archive, format!("failed to inflate {}: {e}", entry.name())))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                .map_err(|e| Error::io("set permissions", &outpath, e))?;
        }
    }
    Ok(())
}
