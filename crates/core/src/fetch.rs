//! Archive download.

use reqwest::blocking::Client;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::{Error, Result};

/// Retrieves an archive and writes its bytes to a file.
///
/// The installer is generic over this trait so tests can serve fixture
/// archives without a network.
pub trait ArchiveFetcher {
    /// Fetch `url` and write the body to `dest`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] on transport failure or a non-success
    /// response, and [`Error::Io`] if `dest` cannot be written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Fetcher for `http(s)://` and `file://` URLs.
///
/// HTTP redirects are followed. `file://` URLs are copied from the local
/// filesystem, which allows installing from a local mirror.
#[derive(Debug, Clone)]
pub struct UrlFetcher {
    client: Client,
}

impl UrlFetcher {
    /// Create a fetcher. With `timeout` unset, requests never time out.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("webp-static/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::download("<client>", format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::download(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::download(url, format!("HTTP {}", response.status())));
        }

        let mut file = File::create(dest).map_err(|e| Error::io("create file", dest, e))?;
        response
            .copy_to(&mut file)
            .map_err(|e| Error::download(url, format!("failed to read response body: {e}")))
    }
}

impl ArchiveFetcher for UrlFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!(%url, dest = %dest.display(), "Fetching archive");

        if let Some(local) = url.strip_prefix("file://") {
            return fetch_local(url, Path::new(local), dest);
        }
        self.fetch_http(url, dest)
    }
}

fn fetch_local(url: &str, source: &Path, dest: &Path) -> Result<u64> {
    if !source.is_file() {
        return Err(Error::download(url, "file not found"));
    }
    std::fs::copy(source, dest).map_err(|e| Error::io("copy file", dest, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_file_url_copies_bytes() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("libwebp-1.5.0-linux-x86-64.tar.gz");
        std::fs::write(&source, b"\x1f\x8b archive bytes").unwrap();
        let dest = temp.path().join("out.tar.gz");

        let fetcher = UrlFetcher::new(None).unwrap();
        let url = format!("file://{}", source.display());
        let written = fetcher.fetch(&url, &dest).unwrap();

        assert_eq!(written, 16);
        assert_eq!(std::fs::read(&dest).unwrap(), b"\x1f\x8b archive bytes");
    }

    #[test]
    fn test_fetch_missing_file_url_is_fetch_error() {
        let temp = TempDir::new().unwrap();
        let fetcher = UrlFetcher::new(None).unwrap();
        let url = format!("file://{}", temp.path().join("missing.zip").display());

        let err = fetcher.fetch(&url, &temp.path().join("out.zip")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(!temp.path().join("out.zip").exists());
    }

    #[test]
    fn test_fetch_unreachable_host_is_fetch_error() {
        let temp = TempDir::new().unwrap();
        let fetcher = UrlFetcher::new(Some(Duration::from_secs(5))).unwrap();

        // Port 9 (discard) on localhost is not served by an HTTP server.
        let err = fetcher
            .fetch("http://127.0.0.1:9/archive.tar.gz", &temp.path().join("a"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch);
    }
}
