//! Error types for installing and resolving webp tool binaries.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for webp-static operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Callers that only care about which stage failed (rather than the exact
/// variant) can match on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The host or requested platform has no table entry or no binaries.
    EnvironmentUnsupported,
    /// Downloading an archive failed.
    Fetch,
    /// Unpacking an archive failed or produced an unexpected layout.
    Extraction,
    /// A directory or file operation failed.
    Filesystem,
    /// The install configuration could not be read or is invalid.
    Config,
    /// A requested tool is not present in the resolved tool map.
    ToolMissing,
}

impl ErrorKind {
    /// Stable identifier for machine-readable output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnvironmentUnsupported => "environment_unsupported",
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
            Self::Filesystem => "filesystem",
            Self::Config => "config",
            Self::ToolMissing => "tool_missing",
        }
    }
}

/// Errors that can occur while installing or resolving binaries.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The platform is not one of the supported platforms.
    #[error("Platform '{platform}' is not supported")]
    #[diagnostic(code(webp_static::unsupported_platform))]
    UnsupportedPlatform {
        /// The offending platform string.
        platform: String,
        /// Supported platforms listing.
        #[help]
        help: String,
    },

    /// The `bin` directory for a platform does not exist.
    #[error("Prebuilt binaries for {platform} not found (expected path: {})", path.display())]
    #[diagnostic(code(webp_static::binaries_not_found))]
    BinariesNotFound {
        /// The platform that was resolved.
        platform: String,
        /// The expected `bin` directory.
        path: PathBuf,
        /// Remediation and supported platforms listing.
        #[help]
        help: String,
    },

    /// Downloading an archive failed.
    #[error("Failed to download {url}: {message}")]
    #[diagnostic(
        code(webp_static::download),
        help("Check that an internet connection is available and the archive URL is reachable")
    )]
    Download {
        /// The URL being fetched.
        url: String,
        /// What went wrong.
        message: String,
    },

    /// An archive could not be unpacked.
    #[error("Failed to extract {}: {message}", archive.display())]
    #[diagnostic(
        code(webp_static::extraction),
        help("The archive may be corrupt or in an unsupported format (expected .zip or .tar.gz)")
    )]
    Extraction {
        /// The archive being unpacked.
        archive: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// An archive unpacked without producing the expected directory.
    #[error("Archive '{archive}' did not produce expected directory {}", expected.display())]
    #[diagnostic(
        code(webp_static::extraction_layout),
        help("The archive naming scheme may have changed; the top-level folder must match the first three dot-separated parts of the archive name and contain a bin directory")
    )]
    ExtractedLayout {
        /// The archive file name.
        archive: String,
        /// The directory that was expected to exist.
        expected: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("I/O error during {operation} on {}: {source}", path.display())]
    #[diagnostic(
        code(webp_static::io),
        help("Check write permissions in the install directory")
    )]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(webp_static::config))]
    Config {
        /// What went wrong.
        message: String,
    },

    /// A tool was requested that the platform does not provide.
    #[error("Tool '{name}' not found for {platform}")]
    #[diagnostic(code(webp_static::tool_not_found))]
    ToolNotFound {
        /// The requested tool name.
        name: String,
        /// The platform that was resolved.
        platform: String,
        /// Available tools listing.
        #[help]
        help: String,
    },
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedPlatform { .. } | Self::BinariesNotFound { .. } => {
                ErrorKind::EnvironmentUnsupported
            }
            Self::Download { .. } => ErrorKind::Fetch,
            Self::Extraction { .. } | Self::ExtractedLayout { .. } => ErrorKind::Extraction,
            Self::Io { .. } => ErrorKind::Filesystem,
            Self::Config { .. } => ErrorKind::Config,
            Self::ToolNotFound { .. } => ErrorKind::ToolMissing,
        }
    }

    /// Create an unsupported platform error listing the supported platforms.
    #[must_use]
    pub fn unsupported_platform(platform: impl Into<String>, supported: &str) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
            help: format!("Supported platforms: {supported}"),
        }
    }

    /// Create a missing binaries error for a platform's `bin` directory.
    #[must_use]
    pub fn binaries_not_found(
        platform: impl Into<String>,
        path: impl Into<PathBuf>,
        supported: &str,
    ) -> Self {
        Self::BinariesNotFound {
            platform: platform.into(),
            path: path.into(),
            help: format!(
                "Run `webp-static install` and make sure your platform is supported. Supported platforms: {supported}"
            ),
        }
    }

    /// Create a download error.
    #[must_use]
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extraction(archive: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Extraction {
            archive: archive.into(),
            message: message.into(),
        }
    }

    /// Create an extraction layout error.
    #[must_use]
    pub fn extracted_layout(archive: impl Into<String>, expected: impl Into<PathBuf>) -> Self {
        Self::ExtractedLayout {
            archive: archive.into(),
            expected: expected.into(),
        }
    }

    /// Create an I/O error with operation and path context.
    #[must_use]
    pub fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a tool not found error listing the available tools.
    #[must_use]
    pub fn tool_not_found(
        name: impl Into<String>,
        platform: impl Into<String>,
        available: &[&str],
    ) -> Self {
        let help = if available.is_empty() {
            "No tools are installed for this platform".to_string()
        } else {
            format!("Available tools: {}", available.join(", "))
        };
        Self::ToolNotFound {
            name: name.into(),
            platform: platform.into(),
            help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::unsupported_platform("freebsd-x64", "linux-x64").kind(),
            ErrorKind::EnvironmentUnsupported
        );
        assert_eq!(
            Error::binaries_not_found("linux-x64", "/tmp/bin", "linux-x64").kind(),
            ErrorKind::EnvironmentUnsupported
        );
        assert_eq!(
            Error::download("https://example.invalid/a.tar.gz", "HTTP 404").kind(),
            ErrorKind::Fetch
        );
        assert_eq!(
            Error::extraction("/tmp/a.zip", "bad zip").kind(),
            ErrorKind::Extraction
        );
        assert_eq!(
            Error::extracted_layout("a.tar.gz", "/tmp/a").kind(),
            ErrorKind::Extraction
        );
        assert_eq!(Error::config("bad").kind(), ErrorKind::Config);
        assert_eq!(
            Error::tool_not_found("cwebp", "linux-x64", &[]).kind(),
            ErrorKind::ToolMissing
        );
    }

    #[test]
    fn test_io_error_display_includes_context() {
        let err = Error::io(
            "rename",
            Path::new("/tmp/binaries/linux"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        let display = err.to_string();
        assert!(display.contains("rename"));
        assert!(display.contains("/tmp/binaries/linux"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_binaries_not_found_help_lists_platforms() {
        let err = Error::binaries_not_found("linux-x64", "/x/bin", "darwin-arm64, linux-x64");
        let Error::BinariesNotFound { help, .. } = &err else {
            unreachable!("constructor returns BinariesNotFound");
        };
        assert!(help.contains("darwin-arm64, linux-x64"));
        assert!(err.to_string().contains("/x/bin"));
    }

    #[test]
    fn test_tool_not_found_help() {
        let err = Error::tool_not_found("vwebp", "linux-x64", &["cwebp", "dwebp"]);
        let Error::ToolNotFound { help, .. } = err else {
            unreachable!("constructor returns ToolNotFound");
        };
        assert_eq!(help, "Available tools: cwebp, dwebp");
    }
}
