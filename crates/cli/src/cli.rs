use clap::{Parser, Subcommand};
use miette::{Diagnostic, Report};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use webp_static_core::PlatformKey;

use crate::logging::{LogLevel, TracingFormat};

/// Exit code for success
pub const EXIT_OK: i32 = 0;
/// Exit code for any unrecoverable failure
pub const EXIT_FAILURE: i32 = 1;

/// CLI-specific errors
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Install or resolve failure reported by the core crate
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] webp_static_core::Error),

    /// Output could not be produced
    #[error("Failed to render output: {message}")]
    #[diagnostic(code(webp_static::cli::output))]
    Output {
        /// The error message
        message: String,
    },
}

impl CliError {
    /// Create an output error
    #[must_use]
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Stable identifier used in JSON error envelopes
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Core(err) => err.kind().as_str(),
            Self::Output { .. } => "output",
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::output(err.to_string())
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Render error appropriately based on JSON flag
pub fn render_error(err: CliError, json_mode: bool) {
    if json_mode {
        let envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string(),
        }));
        match serde_json::to_string(&envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err);
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Install and locate prebuilt libwebp command-line tools.
#[derive(Parser, Debug)]
#[command(name = "webp-static")]
#[command(about = "Install and locate prebuilt libwebp command-line tools")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Directory containing `binaries/` (defaults to the executable's directory).
    #[arg(long, global = true, env = "WEBP_STATIC_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(long, global = true, default_value = "compact", value_enum)]
    pub log_format: TracingFormat,

    /// Emit JSON envelopes instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and unpack binaries for every supported platform.
    Install {
        /// TOML file overriding the release location, version or platform table.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// HTTP timeout in seconds (downloads are untimed by default).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// List the tools installed for a platform.
    List {
        /// Platform to list (defaults to the current platform), e.g. `linux-x64`.
        #[arg(long, value_name = "OS-ARCH")]
        platform: Option<PlatformKey>,
        /// TOML file the install used; its platform table is reported as supported.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print the absolute path of one tool.
    Path {
        /// Tool name, e.g. `cwebp`.
        tool: String,
        /// Platform to resolve (defaults to the current platform).
        #[arg(long, value_name = "OS-ARCH")]
        platform: Option<PlatformKey>,
        /// TOML file the install used; its platform table is reported as supported.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Show the supported platforms and their archives.
    Platforms {
        /// TOML file overriding the release location, version or platform table.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Parse command line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use webp_static_core::{Arch, Error, Os};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_platform() {
        let cli = Cli::try_parse_from(["webp-static", "list", "--platform", "darwin-arm64"]).unwrap();
        let Commands::List { platform, config } = cli.command else {
            unreachable!("expected list command");
        };
        assert_eq!(platform, Some(PlatformKey::new(Os::Darwin, Arch::Arm64)));
        assert_eq!(config, None);
        assert_eq!(cli.level, LogLevel::Info);
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_rejects_unknown_platform() {
        assert!(Cli::try_parse_from(["webp-static", "list", "--platform", "beos-ppc"]).is_err());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "webp-static",
            "install",
            "--timeout",
            "30",
            "--root",
            "/opt/webp",
            "--json",
            "-L",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/opt/webp")));
        assert!(cli.json);
        assert_eq!(cli.level, LogLevel::Debug);
        assert!(matches!(
            cli.command,
            Commands::Install {
                timeout: Some(30),
                config: None
            }
        ));
    }

    #[test]
    fn test_error_codes_follow_kind() {
        let err = CliError::from(Error::download("https://x.invalid/a.zip", "HTTP 500"));
        assert_eq!(err.code(), "fetch");

        let err = CliError::from(Error::config("bad"));
        assert_eq!(err.code(), "config");
        assert_eq!(CliError::output("x").code(), "output");
    }

    #[test]
    fn test_error_display_is_transparent() {
        let err = CliError::from(Error::binaries_not_found("linux-x64", "/r/bin", "linux-x64"));
        assert!(err.to_string().starts_with("Prebuilt binaries for linux-x64 not found"));
    }
}
