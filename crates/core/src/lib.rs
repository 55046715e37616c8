//! Prebuilt libwebp command-line tools, per platform.
//!
//! This crate provides functionality to:
//! - Download and unpack the official libwebp release archive for every
//!   supported platform into `binaries/<os>/<arch>/bin`
//! - Resolve the tools for the running platform to absolute paths
//!
//! # Example
//!
//! ```ignore
//! use webp_static_core::{InstallConfig, Installer, Resolver};
//!
//! // Once, at setup time
//! Installer::new(InstallConfig::default(), "/opt/webp-static")?.run()?;
//!
//! // At every start
//! let tools = Resolver::new("/opt/webp-static").resolve()?;
//! let cwebp = tools.require("cwebp")?;
//! std::process::Command::new(cwebp).args(["in.png", "-o", "out.webp"]).status()?;
//! ```

#![warn(missing_docs)]

pub mod config;
mod error;
mod extract;
mod fetch;
mod install;
mod layout;
mod platform;
mod resolve;

#[cfg(test)]
mod test_support;

pub use config::{ArchiveEntry, ArchiveTable, InstallConfig};
pub use error::{Error, ErrorKind, Result};
pub use extract::{ArchiveFormat, extract_archive, extracted_dir_name};
pub use fetch::{ArchiveFetcher, UrlFetcher};
pub use install::{InstallReport, InstalledPlatform, Installer, SelfCheck};
pub use layout::{BINARIES_DIR, Layout};
pub use platform::{Arch, Os, PlatformKey, host_platform_string};
pub use resolve::{Resolver, ToolMap, default_root, tool_name, tools};
