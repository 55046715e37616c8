//! Command handlers. Each returns the text to print on success.

mod install;
mod platforms;
mod tools;

use std::path::{Path, PathBuf};
use webp_static_core::{InstallConfig, Resolver, default_root};

use crate::cli::{Cli, CliError, Commands, OkEnvelope};

/// Run the parsed command.
pub fn execute(cli: &Cli) -> Result<String, CliError> {
    match &cli.command {
        Commands::Install { config, timeout } => {
            let config = install_config(config.as_deref(), *timeout)?;
            let root = install_root(cli.root.as_deref())?;
            install::execute(config, &root, cli.json)
        }
        Commands::List { platform, config } => {
            let resolver = resolver(cli.root.as_deref(), config.as_deref())?;
            tools::list(&resolver, *platform, cli.json)
        }
        Commands::Path {
            tool,
            platform,
            config,
        } => {
            let resolver = resolver(cli.root.as_deref(), config.as_deref())?;
            tools::path(&resolver, tool, *platform, cli.json)
        }
        Commands::Platforms { config } => {
            let config = load_config(config.as_deref())?;
            platforms::execute(&config, cli.json)
        }
    }
}

fn install_root(root: Option<&Path>) -> Result<PathBuf, CliError> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => default_root()?,
    };
    tracing::debug!(root = %root.display(), "Using install root");
    Ok(root)
}

fn load_config(path: Option<&Path>) -> Result<InstallConfig, CliError> {
    match path {
        Some(path) => Ok(InstallConfig::load(path)?),
        None => Ok(InstallConfig::default()),
    }
}

/// Config for `install`: `--timeout` overrides `timeout_secs` only when given.
fn install_config(path: Option<&Path>, timeout: Option<u64>) -> Result<InstallConfig, CliError> {
    let config = load_config(path)?;
    Ok(match timeout {
        Some(secs) => config.with_timeout_secs(Some(secs)),
        None => config,
    })
}

/// Resolver whose diagnostics list the platforms of the table the root was installed from.
fn resolver(root: Option<&Path>, config: Option<&Path>) -> Result<Resolver, CliError> {
    let supported = load_config(config)?.platforms.keys();
    Ok(Resolver::new(install_root(root)?).with_supported(supported))
}

fn to_json<T: serde::Serialize>(data: T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(&OkEnvelope::new(data))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("webp-static.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_install_config_keeps_file_timeout_without_flag() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "timeout_secs = 300\n");

        let config = install_config(Some(&path), None).unwrap();

        assert_eq!(config.timeout_secs, Some(300));
        assert_eq!(config.timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_install_config_flag_overrides_file_timeout() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "timeout_secs = 300\n");

        let config = install_config(Some(&path), Some(30)).unwrap();

        assert_eq!(config.timeout_secs, Some(30));
    }

    #[test]
    fn test_install_config_defaults_to_untimed() {
        assert_eq!(install_config(None, None).unwrap().timeout_secs, None);
        assert_eq!(install_config(None, Some(5)).unwrap().timeout_secs, Some(5));
    }

    #[test]
    fn test_resolver_reports_configured_platforms() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            "[[platforms]]\nkey = \"linux-arm64\"\narchive = \"linux-aarch64.tar.gz\"\n",
        );

        let err = resolver(Some(temp.path()), Some(&path))
            .unwrap()
            .resolve_for("linux-x64".parse().unwrap())
            .unwrap_err();

        let help = miette::Diagnostic::help(&err).unwrap().to_string();
        assert!(help.ends_with("Supported platforms: linux-arm64"));
    }
}
