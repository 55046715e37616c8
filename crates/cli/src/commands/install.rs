use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use webp_static_core::{InstallConfig, InstallReport, Installer, SelfCheck};

use crate::cli::CliError;

#[derive(Serialize)]
struct InstalledJson<'a> {
    platform: String,
    bin_dir: &'a Path,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SelfCheckJson<'a> {
    Ready {
        platform: String,
        tools: &'a [String],
    },
    MissingBinDir {
        platform: String,
        path: &'a Path,
    },
    Unsupported {
        platform: &'a str,
        supported: &'a str,
    },
}

#[derive(Serialize)]
struct InstallJson<'a> {
    tool: &'a str,
    version: &'a str,
    installed: Vec<InstalledJson<'a>>,
    self_check: SelfCheckJson<'a>,
}

pub fn execute(config: InstallConfig, root: &Path, json: bool) -> Result<String, CliError> {
    let installer = Installer::new(config.clone(), root)?;
    let report = installer.run()?;

    if json {
        return super::to_json(install_json(&config, &report));
    }
    Ok(render_text(&config, &report))
}

fn install_json<'a>(config: &'a InstallConfig, report: &'a InstallReport) -> InstallJson<'a> {
    let self_check = match &report.self_check {
        SelfCheck::Ready { platform, tools } => SelfCheckJson::Ready {
            platform: platform.to_string(),
            tools,
        },
        SelfCheck::MissingBinDir { platform, path } => SelfCheckJson::MissingBinDir {
            platform: platform.to_string(),
            path,
        },
        SelfCheck::Unsupported {
            platform,
            supported,
        } => SelfCheckJson::Unsupported {
            platform,
            supported,
        },
    };

    InstallJson {
        tool: &config.tool_prefix,
        version: &config.version,
        installed: report
            .installed
            .iter()
            .map(|p| InstalledJson {
                platform: p.key.to_string(),
                bin_dir: &p.bin_dir,
            })
            .collect(),
        self_check,
    }
}

fn render_text(config: &InstallConfig, report: &InstallReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "✓ {} v{} installed for {} platforms",
        config.tool_prefix,
        config.version,
        report.installed.len()
    );
    for platform in &report.installed {
        let _ = writeln!(
            out,
            "  {:<13} {}",
            platform.key.to_string(),
            platform.bin_dir.display()
        );
    }

    match &report.self_check {
        SelfCheck::Ready { platform, tools } => {
            let _ = write!(
                out,
                "✓ Found {} tools for {}: {}",
                tools.len(),
                platform,
                tools.join(", ")
            );
        }
        SelfCheck::MissingBinDir { platform, .. } => {
            let _ = write!(
                out,
                "⚠ Binary directory not found for current platform ({platform})"
            );
        }
        SelfCheck::Unsupported {
            platform,
            supported,
        } => {
            let _ = write!(
                out,
                "⚠ Current platform ({platform}) is not officially supported. Available platforms: {supported}"
            );
        }
    }
    out
}
