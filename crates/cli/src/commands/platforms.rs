use std::fmt::Write as _;
use webp_static_core::{InstallConfig, PlatformKey};

use crate::cli::CliError;

struct Row {
    platform: String,
    archive: String,
    url: String,
    current: bool,
}

fn rows(config: &InstallConfig) -> Vec<Row> {
    let current = PlatformKey::current();
    config
        .platforms
        .iter()
        .map(|entry| {
            let archive = config.archive_file_name(&entry.archive);
            Row {
                platform: entry.key.to_string(),
                url: config.download_url(&archive),
                archive,
                current: current == Some(entry.key),
            }
        })
        .collect()
}

/// `webp-static platforms`
pub fn execute(config: &InstallConfig, json: bool) -> Result<String, CliError> {
    let rows = rows(config);

    if json {
        let data: Vec<_> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "platform": row.platform,
                    "archive": row.archive,
                    "url": row.url,
                    "current": row.current,
                })
            })
            .collect();
        return super::to_json(data);
    }

    let mut out = String::new();
    for row in &rows {
        let marker = if row.current { "  (current)" } else { "" };
        let _ = writeln!(out, "{:<13} {}{marker}", row.platform, row.archive);
    }
    Ok(out.trim_end().to_string())
}
