use std::fmt::Write as _;
use webp_static_core::{PlatformKey, Resolver, ToolMap};

use crate::cli::CliError;

fn resolve(resolver: &Resolver, platform: Option<PlatformKey>) -> Result<ToolMap, CliError> {
    let tools = match platform {
        Some(platform) => resolver.resolve_for(platform)?,
        None => resolver.resolve()?,
    };
    Ok(tools)
}

/// `webp-static list`: one `name<TAB>path` line per tool.
pub fn list(
    resolver: &Resolver,
    platform: Option<PlatformKey>,
    json: bool,
) -> Result<String, CliError> {
    let tools = resolve(resolver, platform)?;
    if json {
        return super::to_json(&tools);
    }

    let mut out = String::new();
    for (name, path) in tools.iter() {
        let _ = writeln!(out, "{name}\t{}", path.display());
    }
    Ok(out.trim_end().to_string())
}

/// `webp-static path <tool>`
pub fn path(
    resolver: &Resolver,
    tool: &str,
    platform: Option<PlatformKey>,
    json: bool,
) -> Result<String, CliError> {
    let tools = resolve(resolver, platform)?;
    let path = tools.require(tool)?;
    if json {
        return super::to_json(serde_json::json!({ "name": tool, "path": path }));
    }
    Ok(path.display().to_string())
}
