use anyhow::Context;
use std::path::Path;
use tracing::debug;

use super::types::RouteConfig;

/// Read a route configuration file.
///
/// `.yaml` / `.yml` files are parsed as YAML, everything else as JSON.
///
/// # Errors
///
/// Fails when the file cannot be read or does not deserialize.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<RouteConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading route config {}", path.display()))?;
    let config = parse_config(&content, is_yaml(path))
        .with_context(|| format!("parsing route config {}", path.display()))?;

    debug!(
        path = %path.display(),
        domains_count = config.domains.len(),
        "Route config loaded"
    );
    Ok(config)
}

/// Parse configuration text.
///
/// # Errors
///
/// Fails when the text does not deserialize.
pub fn parse_config(content: &str, yaml: bool) -> anyhow::Result<RouteConfig> {
    let config: RouteConfig = if yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}
