//! Dashboard files on disk: JSON or YAML, chosen by extension

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `.yaml`/`.yml` (any case) is YAML, everything else JSON
    pub(crate) fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

pub(crate) fn parse(raw: &str, format: Format) -> Result<Value> {
    let value = match format {
        Format::Json => serde_json::from_str(raw).context("invalid JSON")?,
        Format::Yaml => serde_yaml::from_str(raw).context("invalid YAML")?,
    };
    Ok(value)
}

pub(crate) fn load(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse(&raw, Format::from_path(path)).with_context(|| format!("parsing {}", path.display()))
}

/// Serialize for output, always newline-terminated
pub(crate) fn render(value: &Value, format: Format, pretty: bool) -> Result<String> {
    let mut out = match format {
        Format::Json if pretty => serde_json::to_string_pretty(value)?,
        Format::Json => serde_json::to_string(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

pub(crate) fn store(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))
}
