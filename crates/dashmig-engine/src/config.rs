//! Migrator configuration
//!
//! Everything a step needs from outside the document: the version to stop
//! at, the datasource table used to resolve legacy datasource names, and
//! which panel plugins are installed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A datasource known to the host, used to turn names into references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceEntry {
    /// Display name legacy dashboards refer to
    pub name: String,
    /// Stable identifier
    pub uid: String,
    /// Plugin type id (`prometheus`, `loki`, ...)
    #[serde(rename = "type")]
    pub kind: String,
}

impl DatasourceEntry {
    /// Create datasource entry
    pub fn new(name: impl Into<String>, uid: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
            kind: kind.into(),
        }
    }
}

/// Migrator configuration
///
/// # Example
///
/// ```
/// use dashmig_engine::MigratorConfig;
///
/// let config = MigratorConfig::from_toml_str(r#"
///     target_version = 30
///
///     [[datasources]]
///     name = "gdev-prometheus"
///     uid = "PBFA97CFB590B2093"
///     type = "prometheus"
/// "#).unwrap();
///
/// assert_eq!(config.target_version, Some(30));
/// assert!(config.lookup_datasource("gdev-prometheus").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    /// Stop at this version instead of the latest registered one
    pub target_version: Option<u32>,

    /// Datasources available for name → reference resolution
    pub datasources: Vec<DatasourceEntry>,

    /// Whether the external singlestat panel plugin is installed
    pub singlestat_plugin_installed: bool,
}

impl MigratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With target version
    #[inline]
    #[must_use]
    pub fn with_target_version(mut self, version: u32) -> Self {
        self.target_version = Some(version);
        self
    }

    /// With an additional datasource
    #[inline]
    #[must_use]
    pub fn with_datasource(mut self, entry: DatasourceEntry) -> Self {
        self.datasources.push(entry);
        self
    }

    /// With singlestat plugin availability
    #[inline]
    #[must_use]
    pub fn with_singlestat_plugin(mut self, installed: bool) -> Self {
        self.singlestat_plugin_installed = installed;
        self
    }

    /// Parse from a TOML string
    ///
    /// # Errors
    /// Returns error if the TOML is invalid or does not match the schema
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&raw)
    }

    /// Find a datasource by name, falling back to uid
    #[must_use]
    pub fn lookup_datasource(&self, name_or_uid: &str) -> Option<&DatasourceEntry> {
        self.datasources
            .iter()
            .find(|ds| ds.name == name_or_uid)
            .or_else(|| self.datasources.iter().find(|ds| ds.uid == name_or_uid))
    }
}
