//! Migration dispatcher
//!
//! Reads the document's version and runs every registered step above it, in
//! ascending order, stopping at the first failure. Intermediate steps are
//! never skipped, even for documents that already look like a later version.

use dashmig_document::{read_schema_version, Object};
use serde_json::Value;

use crate::config::MigratorConfig;
use crate::error::MigrationError;
use crate::registry::StepRegistry;
use crate::step::StepContext;

/// Outcome of a successful migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version read from the document
    pub from: u32,
    /// Version the document is at now
    pub to: u32,
    /// Versions whose steps ran, ascending
    pub applied: Vec<u32>,
}

impl MigrationReport {
    /// Whether no step ran
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Migration dispatcher
///
/// Stateless apart from its configuration and a shared, read-only registry;
/// one `Migrator` can serve any number of documents, including from several
/// threads at once as long as each document has a single writer.
#[derive(Debug, Clone)]
pub struct Migrator {
    registry: &'static StepRegistry,
    config: MigratorConfig,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator {
    /// Create migrator over the built-in registry with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MigratorConfig::default())
    }

    /// Create migrator with configuration
    #[inline]
    #[must_use]
    pub fn with_config(config: MigratorConfig) -> Self {
        Self {
            registry: StepRegistry::builtin(),
            config,
        }
    }

    /// Use a different registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: &'static StepRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'static StepRegistry {
        self.registry
    }

    /// Version [`Migrator::migrate`] brings documents to
    #[inline]
    #[must_use]
    pub fn target_version(&self) -> u32 {
        self.config
            .target_version
            .unwrap_or_else(|| self.registry.latest())
    }

    /// Versions a migration of `doc` would apply, without touching it
    ///
    /// # Errors
    /// Returns [`MigrationError::UnregisteredTarget`] if the configured target
    /// is above the latest registered version
    pub fn plan(&self, doc: &Object) -> Result<Vec<u32>, MigrationError> {
        let current = read_schema_version(doc);
        let path = self.registry.path(current, self.target_version())?;
        Ok(path.iter().map(|step| step.version).collect())
    }

    /// Migrate `doc` in place to the configured target version
    ///
    /// # Errors
    /// Returns the first step failure, or a configuration error if the target
    /// is not registered. The document keeps whatever steps already ran.
    pub fn migrate(&self, doc: &mut Object) -> Result<MigrationReport, MigrationError> {
        self.migrate_to(doc, self.target_version())
    }

    /// Migrate `doc` in place to `target`
    ///
    /// # Errors
    /// See [`Migrator::migrate`]
    pub fn migrate_to(
        &self,
        doc: &mut Object,
        target: u32,
    ) -> Result<MigrationReport, MigrationError> {
        let from = read_schema_version(doc);
        let path = self.registry.path(from, target)?;
        let ctx = StepContext::new(&self.config);

        let mut applied = Vec::with_capacity(path.len());
        for step in path {
            tracing::debug!(version = step.version, step = step.description, "applying step");
            step.run(doc, &ctx).map_err(|source| {
                tracing::warn!(version = step.version, error = %source, "migration step failed");
                MigrationError::StepFailed {
                    version: step.version,
                    source,
                }
            })?;
            applied.push(step.version);
        }

        let to = applied.last().copied().unwrap_or(from);
        if !applied.is_empty() {
            tracing::info!(from, to, steps = applied.len(), "dashboard migrated");
        }
        Ok(MigrationReport { from, to, applied })
    }

    /// Migrate a bare JSON value
    ///
    /// Non-object roots are not dashboards and are left untouched.
    ///
    /// # Errors
    /// See [`Migrator::migrate`]
    pub fn migrate_value(&self, value: &mut Value) -> Result<MigrationReport, MigrationError> {
        match value {
            Value::Object(doc) => self.migrate(doc),
            _ => {
                tracing::debug!("document root is not an object; nothing to migrate");
                Ok(MigrationReport {
                    from: 0,
                    to: 0,
                    applied: Vec::new(),
                })
            }
        }
    }
}

/// Migrate `doc` to the latest version with the built-in registry
///
/// # Errors
/// See [`Migrator::migrate`]
pub fn migrate(doc: &mut Object) -> Result<MigrationReport, MigrationError> {
    Migrator::new().migrate(doc)
}

/// Migrate a bare JSON value to the latest version
///
/// # Errors
/// See [`Migrator::migrate`]
pub fn migrate_value(value: &mut Value) -> Result<MigrationReport, MigrationError> {
    Migrator::new().migrate_value(value)
}
