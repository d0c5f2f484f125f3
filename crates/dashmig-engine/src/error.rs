//! Error types for the migration engine
//!
//! Provides error handling for:
//! - Step execution (a step refusing to produce an inconsistent structure)
//! - Registry construction (gaps, duplicates)
//! - Dispatch (unregistered target versions)
//! - Configuration loading

use std::path::PathBuf;

/// A step could not proceed without leaving an inconsistent structure
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// Structure at `path` cannot be converted consistently
    #[error("inconsistent structure at {path}: {reason}")]
    InconsistentStructure {
        /// Location inside the document (dot notation)
        path: String,
        /// Why the step gave up
        reason: String,
    },
}

impl StepError {
    /// Create inconsistent structure error
    pub fn inconsistent(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InconsistentStructure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors building a step registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No steps supplied
    #[error("registry has no steps")]
    Empty,

    /// First registered version is not 1
    #[error("registry must start at version 1, starts at {0}")]
    BadStart(u32),

    /// Two steps bound to the same version
    #[error("duplicate step for version {0}")]
    Duplicate(u32),

    /// Versions are not contiguous
    #[error("registry gap: no step between version {after} and {next}")]
    Gap {
        /// Last version before the gap
        after: u32,
        /// First version after the gap
        next: u32,
    },
}

/// Failure of a migration call
///
/// The document may already have advanced through some intermediate versions
/// when this is returned; no rollback happens.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Asked to migrate to a version no step is bound to
    #[error("no migration registered for schema version {target} (latest is {latest})")]
    UnregisteredTarget {
        /// Requested version
        target: u32,
        /// Highest registered version
        latest: u32,
    },

    /// A step failed
    #[error("migration to schema version {version} failed: {source}")]
    StepFailed {
        /// Target version of the failing step
        version: u32,
        /// Underlying cause
        #[source]
        source: StepError,
    },
}

impl MigrationError {
    /// Target version the failure is attributed to
    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        match self {
            Self::UnregisteredTarget { target, .. } => *target,
            Self::StepFailed { version, .. } => *version,
        }
    }

    /// Whether this is a configuration/programmer error rather than a step failure
    #[inline]
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::UnregisteredTarget { .. })
    }
}

/// Errors loading migrator configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not match the config schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
