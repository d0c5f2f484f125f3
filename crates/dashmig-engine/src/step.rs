//! Transformation step: one mutation bound to one target version

use dashmig_document::{write_schema_version, Object};

use crate::config::MigratorConfig;
use crate::error::StepError;

/// What a step sees besides the document
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Migrator configuration
    pub config: &'a MigratorConfig,
}

impl<'a> StepContext<'a> {
    /// Create context over a configuration
    #[inline]
    #[must_use]
    pub fn new(config: &'a MigratorConfig) -> Self {
        Self { config }
    }
}

/// Mutation function of a step
pub type StepFn = fn(&mut Object, &StepContext<'_>) -> Result<(), StepError>;

/// A transformation step bound to exactly one target version
#[derive(Clone, Copy)]
pub struct Step {
    /// Version the document is at after this step
    pub version: u32,
    /// One-line summary of the change
    pub description: &'static str,
    /// Mutation to apply
    pub apply: StepFn,
}

impl Step {
    /// Create step
    #[inline]
    #[must_use]
    pub const fn new(version: u32, description: &'static str, apply: StepFn) -> Self {
        Self {
            version,
            description,
            apply,
        }
    }

    /// Step that only bumps the version
    #[inline]
    #[must_use]
    pub const fn noop(version: u32) -> Self {
        Self::new(version, "version bump only", apply_nothing)
    }

    /// Apply the mutation, then set the version field to this step's version
    ///
    /// The version is written whether or not the mutation changed anything.
    ///
    /// # Errors
    /// Returns the step's error; the version field is left untouched then
    pub fn run(&self, doc: &mut Object, ctx: &StepContext<'_>) -> Result<(), StepError> {
        (self.apply)(doc, ctx)?;
        write_schema_version(doc, self.version);
        Ok(())
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("version", &self.version)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::unnecessary_wraps)]
fn apply_nothing(_doc: &mut Object, _ctx: &StepContext<'_>) -> Result<(), StepError> {
    Ok(())
}
