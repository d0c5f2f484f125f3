//! dashmig Engine - dashboard schema migration
//!
//! Brings a dashboard document saved by any earlier release up to the
//! current schema version by replaying one step per version, in order:
//! - Reads the stored `schemaVersion` (never failing; garbage reads as 0)
//! - Looks up the gap-free path of steps above it in the [`StepRegistry`]
//! - Applies each step in place, stamping the version after each one
//!
//! # Example
//!
//! ```
//! use dashmig_engine::{migrate, LATEST_VERSION};
//! use dashmig_document::Object;
//! use serde_json::json;
//!
//! let mut doc: Object = serde_json::from_value(json!({
//!     "schemaVersion": 17,
//!     "panels": [{"type": "gauge", "options-gauge": {"unit": "ms"}}]
//! }))
//! .unwrap();
//!
//! let report = migrate(&mut doc).unwrap();
//!
//! assert_eq!(report.from, 17);
//! assert_eq!(report.to, LATEST_VERSION);
//! assert_eq!(doc["panels"][0]["options"]["valueOptions"], json!({"unit": "ms"}));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod migrator;
pub mod registry;
pub mod step;
mod steps;

pub use config::{DatasourceEntry, MigratorConfig};
pub use error::{ConfigError, MigrationError, RegistryError, StepError};
pub use migrator::{migrate, migrate_value, MigrationReport, Migrator};
pub use registry::StepRegistry;
pub use step::{Step, StepContext, StepFn};
pub use steps::LATEST_VERSION;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for migrating dashboards
    pub use crate::{
        migrate, migrate_value, MigrationError, MigrationReport, Migrator, MigratorConfig,
        LATEST_VERSION,
    };
    pub use dashmig_document::{Object, ObjectExt};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
