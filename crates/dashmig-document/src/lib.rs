//! dashmig Document Model
//!
//! A dashboard is kept as a plain `serde_json` object tree rather than a
//! typed struct per schema version: steps read what they need through
//! narrow, optional accessors and leave everything else untouched.
//!
//! # Core Concepts
//!
//! - [`Object`] / [`ObjectExt`]: "try-get-as-T" accessors that return `None`
//!   on absence *and* on type mismatch
//! - [`read_schema_version`]: the never-failing version reader
//! - [`panels`] / [`for_each_panel_mut`]: panel traversal, including panels
//!   nested in `row` containers
//!
//! # Example
//!
//! ```
//! use dashmig_document::{for_each_panel_mut, read_schema_version, Object, ObjectExt};
//! use serde_json::json;
//!
//! let mut doc: Object = serde_json::from_value(json!({
//!     "schemaVersion": "17",
//!     "panels": [{"type": "row", "panels": [{"type": "graphite"}]}]
//! }))
//! .unwrap();
//!
//! assert_eq!(read_schema_version(&doc), 17);
//!
//! let mut graphite = 0;
//! for_each_panel_mut(&mut doc, |panel| {
//!     if panel.has_type("graphite") {
//!         graphite += 1;
//!     }
//! });
//! assert_eq!(graphite, 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod access;
mod traverse;
mod version;

pub use access::{js_string, number_value, to_number, truthy, Object, ObjectExt};
pub use traverse::{
    for_each_panel_mut, for_each_variable_mut, is_row, panels, walk_panels_mut, Panels,
    MAX_ROW_DEPTH, ROW_PANEL_TYPE,
};
pub use version::{read_schema_version, write_schema_version, SCHEMA_VERSION_KEY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
