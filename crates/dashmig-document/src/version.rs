//! Schema version reader
//!
//! The version field has been written as an integer, a float, and a numeric
//! string by different producers over the years. Reading it never fails:
//! anything unrecognised is treated as version 0, which routes the document
//! through every migration step.

use serde_json::{Number, Value};

use crate::access::Object;

/// Reserved key holding the schema version
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Read the document's schema version
///
/// - absent, `null`, bool, array or object → `0`
/// - integer → that integer (negative → `0`)
/// - float → truncated toward zero (`40.2345` → `40`)
/// - string → parsed as an integer, `0` on failure
#[must_use]
pub fn read_schema_version(doc: &Object) -> u32 {
    match doc.get(SCHEMA_VERSION_KEY) {
        Some(Value::Number(n)) => from_number(n),
        Some(Value::String(s)) => s.parse::<i64>().map_or(0, clamp),
        _ => 0,
    }
}

/// Write the schema version field
#[inline]
pub fn write_schema_version(doc: &mut Object, version: u32) {
    doc.insert(SCHEMA_VERSION_KEY.to_owned(), Value::from(version));
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_number(n: &Number) -> u32 {
    if let Some(u) = n.as_u64() {
        return u32::try_from(u).unwrap_or(u32::MAX);
    }
    if n.as_i64().is_some() {
        // as_u64 failed, so the integer is negative
        return 0;
    }
    match n.as_f64() {
        // `as` saturates at u32::MAX
        Some(f) if f.is_finite() && f > 0.0 => f.trunc() as u32,
        _ => 0,
    }
}

fn clamp(v: i64) -> u32 {
    if v < 0 {
        0
    } else {
        u32::try_from(v).unwrap_or(u32::MAX)
    }
}
