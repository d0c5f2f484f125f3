//! Typed accessors over loosely-typed JSON objects
//!
//! Dashboards arrive in whatever shape the release that saved them produced.
//! Every accessor here answers "is this key present *and* of the type I
//! need?" with an `Option`, so a missing key and a key of the wrong shape
//! look identical to callers and both lead to a no-op.

use serde_json::{Map, Number, Value};

/// A JSON object: a dashboard, a panel, or any nested configuration block
pub type Object = Map<String, Value>;

/// "Try-get-as-T" accessors for [`Object`]
pub trait ObjectExt {
    /// Nested object at `key`
    fn get_object(&self, key: &str) -> Option<&Object>;

    /// Mutable nested object at `key`
    fn get_object_mut(&mut self, key: &str) -> Option<&mut Object>;

    /// Array at `key`
    fn get_array(&self, key: &str) -> Option<&Vec<Value>>;

    /// Mutable array at `key`
    fn get_array_mut(&mut self, key: &str) -> Option<&mut Vec<Value>>;

    /// String at `key`
    fn get_str(&self, key: &str) -> Option<&str>;

    /// Number at `key` as `f64` (strings are not coerced)
    fn get_f64(&self, key: &str) -> Option<f64>;

    /// Boolean at `key`
    fn get_bool(&self, key: &str) -> Option<bool>;

    /// JS truthiness of the value at `key`; absent keys are falsy
    fn is_truthy(&self, key: &str) -> bool;

    /// Whether the `type` discriminator equals `type_name`
    fn has_type(&self, type_name: &str) -> bool;

    /// Object at `key`, created (or replacing a non-object value) if needed
    fn ensure_object(&mut self, key: &str) -> &mut Object;

    /// Array at `key`, created (or replacing a non-array value) if needed
    fn ensure_array(&mut self, key: &str) -> &mut Vec<Value>;
}

impl ObjectExt for Object {
    #[inline]
    fn get_object(&self, key: &str) -> Option<&Object> {
        self.get(key).and_then(Value::as_object)
    }

    #[inline]
    fn get_object_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.get_mut(key).and_then(Value::as_object_mut)
    }

    #[inline]
    fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    #[inline]
    fn get_array_mut(&mut self, key: &str) -> Option<&mut Vec<Value>> {
        self.get_mut(key).and_then(Value::as_array_mut)
    }

    #[inline]
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    #[inline]
    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    #[inline]
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    #[inline]
    fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(truthy)
    }

    #[inline]
    fn has_type(&self, type_name: &str) -> bool {
        self.get_str("type") == Some(type_name)
    }

    fn ensure_object(&mut self, key: &str) -> &mut Object {
        let slot = self
            .entry(key)
            .or_insert_with(|| Value::Object(Object::new()));
        if !slot.is_object() {
            *slot = Value::Object(Object::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot holds an object"),
        }
    }

    fn ensure_array(&mut self, key: &str) -> &mut Vec<Value> {
        let slot = self.entry(key).or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(items) => items,
            _ => unreachable!("slot holds an array"),
        }
    }
}

/// JS truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Canonical JSON encoding for a computed number
///
/// Integral values are written as JSON integers so `10.0` and `10` compare
/// equal downstream; non-finite values have no JSON form and become `null`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn number_value(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

/// JS `Number(value)` / unary plus coercion
///
/// Empty or blank strings coerce to `0`, as do `null` and `false`.
/// Returns `None` where JS would produce `NaN`.
#[must_use]
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null | Value::Bool(false) => Some(0.0),
        Value::Bool(true) => Some(1.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|f| !f.is_nan())
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// JS `String(value)` for use as a map key
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn js_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            (None, None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e21 => {
                format!("{}", f as i128)
            }
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn accessors_reject_wrong_types() {
        let obj = object(json!({"a": "text", "b": 3, "c": [1], "d": {"x": 1}, "e": true}));

        assert_eq!(obj.get_str("a"), Some("text"));
        assert_eq!(obj.get_str("b"), None);
        assert_eq!(obj.get_f64("b"), Some(3.0));
        assert_eq!(obj.get_f64("a"), None);
        assert!(obj.get_array("c").is_some());
        assert!(obj.get_array("d").is_none());
        assert!(obj.get_object("d").is_some());
        assert_eq!(obj.get_bool("e"), Some(true));
        assert_eq!(obj.get_bool("missing"), None);
    }

    #[test]
    fn truthiness_matches_js() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(0.0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("0")));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
        assert!(truthy(&json!(-1)));
    }

    #[test]
    fn ensure_object_creates_and_replaces() {
        let mut obj = object(json!({"scalar": 5}));

        obj.ensure_object("fresh").insert("k".into(), json!(1));
        obj.ensure_object("scalar").insert("k".into(), json!(2));

        assert_eq!(Value::Object(obj), json!({"scalar": {"k": 2}, "fresh": {"k": 1}}));
    }

    #[test]
    fn ensure_object_keeps_existing_contents() {
        let mut obj = object(json!({"templating": {"enable": true}}));
        obj.ensure_object("templating").insert("list".into(), json!([]));

        assert_eq!(
            obj.get("templating"),
            Some(&json!({"enable": true, "list": []}))
        );
    }

    #[test]
    fn ensure_array_replaces_non_arrays() {
        let mut obj = object(json!({"y_formats": "short"}));
        obj.ensure_array("y_formats").push(json!("ms"));
        assert_eq!(obj.get("y_formats"), Some(&json!(["ms"])));
    }

    #[test]
    fn number_value_prefers_integers() {
        assert_eq!(number_value(10.0), json!(10));
        assert_eq!(number_value(-3.0), json!(-3));
        assert_eq!(number_value(2.5), json!(2.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
        assert_eq!(number_value(f64::INFINITY), Value::Null);
    }

    #[test]
    fn to_number_follows_unary_plus() {
        assert_eq!(to_number(&json!("10")), Some(10.0));
        assert_eq!(to_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(to_number(&json!("")), Some(0.0));
        assert_eq!(to_number(&json!(null)), Some(0.0));
        assert_eq!(to_number(&json!("abc")), None);
        assert_eq!(to_number(&json!({})), None);
    }

    #[test]
    fn js_string_formats_like_string_constructor() {
        assert_eq!(js_string(&json!("1")), "1");
        assert_eq!(js_string(&json!(1)), "1");
        assert_eq!(js_string(&json!(1.0)), "1");
        assert_eq!(js_string(&json!(1.5)), "1.5");
        assert_eq!(js_string(&json!(true)), "true");
        assert_eq!(js_string(&json!(null)), "null");
    }
}
