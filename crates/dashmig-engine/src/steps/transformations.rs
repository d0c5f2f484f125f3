//! Transformation-list editing
//!
//! Two table-driven edits over a panel's `transformations` sequence: insert
//! a fixed entry after every trigger, or replace every trigger with a
//! differently-shaped entry. Panels with no trigger are not written to.

use dashmig_document::{Object, ObjectExt};
use serde_json::{json, Value};

/// Insert `{id: inserted, options: {}}` after every `trigger` entry
#[derive(Debug, Clone, Copy)]
pub(super) struct InsertRule {
    pub(super) trigger: &'static str,
    pub(super) inserted: &'static str,
}

/// Replace every `trigger` entry with `{id: target, options}`
///
/// `options` holds each renamed source option that is present and not
/// empty, followed by the fixed options.
#[derive(Debug, Clone, Copy)]
pub(super) struct ConversionRule {
    pub(super) trigger: &'static str,
    pub(super) target: &'static str,
    pub(super) renamed_options: &'static [(&'static str, &'static str)],
    pub(super) fixed_options: &'static [(&'static str, &'static str)],
}

pub(super) const MERGE_AFTER_LABELS_TO_FIELDS: InsertRule = InsertRule {
    trigger: "labelsToFields",
    inserted: "merge",
};

pub(super) const SERIES_TO_COLUMNS_TO_JOIN_BY_FIELD: ConversionRule = ConversionRule {
    trigger: "seriesToColumns",
    target: "joinByField",
    renamed_options: &[("byField", "byField")],
    fixed_options: &[("mode", "outer")],
};

fn has_id(entry: &Value, id: &str) -> bool {
    entry.get("id").and_then(Value::as_str) == Some(id)
}

fn is_empty_option(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Transformation list of `panel`, only when some entry is a `trigger`
fn triggered<'a>(panel: &'a mut Object, trigger: &str) -> Option<&'a mut Vec<Value>> {
    panel
        .get_array_mut("transformations")
        .filter(|list| list.iter().any(|entry| has_id(entry, trigger)))
}

pub(super) fn insert_after(panel: &mut Object, rule: &InsertRule) {
    let Some(list) = triggered(panel, rule.trigger) else {
        return;
    };
    let original = std::mem::take(list);
    let mut edited = Vec::with_capacity(original.len() + 1);
    for entry in original {
        let hit = has_id(&entry, rule.trigger);
        edited.push(entry);
        if hit {
            edited.push(json!({ "id": rule.inserted, "options": {} }));
        }
    }
    *list = edited;
}

impl ConversionRule {
    fn convert(&self, source: &Value) -> Value {
        let mut options = Object::new();
        if let Some(source_options) = source.get("options").and_then(Value::as_object) {
            for (from, to) in self.renamed_options {
                if let Some(value) = source_options.get(*from).filter(|v| !is_empty_option(v)) {
                    options.insert((*to).to_owned(), value.clone());
                }
            }
        }
        for (key, value) in self.fixed_options {
            options.insert((*key).to_owned(), json!(value));
        }
        json!({ "id": self.target, "options": options })
    }
}

pub(super) fn convert(panel: &mut Object, rule: &ConversionRule) {
    let Some(list) = triggered(panel, rule.trigger) else {
        return;
    };
    for entry in list.iter_mut() {
        if has_id(entry, rule.trigger) {
            *entry = rule.convert(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn panel(value: Value) -> Object {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn merge_inserted_after_each_trigger() {
        let mut p = panel(json!({
            "transformations": [
                {"id": "labelsToFields", "options": {"valueLabel": "x"}},
                {"id": "calc"},
                {"id": "labelsToFields"}
            ]
        }));
        insert_after(&mut p, &MERGE_AFTER_LABELS_TO_FIELDS);
        assert_eq!(
            p["transformations"],
            json!([
                {"id": "labelsToFields", "options": {"valueLabel": "x"}},
                {"id": "merge", "options": {}},
                {"id": "calc"},
                {"id": "labelsToFields"},
                {"id": "merge", "options": {}}
            ])
        );
    }

    #[test]
    fn untriggered_lists_untouched() {
        let original = json!({"transformations": [{"id": "calc"}, "odd"]});
        let mut p = panel(original.clone());
        insert_after(&mut p, &MERGE_AFTER_LABELS_TO_FIELDS);
        convert(&mut p, &SERIES_TO_COLUMNS_TO_JOIN_BY_FIELD);
        assert_eq!(Value::Object(p), original);

        let mut none = panel(json!({"type": "graph"}));
        insert_after(&mut none, &MERGE_AFTER_LABELS_TO_FIELDS);
        assert_eq!(Value::Object(none), json!({"type": "graph"}));
    }

    #[test]
    fn series_to_columns_converted() {
        let mut p = panel(json!({
            "transformations": [
                {"id": "seriesToColumns", "options": {"byField": "Time"}},
                {"id": "organize", "options": {}},
                {"id": "seriesToColumns", "options": {"byField": ""}},
                {"id": "seriesToColumns"}
            ]
        }));
        convert(&mut p, &SERIES_TO_COLUMNS_TO_JOIN_BY_FIELD);
        assert_eq!(
            p["transformations"],
            json!([
                {"id": "joinByField", "options": {"byField": "Time", "mode": "outer"}},
                {"id": "organize", "options": {}},
                {"id": "joinByField", "options": {"mode": "outer"}},
                {"id": "joinByField", "options": {"mode": "outer"}}
            ])
        );
    }
}
