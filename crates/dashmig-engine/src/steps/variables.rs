//! Template variable rewrites

use dashmig_document::{for_each_variable_mut, Object, ObjectExt};
use serde_json::{json, Value};

const LEGACY_TAG_KEYS: [&str; 4] = ["tags", "tagsQuery", "tagValuesQuery", "useTags"];

/// v6: default `datasource`, `type` and `allFormat`
pub(super) fn apply_query_defaults(doc: &mut Object) {
    for_each_variable_mut(doc, |variable| {
        variable.entry("datasource").or_insert(Value::Null);
        if variable.has_type("filter") || !variable.contains_key("type") {
            variable.insert("type".into(), json!("query"));
        }
        variable.entry("allFormat").or_insert_with(|| json!("glob"));
    });
}

/// v12: `refresh` → 1/0; `hideVariable`/`hideLabel` → `hide`
pub(super) fn normalize_refresh_and_hide(doc: &mut Object) {
    for_each_variable_mut(doc, |variable| {
        let refresh = u8::from(variable.is_truthy("refresh"));
        variable.insert("refresh".into(), json!(refresh));

        if variable.is_truthy("hideVariable") {
            variable.insert("hide".into(), json!(2));
        } else if variable.is_truthy("hideLabel") {
            variable.insert("hide".into(), json!(1));
        }
    });
}

/// v23: make `current.value`/`current.text` agree with `multi`
pub(super) fn align_current_with_multi(doc: &mut Object) {
    for_each_variable_mut(doc, |variable| {
        let Some(multi) = variable.get_bool("multi") else {
            return;
        };
        if !variable.is_truthy("current") {
            return;
        }
        let Some(current) = variable.get_object_mut("current") else {
            return;
        };
        for key in ["value", "text"] {
            if let Some(slot) = current.get_mut(key) {
                align(slot, multi);
            }
        }
    });
}

fn align(slot: &mut Value, multi: bool) {
    if multi {
        if !slot.is_array() {
            let single = slot.take();
            *slot = Value::Array(vec![single]);
        }
    } else if let Value::Array(items) = slot {
        let first = if items.is_empty() {
            json!("")
        } else {
            items.swap_remove(0)
        };
        *slot = first;
    }
}

/// v27: `constant` variables get a single selected option from `query`
///
/// Visible constants (`hide` 0 or 1) become `textbox` variables.
pub(super) fn upgrade_constants(doc: &mut Object) {
    for_each_variable_mut(doc, |variable| {
        if !variable.has_type("constant") {
            return;
        }
        if matches!(variable.get("hide").and_then(Value::as_i64), Some(0 | 1)) {
            variable.insert("type".into(), json!("textbox"));
        }
        let query = match variable.get("query") {
            None | Some(Value::Null) => json!(""),
            Some(query) => query.clone(),
        };
        let current = json!({ "selected": true, "text": query, "value": query });
        variable.insert("current".into(), current.clone());
        variable.insert("options".into(), json!([current]));
    });
}

/// v28: drop the tag-based option fields
pub(super) fn remove_tag_options(doc: &mut Object) {
    for_each_variable_mut(doc, |variable| {
        for key in LEGACY_TAG_KEYS {
            if variable.is_truthy(key) {
                variable.remove(key);
            }
        }
    });
}

/// v29: query variables refresh on load at least, and drop cached options
pub(super) fn reset_query_refresh(doc: &mut Object) {
    for_each_variable_mut(doc, |variable| {
        if !variable.has_type("query") {
            return;
        }
        if !matches!(variable.get("refresh").and_then(Value::as_i64), Some(1 | 2)) {
            variable.insert("refresh".into(), json!(1));
        }
        let has_options = variable
            .get("options")
            .and_then(Value::as_array)
            .is_some_and(|options| !options.is_empty());
        if has_options {
            variable.insert("options".into(), json!([]));
        }
    });
}
