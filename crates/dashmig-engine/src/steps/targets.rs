//! Panel query target rewrites

use std::collections::HashSet;

use dashmig_document::{truthy, Object, ObjectExt};
use serde_json::{json, Value};

const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Letter id for a target index: `A`..`Z`, then `AA`, `AB`, ...
fn ref_id(mut index: usize) -> String {
    let mut id = String::new();
    loop {
        id.insert(0, char::from(LETTERS[index % LETTERS.len()]));
        if index < LETTERS.len() {
            return id;
        }
        index = index / LETTERS.len() - 1;
    }
}

/// v7: give every target without a truthy `refId` the first unused letter
pub(super) fn assign_ref_ids(panel: &mut Object) {
    let Some(targets) = panel.get_array_mut("targets") else {
        return;
    };

    let mut used: HashSet<String> = targets
        .iter()
        .filter_map(|t| t.get("refId").and_then(Value::as_str))
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect();
    let mut candidates = (0..).map(ref_id);

    for target in targets.iter_mut().filter_map(Value::as_object_mut) {
        if target.is_truthy("refId") {
            continue;
        }
        let Some(id) = candidates.by_ref().find(|id| !used.contains(id)) else {
            return;
        };
        used.insert(id.clone());
        target.insert("refId".into(), json!(id));
    }
}

/// v8: legacy InfluxDB targets (`fields` + `tags` + `groupBy`) → `select` parts
pub(super) fn upgrade_influx_targets(panel: &mut Object) {
    let Some(targets) = panel.get_array_mut("targets") else {
        return;
    };
    for target in targets.iter_mut().filter_map(Value::as_object_mut) {
        if ["fields", "tags", "groupBy"].iter().all(|key| target.is_truthy(key)) {
            upgrade_influx_target(target);
        }
    }
}

fn upgrade_influx_target(target: &mut Object) {
    if target.is_truthy("rawQuery") {
        target.remove("fields");
        target.remove("fill");
        return;
    }

    let select: Vec<Value> = match target.remove("fields") {
        Some(Value::Array(fields)) => fields.iter().map(select_parts).collect(),
        _ => Vec::new(),
    };
    target.insert("select".into(), Value::Array(select));

    if let Some(group_by) = target.get_array_mut("groupBy") {
        for part in group_by.iter_mut().filter_map(Value::as_object_mut) {
            if part.has_type("time") {
                move_to_params(part, "interval");
            } else if part.has_type("tag") {
                move_to_params(part, "key");
            }
        }
    }

    if target.is_truthy("fill") {
        if let Some(fill) = target.remove("fill") {
            if let Some(group_by) = target.get_array_mut("groupBy") {
                group_by.push(json!({ "type": "fill", "params": [fill] }));
            }
        }
    }
}

fn select_parts(field: &Value) -> Value {
    let get = |key: &str| field.get(key).cloned();
    let mut parts = vec![json!({
        "type": "field",
        "params": [get("name").unwrap_or(Value::Null)],
    })];

    let mut func = Object::new();
    if let Some(kind) = get("func") {
        func.insert("type".into(), kind);
    }
    func.insert("params".into(), json!([]));
    parts.push(Value::Object(func));

    for (key, kind) in [("mathExpr", "math"), ("asExpr", "alias")] {
        if let Some(expr) = get(key).filter(truthy) {
            parts.push(json!({ "type": kind, "params": [expr] }));
        }
    }
    Value::Array(parts)
}

fn move_to_params(part: &mut Object, key: &str) {
    if !part.is_truthy(key) {
        return;
    }
    if let Some(value) = part.remove(key) {
        part.insert("params".into(), json!([value]));
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
    fn letter_ids() {
        assert_eq!(ref_id(0), "A");
        assert_eq!(ref_id(25), "Z");
        assert_eq!(ref_id(26), "AA");
        assert_eq!(ref_id(27), "AB");
        assert_eq!(ref_id(52), "BA");
    }

    #[test]
    fn missing_ref_ids_take_free_letters() {
        let mut p = panel(json!({
            "targets": [{"expr": "a"}, {"refId": "A"}, {"refId": ""}, {"refId": "C"}]
        }));
        assign_ref_ids(&mut p);
        assert_eq!(
            p["targets"],
            json!([{"expr": "a", "refId": "B"}, {"refId": "A"}, {"refId": "D"}, {"refId": "C"}])
        );
    }

    #[test]
    fn panels_without_targets_untouched() {
        let mut p = panel(json!({"type": "text"}));
        assign_ref_ids(&mut p);
        upgrade_influx_targets(&mut p);
        assert_eq!(Value::Object(p), json!({"type": "text"}));
    }

    #[test]
    fn influx_fields_become_select() {
        let mut p = panel(json!({
            "targets": [{
                "fields": [{"name": "value", "func": "mean", "mathExpr": "*2", "asExpr": "doubled"}],
                "tags": [{"key": "host"}],
                "groupBy": [{"type": "time", "interval": "10s"}, {"type": "tag", "key": "host"}],
                "fill": "null"
            }]
        }));
        upgrade_influx_targets(&mut p);
        assert_eq!(
            p["targets"],
            json!([{
                "tags": [{"key": "host"}],
                "groupBy": [
                    {"type": "time", "params": ["10s"]},
                    {"type": "tag", "params": ["host"]},
                    {"type": "fill", "params": ["null"]}
                ],
                "select": [[
                    {"type": "field", "params": ["value"]},
                    {"type": "mean", "params": []},
                    {"type": "math", "params": ["*2"]},
                    {"type": "alias", "params": ["doubled"]}
                ]]
            }])
        );
    }

    #[test]
    fn raw_influx_queries_drop_fields() {
        let mut p = panel(json!({
            "targets": [{
                "rawQuery": true, "query": "SELECT 1",
                "fields": [{"name": "v"}], "tags": [1], "groupBy": [1], "fill": "0"
            }]
        }));
        upgrade_influx_targets(&mut p);
        assert_eq!(
            p["targets"],
            json!([{"rawQuery": true, "query": "SELECT 1", "tags": [1], "groupBy": [1]}])
        );
    }

    #[test]
    fn non_influx_targets_untouched() {
        let original = json!({"targets": [{"fields": [1], "groupBy": [1]}]});
        let mut p = panel(original.clone());
        upgrade_influx_targets(&mut p);
        assert_eq!(Value::Object(p), original);
    }
}
