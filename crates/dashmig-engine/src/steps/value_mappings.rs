//! Value mapping consolidation
//!
//! Legacy mappings are flat records with a numeric `type` (`1` value-to-text,
//! `2` range-to-text). Current mappings carry a string `type` and an
//! `options` block; every value-to-text entry of a list is folded into one
//! `value` mapping placed first.
//!
//! Colors come from the field's threshold steps: the step with the greatest
//! boundary not above the mapped value wins, a step without a boundary counting as
//! negative infinity.

use dashmig_document::{js_string, number_value, to_number, truthy, Object, ObjectExt};
use serde_json::{json, Number, Value};

const LEGACY_VALUE_TO_TEXT: u64 = 1;
const LEGACY_RANGE_TO_TEXT: u64 = 2;

/// Numeric legacy `type`; `1` and `1.0` read alike
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn legacy_kind(kind: &Number) -> Option<u64> {
    kind.as_u64().or_else(|| {
        kind.as_f64()
            .filter(|k| k.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(k))
            .map(|k| k as u64)
    })
}

/// Threshold steps of a field configuration
#[derive(Debug, Clone, Copy)]
struct Thresholds<'a> {
    steps: &'a [Value],
}

impl<'a> Thresholds<'a> {
    fn boundary(step: &Object) -> Option<f64> {
        match step.get("value") {
            None | Some(Value::Null) => Some(f64::NEG_INFINITY),
            Some(value) => value.as_f64(),
        }
    }

    fn objects(self) -> impl Iterator<Item = &'a Object> {
        self.steps.iter().filter_map(Value::as_object)
    }

    /// Color of the greatest step not above `sample`; later steps win ties
    fn color_for(self, sample: f64) -> Option<Value> {
        let mut active: Option<(f64, &Object)> = None;
        for step in self.objects() {
            let Some(boundary) = Self::boundary(step) else {
                continue;
            };
            if boundary > sample {
                continue;
            }
            if active.map_or(true, |(best, _)| boundary >= best) {
                active = Some((boundary, step));
            }
        }
        active.and_then(|(_, step)| Self::color(step))
    }

    /// Color of the unbounded base step
    fn base_color(self) -> Option<Value> {
        self.objects()
            .find(|step| matches!(step.get("value"), None | Some(Value::Null)))
            .and_then(Self::color)
    }

    fn color(step: &Object) -> Option<Value> {
        step.get("color").filter(|c| truthy(c)).cloned()
    }
}

fn mapping_result(legacy: &Object, color: Option<Value>) -> Value {
    let mut result = Object::new();
    if let Some(text) = legacy.get("text") {
        result.insert("text".into(), text.clone());
    }
    if let Some(color) = color {
        result.insert("color".into(), color);
    }
    Value::Object(result)
}

fn range_bound(legacy: &Object, key: &str) -> Value {
    legacy
        .get(key)
        .and_then(to_number)
        .map_or(Value::Null, number_value)
}

/// Consolidate one mapping list
fn upgrade_mappings(mappings: &[Value], thresholds: Option<Thresholds<'_>>) -> Vec<Value> {
    let mut value_map = Object::new();
    let mut has_value_map = false;
    let mut emitted = Vec::with_capacity(mappings.len());

    for entry in mappings {
        let Value::Object(mapping) = entry else {
            emitted.push(entry.clone());
            continue;
        };

        match mapping.get("type") {
            Some(Value::String(kind)) => match (kind.as_str(), mapping.get_object("options")) {
                ("value", Some(options)) => {
                    has_value_map = true;
                    value_map.extend(options.clone());
                }
                _ => emitted.push(entry.clone()),
            },
            Some(Value::Number(kind)) if legacy_kind(kind) == Some(LEGACY_VALUE_TO_TEXT) => {
                let value = match mapping.get("value") {
                    None | Some(Value::Null) => continue,
                    Some(value) => value,
                };
                if value.as_str() == Some("null") {
                    let color = thresholds.and_then(Thresholds::base_color);
                    emitted.push(json!({
                        "type": "special",
                        "options": { "match": "null", "result": mapping_result(mapping, color) },
                    }));
                } else {
                    let color = thresholds
                        .zip(to_number(value))
                        .and_then(|(t, sample)| t.color_for(sample));
                    has_value_map = true;
                    value_map.insert(js_string(value), mapping_result(mapping, color));
                }
            }
            Some(Value::Number(kind)) if legacy_kind(kind) == Some(LEGACY_RANGE_TO_TEXT) => {
                let from = range_bound(mapping, "from");
                let color = thresholds
                    .zip(from.as_f64())
                    .and_then(|(t, sample)| t.color_for(sample));
                emitted.push(json!({
                    "type": "range",
                    "options": {
                        "from": from,
                        "to": range_bound(mapping, "to"),
                        "result": mapping_result(mapping, color),
                    },
                }));
            }
            _ => emitted.push(entry.clone()),
        }
    }

    if has_value_map {
        emitted.insert(0, json!({ "type": "value", "options": value_map }));
    }
    emitted
}

/// v30: consolidate `fieldConfig.defaults.mappings` and every override's mappings
pub(super) fn upgrade_panel_mappings(panel: &mut Object) {
    let Some(field_config) = panel.get_object_mut("fieldConfig") else {
        return;
    };

    if let Some(defaults) = field_config.get_object_mut("defaults") {
        if let Some(mappings) = defaults.get_array_mut("mappings").map(std::mem::take) {
            let steps = defaults
                .get_object("thresholds")
                .map(|t| t.get_array("steps").map_or(&[][..], Vec::as_slice));
            let upgraded = upgrade_mappings(&mappings, steps.map(|steps| Thresholds { steps }));
            if let Some(slot) = defaults.get_array_mut("mappings") {
                *slot = upgraded;
            }
        }
    }

    let Some(overrides) = field_config.get_array_mut("overrides") else {
        return;
    };
    for properties in overrides
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .filter_map(|o| o.get_array_mut("properties"))
    {
        for property in properties.iter_mut().filter_map(Value::as_object_mut) {
            if property.get_str("id") != Some("mappings") {
                continue;
            }
            if let Some(mappings) = property.get_array_mut("value") {
                *mappings = upgrade_mappings(mappings, None);
            }
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

    fn upgraded(mappings: Value, thresholds: Option<Value>) -> Value {
        let mut defaults = json!({ "mappings": mappings });
        if let Some(thresholds) = thresholds {
            defaults["thresholds"] = thresholds;
        }
        let mut p = panel(json!({ "fieldConfig": { "defaults": defaults } }));
        upgrade_panel_mappings(&mut p);
        p["fieldConfig"]["defaults"]["mappings"].clone()
    }

    fn traffic_light() -> Value {
        json!({
            "mode": "absolute",
            "steps": [
                {"color": "green", "value": null},
                {"color": "orange", "value": 10},
                {"color": "red", "value": 80}
            ]
        })
    }

    #[test]
    fn legacy_value_and_range_mappings() {
        let out = upgraded(
            json!([
                {"type": 1, "value": "1", "text": "Up"},
                {"type": 1, "value": "0", "text": "Down"},
                {"from": "10", "to": "20", "text": "Medium", "type": 2}
            ]),
            None,
        );
        assert_eq!(
            out,
            json!([
                {"type": "value", "options": {"1": {"text": "Up"}, "0": {"text": "Down"}}},
                {"type": "range", "options": {"from": 10, "to": 20, "result": {"text": "Medium"}}}
            ])
        );
    }

    #[test]
    fn float_legacy_kinds_read_as_integers() {
        let out = upgraded(
            json!([
                {"type": 1.0, "value": "1", "text": "Up"},
                {"type": 2.0, "from": "1", "to": "2", "text": "x"},
                {"type": 1.5, "value": "7", "text": "odd"}
            ]),
            None,
        );
        assert_eq!(
            out,
            json!([
                {"type": "value", "options": {"1": {"text": "Up"}}},
                {"type": "range", "options": {"from": 1, "to": 2, "result": {"text": "x"}}},
                {"type": 1.5, "value": "7", "text": "odd"}
            ])
        );
    }

    #[test]
    fn value_map_goes_first_even_when_declared_last() {
        let out = upgraded(
            json!([
                {"type": 2, "from": "", "to": "5", "text": "low"},
                {"type": "regex", "options": {"pattern": ".*"}},
                {"type": 1, "value": 3, "text": "three"}
            ]),
            None,
        );
        assert_eq!(
            out,
            json!([
                {"type": "value", "options": {"3": {"text": "three"}}},
                {"type": "range", "options": {"from": 0, "to": 5, "result": {"text": "low"}}},
                {"type": "regex", "options": {"pattern": ".*"}}
            ])
        );
    }

    #[test]
    fn current_value_maps_merge_with_legacy() {
        let out = upgraded(
            json!([
                {"type": "value", "options": {"a": {"text": "A"}, "b": {"text": "B"}}},
                {"type": 1, "value": "b", "text": "bee"},
                {"type": "value", "options": {"c": {"text": "C"}}}
            ]),
            None,
        );
        assert_eq!(
            out,
            json!([{
                "type": "value",
                "options": {"a": {"text": "A"}, "b": {"text": "bee"}, "c": {"text": "C"}}
            }])
        );
    }

    #[test]
    fn colors_resolved_from_thresholds() {
        let out = upgraded(
            json!([
                {"type": 1, "value": "50", "text": "mid"},
                {"type": 1, "value": "-5", "text": "low"},
                {"type": 1, "value": "null", "text": "missing"},
                {"type": 2, "from": "80", "to": "100", "text": "high"}
            ]),
            Some(traffic_light()),
        );
        assert_eq!(
            out,
            json!([
                {
                    "type": "value",
                    "options": {
                        "50": {"text": "mid", "color": "orange"},
                        "-5": {"text": "low", "color": "green"}
                    }
                },
                {
                    "type": "special",
                    "options": {"match": "null", "result": {"text": "missing", "color": "green"}}
                },
                {
                    "type": "range",
                    "options": {"from": 80, "to": 100, "result": {"text": "high", "color": "red"}}
                }
            ])
        );
    }

    #[test]
    fn later_step_wins_on_equal_boundary() {
        let thresholds = json!({
            "steps": [
                {"color": "green", "value": null},
                {"color": "blue", "value": 10},
                {"color": "purple", "value": 10}
            ]
        });
        let out = upgraded(json!([{"type": 1, "value": 10, "text": "ten"}]), Some(thresholds));
        assert_eq!(
            out,
            json!([{"type": "value", "options": {"10": {"text": "ten", "color": "purple"}}}])
        );
    }

    #[test]
    fn no_color_without_qualifying_step() {
        let thresholds = json!({"steps": [{"color": "red", "value": 100}]});
        let out = upgraded(json!([{"type": 1, "value": 5, "text": "five"}]), Some(thresholds));
        assert_eq!(out, json!([{"type": "value", "options": {"5": {"text": "five"}}}]));
    }

    #[test]
    fn unparseable_range_bounds_become_null() {
        let out = upgraded(json!([{"type": 2, "from": "abc", "text": "?"}]), None);
        assert_eq!(
            out,
            json!([{"type": "range", "options": {"from": null, "to": null, "result": {"text": "?"}}}])
        );
    }

    #[test]
    fn legacy_values_without_value_dropped() {
        let out = upgraded(json!([{"type": 1, "text": "orphan"}, {"type": 7, "x": 1}]), None);
        assert_eq!(out, json!([{"type": 7, "x": 1}]));
    }

    #[test]
    fn overrides_upgraded_without_thresholds() {
        let mut p = panel(json!({
            "fieldConfig": {
                "defaults": {"thresholds": traffic_light()},
                "overrides": [{
                    "matcher": {"id": "byName", "options": "status"},
                    "properties": [
                        {"id": "mappings", "value": [{"type": 1, "value": "1", "text": "OK"}]},
                        {"id": "unit", "value": "short"}
                    ]
                }]
            }
        }));
        upgrade_panel_mappings(&mut p);
        assert_eq!(
            p["fieldConfig"]["overrides"][0]["properties"],
            json!([
                {"id": "mappings", "value": [{"type": "value", "options": {"1": {"text": "OK"}}}]},
                {"id": "unit", "value": "short"}
            ])
        );
        assert!(p["fieldConfig"]["defaults"].get("mappings").is_none());
    }

    #[test]
    fn panels_without_field_config_untouched() {
        let original = json!({"type": "stat", "mappings": [{"type": 1, "value": "1"}]});
        let mut p = panel(original.clone());
        upgrade_panel_mappings(&mut p);
        assert_eq!(Value::Object(p), original);
    }
}
