//! Datasource names → datasource references
//!
//! Older dashboards name their datasource; current ones carry a `{type, uid}`
//! reference. Names are resolved through the configured datasource table.
//! Unknown names keep working as a bare `{uid: name}` reference, and the
//! empty name or `default` mean "the default datasource" (`null`).

use dashmig_document::{for_each_variable_mut, truthy, Object, ObjectExt};
use serde_json::{json, Value};

use crate::config::MigratorConfig;

/// Panel datasource marking per-query datasources
pub(super) const MIXED_DATASOURCE: &str = "-- Mixed --";

fn name_to_ref(name: &str, config: &MigratorConfig) -> Value {
    if name.is_empty() || name == "default" {
        return Value::Null;
    }
    match config.lookup_datasource(name) {
        Some(entry) => json!({ "type": entry.kind, "uid": entry.uid }),
        None => {
            tracing::debug!(datasource = name, "datasource not configured; keeping name as uid");
            json!({ "uid": name })
        }
    }
}

/// Replace a string datasource in `slot`; anything else is left as is
fn migrate_slot(slot: &mut Value, config: &MigratorConfig) {
    if let Value::String(name) = slot {
        *slot = name_to_ref(name, config);
    }
}

/// v33: query variables with a named datasource
pub(super) fn migrate_variable_datasources(doc: &mut Object, config: &MigratorConfig) {
    for_each_variable_mut(doc, |variable| {
        if !variable.has_type("query") || !variable.is_truthy("datasource") {
            return;
        }
        if let Some(slot) = variable.get_mut("datasource") {
            migrate_slot(slot, config);
        }
    });
}

/// v33: panel datasource and its targets
///
/// A mixed panel keeps per-target datasources, each resolved. Any other
/// panel gets its own datasource resolved and its targets' datasources
/// removed, with `targets` created empty when absent.
pub(super) fn migrate_panel_datasource(panel: &mut Object, config: &MigratorConfig) {
    match panel.get("datasource") {
        Some(Value::Object(_)) => return,
        Some(Value::String(name)) if name == MIXED_DATASOURCE => {
            panel.insert("datasource".into(), json!({ "uid": MIXED_DATASOURCE }));
            if let Some(targets) = panel.get_array_mut("targets") {
                for target in targets.iter_mut().filter_map(Value::as_object_mut) {
                    if let Some(slot) = target.get_mut("datasource") {
                        migrate_slot(slot, config);
                    }
                }
            }
            return;
        }
        Some(name) if truthy(name) => {
            if let Some(slot) = panel.get_mut("datasource") {
                migrate_slot(slot, config);
            }
        }
        _ => {
            panel.insert("datasource".into(), Value::Null);
        }
    }

    match panel.get_array_mut("targets") {
        Some(targets) => {
            for target in targets.iter_mut().filter_map(Value::as_object_mut) {
                target.remove("datasource");
            }
        }
        None => {
            panel.insert("targets".into(), json!([]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasourceEntry;
    use pretty_assertions::assert_eq;

    fn config() -> MigratorConfig {
        MigratorConfig::new()
            .with_datasource(DatasourceEntry::new("Prometheus", "prom-uid", "prometheus"))
            .with_datasource(DatasourceEntry::new("Loki", "loki-uid", "loki"))
    }

    fn panel(value: Value) -> Object {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn names_resolved() {
        let cfg = config();
        assert_eq!(name_to_ref("Prometheus", &cfg), json!({"type": "prometheus", "uid": "prom-uid"}));
        assert_eq!(name_to_ref("loki-uid", &cfg), json!({"type": "loki", "uid": "loki-uid"}));
        assert_eq!(name_to_ref("Graphite", &cfg), json!({"uid": "Graphite"}));
        assert_eq!(name_to_ref("default", &cfg), Value::Null);
        assert_eq!(name_to_ref("", &cfg), Value::Null);
    }

    #[test]
    fn named_panel_resolved_and_targets_cleaned() {
        let mut p = panel(json!({
            "datasource": "Prometheus",
            "targets": [{"refId": "A", "datasource": "Prometheus"}, {"refId": "B"}]
        }));
        migrate_panel_datasource(&mut p, &config());
        assert_eq!(
            Value::Object(p),
            json!({
                "datasource": {"type": "prometheus", "uid": "prom-uid"},
                "targets": [{"refId": "A"}, {"refId": "B"}]
            })
        );
    }

    #[test]
    fn missing_datasource_becomes_default() {
        let mut p = panel(json!({"type": "text"}));
        migrate_panel_datasource(&mut p, &config());
        assert_eq!(
            Value::Object(p),
            json!({"type": "text", "datasource": null, "targets": []})
        );
    }

    #[test]
    fn mixed_panels_resolve_each_target() {
        let mut p = panel(json!({
            "datasource": "-- Mixed --",
            "targets": [
                {"refId": "A", "datasource": "Loki"},
                {"refId": "B", "datasource": "Elastic"},
                {"refId": "C", "datasource": {"uid": "x"}}
            ]
        }));
        migrate_panel_datasource(&mut p, &config());
        assert_eq!(
            Value::Object(p),
            json!({
                "datasource": {"uid": "-- Mixed --"},
                "targets": [
                    {"refId": "A", "datasource": {"type": "loki", "uid": "loki-uid"}},
                    {"refId": "B", "datasource": {"uid": "Elastic"}},
                    {"refId": "C", "datasource": {"uid": "x"}}
                ]
            })
        );
    }

    #[test]
    fn references_left_alone() {
        let original = json!({
            "datasource": {"type": "loki", "uid": "loki-uid"},
            "targets": [{"datasource": "Loki"}]
        });
        let mut p = panel(original.clone());
        migrate_panel_datasource(&mut p, &config());
        assert_eq!(Value::Object(p), original);
    }

    #[test]
    fn query_variables_resolved() {
        let mut doc = panel(json!({
            "templating": {"list": [
                {"type": "query", "datasource": "Loki"},
                {"type": "query", "datasource": null},
                {"type": "custom", "datasource": "Loki"}
            ]}
        }));
        migrate_variable_datasources(&mut doc, &config());
        assert_eq!(
            doc["templating"]["list"],
            json!([
                {"type": "query", "datasource": {"type": "loki", "uid": "loki-uid"}},
                {"type": "query", "datasource": null},
                {"type": "custom", "datasource": "Loki"}
            ])
        );
    }
}
