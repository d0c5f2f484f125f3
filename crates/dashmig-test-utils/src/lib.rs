//! Testing utilities for dashmig workspace
//!
//! Shared dashboard fixtures and assertions.

#![allow(missing_docs)]

use dashmig_document::{panels, Object};
use serde_json::{json, Value};

/// Panics if `value` is not an object; fixtures only
pub fn object(value: Value) -> Object {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture is not an object: {other}"),
    }
}

pub fn dashboard_at(version: u32) -> Object {
    object(json!({ "title": "fixture", "schemaVersion": version }))
}

pub fn dashboard_with_panels(version: u32, panels: Vec<Value>) -> Object {
    let mut doc = dashboard_at(version);
    doc.insert("panels".into(), Value::Array(panels));
    doc
}

pub fn row(nested: Vec<Value>) -> Value {
    json!({ "type": "row", "collapsed": true, "panels": nested })
}

/// Dashboard as saved before the grid layout, exercising most steps
pub fn legacy_dashboard() -> Object {
    object(json!({
        "title": "legacy",
        "services": {
            "filter": {
                "time": {"from": "now-6h", "to": "now"},
                "list": [
                    {"name": "host", "type": "filter", "refresh": true, "multi": true,
                     "current": {"value": "a", "text": "a"}},
                    {"name": "env", "type": "constant", "hide": 0, "query": "prod"}
                ]
            }
        },
        "pulldowns": [
            {"type": "filtering"},
            {"type": "annotations", "annotations": [{"name": "deploys"}]}
        ],
        "nav": [{"type": "timepicker", "collapse": false}],
        "sharedCrosshair": true,
        "rows": [
            {
                "title": "Overview",
                "height": "250px",
                "panels": [
                    {
                        "id": 1,
                        "type": "graphite",
                        "span": 6,
                        "legend": true,
                        "y_format": "ms",
                        "grid": {"min": 1, "max": 10},
                        "targets": [{"target": "a.b"}, {"target": "c.d"}]
                    },
                    {
                        "id": 2,
                        "type": "singlestat",
                        "span": 6,
                        "thresholds": "10,20",
                        "gauge": {"show": true}
                    }
                ]
            },
            {
                "title": "Details",
                "height": 300,
                "collapse": true,
                "panels": [
                    {
                        "id": 3,
                        "type": "table",
                        "span": 12,
                        "styles": [{"type": "number", "thresholds": ["1", "2"]}]
                    },
                    {
                        "id": 4,
                        "type": "text2",
                        "span": 12,
                        "options": {"angular": "<b/>"}
                    }
                ]
            }
        ]
    }))
}

/// Panels as a flat list including row-nested panels, in traversal order
pub fn all_panels(doc: &Object) -> Vec<Object> {
    panels(doc).cloned().collect()
}

pub fn panel_types(doc: &Object) -> Vec<String> {
    panels(doc)
        .map(|p| {
            p.get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        })
        .collect()
}

pub fn assert_version(doc: &Object, expected: u32) {
    assert_eq!(
        doc.get("schemaVersion"),
        Some(&json!(expected)),
        "schemaVersion mismatch"
    );
}
