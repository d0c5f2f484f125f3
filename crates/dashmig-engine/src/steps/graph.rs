//! Graph panel field renames and axis restructuring

use dashmig_document::{Object, ObjectExt};
use serde_json::{json, Value};

const GRID_AXIS_KEYS: [&str; 6] = [
    "leftMin",
    "leftMax",
    "leftLogBase",
    "rightMin",
    "rightMax",
    "rightLogBase",
];

/// v2: `graphite` → `graph`, then legacy graph field renames
pub(super) fn upgrade_graphite_panel(panel: &mut Object) {
    if panel.has_type("graphite") {
        panel.insert("type".into(), json!("graph"));
    }
    if !panel.has_type("graph") {
        return;
    }

    if let Some(show) = panel.get_bool("legend") {
        panel.insert("legend".into(), json!({ "show": show }));
    }
    if let Some(grid) = panel.get_object_mut("grid") {
        rename_if_truthy(grid, "min", "leftMin");
        rename_if_truthy(grid, "max", "leftMax");
    }
    move_format(panel, "y_format", 0);
    move_format(panel, "y2_format", 1);
}

fn rename_if_truthy(obj: &mut Object, from: &str, to: &str) {
    if !obj.is_truthy(from) {
        return;
    }
    if let Some(value) = obj.remove(from) {
        obj.insert(to.into(), value);
    }
}

fn move_format(panel: &mut Object, key: &str, index: usize) {
    if !panel.is_truthy(key) {
        return;
    }
    let Some(format) = panel.remove(key) else {
        return;
    };
    let formats = panel.ensure_array("y_formats");
    if formats.len() <= index {
        formats.resize(index + 1, Value::Null);
    }
    formats[index] = format;
}

/// v12: build `yaxes`/`xaxis` from the legacy grid and label fields
///
/// Only graph panels with a `grid` and no `yaxes` are touched. Source fields
/// that are absent are omitted from the new axes.
pub(super) fn build_axes(panel: &mut Object) {
    if !panel.has_type("graph") || panel.is_truthy("yaxes") {
        return;
    }
    let Some(grid) = panel.get_object("grid") else {
        return;
    };

    let format = |index: usize| {
        panel
            .get_array("y_formats")
            .and_then(|formats| formats.get(index))
            .cloned()
    };
    let show = panel.get("y-axis").cloned();

    let left = axis(&[
        ("show", show.clone()),
        ("min", grid.get("leftMin").cloned()),
        ("max", grid.get("leftMax").cloned()),
        ("logBase", grid.get("leftLogBase").cloned()),
        ("format", format(0)),
        ("label", panel.get("leftYAxisLabel").cloned()),
    ]);
    let right = axis(&[
        ("show", show),
        ("min", grid.get("rightMin").cloned()),
        ("max", grid.get("rightMax").cloned()),
        ("logBase", grid.get("rightLogBase").cloned()),
        ("format", format(1)),
        ("label", panel.get("rightYAxisLabel").cloned()),
    ]);
    let xaxis = axis(&[("show", panel.get("x-axis").cloned())]);

    panel.insert("yaxes".into(), json!([left, right]));
    panel.insert("xaxis".into(), Value::Object(xaxis));

    if let Some(grid) = panel.get_object_mut("grid") {
        for key in GRID_AXIS_KEYS {
            grid.remove(key);
        }
    }
    for key in ["y_formats", "leftYAxisLabel", "rightYAxisLabel", "y-axis", "x-axis"] {
        panel.remove(key);
    }
}

fn axis(fields: &[(&str, Option<Value>)]) -> Object {
    fields
        .iter()
        .filter_map(|(key, value)| value.clone().map(|v| ((*key).to_owned(), v)))
        .collect()
}
