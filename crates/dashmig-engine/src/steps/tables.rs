//! Singlestat and table panel rewrites

use dashmig_document::{Object, ObjectExt};
use serde_json::{json, Value};

fn table_styles_mut(panel: &mut Object) -> Option<&mut Vec<Value>> {
    if !panel.has_type("table") {
        return None;
    }
    panel.get_array_mut("styles")
}

/// v9: comma-separated singlestat thresholds with three or more entries lose the first
pub(super) fn trim_singlestat_thresholds(panel: &mut Object) {
    let empty = panel.get_str("thresholds") == Some("");
    if !panel.has_type("singlestat") && !empty {
        return;
    }
    let Some(thresholds) = panel.get_str("thresholds").filter(|t| !t.is_empty()) else {
        return;
    };
    let parts: Vec<&str> = thresholds.split(',').collect();
    if parts.len() >= 3 {
        let trimmed = parts[1..].join(",");
        panel.insert("thresholds".into(), json!(trimmed));
    }
}

/// v10: table style threshold arrays with three or more entries lose the first
pub(super) fn trim_style_thresholds(panel: &mut Object) {
    let Some(styles) = table_styles_mut(panel) else {
        return;
    };
    for style in styles.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(thresholds) = style.get_array_mut("thresholds") {
            if thresholds.len() >= 3 {
                thresholds.remove(0);
            }
        }
    }
}

/// v22: every table style aligns automatically
pub(super) fn align_styles_auto(panel: &mut Object) {
    let Some(styles) = table_styles_mut(panel) else {
        return;
    };
    for style in styles.iter_mut().filter_map(Value::as_object_mut) {
        style.insert("align".into(), json!("auto"));
    }
}

/// v24: angular `table` panels with `styles` → `table-old`
///
/// Panels already flagged `table: "table2"` are the new table and stay.
pub(super) fn angular_table_to_table_old(panel: &mut Object) {
    if !panel.has_type("table") || !panel.is_truthy("styles") {
        return;
    }
    if panel.get_str("table") == Some("table2") {
        return;
    }
    panel.insert("type".into(), json!("table-old"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn panel(value: Value) -> Object {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn singlestat_thresholds_trimmed() {
        let mut p = panel(json!({"type": "singlestat", "thresholds": "0,50,80"}));
        trim_singlestat_thresholds(&mut p);
        assert_eq!(p["thresholds"], json!("50,80"));

        let mut short = panel(json!({"type": "singlestat", "thresholds": "50,80"}));
        trim_singlestat_thresholds(&mut short);
        assert_eq!(short["thresholds"], json!("50,80"));
    }

    #[test]
    fn other_panels_thresholds_kept() {
        let mut p = panel(json!({"type": "graph", "thresholds": "0,50,80"}));
        trim_singlestat_thresholds(&mut p);
        assert_eq!(p["thresholds"], json!("0,50,80"));

        let mut empty = panel(json!({"type": "graph", "thresholds": ""}));
        trim_singlestat_thresholds(&mut empty);
        assert_eq!(empty["thresholds"], json!(""));
    }

    #[test]
    fn style_thresholds_trimmed() {
        let mut p = panel(json!({
            "type": "table",
            "styles": [{"thresholds": ["0", "50", "80"]}, {"thresholds": ["50"]}, {}]
        }));
        trim_style_thresholds(&mut p);
        assert_eq!(
            p["styles"],
            json!([{"thresholds": ["50", "80"]}, {"thresholds": ["50"]}, {}])
        );
    }

    #[test]
    fn styles_align_auto() {
        let mut p = panel(json!({"type": "table", "styles": [{"align": "left"}, {}]}));
        align_styles_auto(&mut p);
        assert_eq!(p["styles"], json!([{"align": "auto"}, {"align": "auto"}]));

        let original = json!({"type": "graph", "styles": [{}]});
        let mut g = panel(original.clone());
        align_styles_auto(&mut g);
        assert_eq!(Value::Object(g), original);
    }

    #[test]
    fn angular_tables_retyped() {
        let mut angular = panel(json!({"type": "table", "styles": []}));
        angular_table_to_table_old(&mut angular);
        assert_eq!(angular["type"], json!("table-old"));

        let mut react = panel(json!({"type": "table", "styles": [], "table": "table2"}));
        angular_table_to_table_old(&mut react);
        assert_eq!(react["type"], json!("table"));

        let mut defaults = panel(json!({"type": "table"}));
        angular_table_to_table_old(&mut defaults);
        assert_eq!(defaults["type"], json!("table"));
    }
}
