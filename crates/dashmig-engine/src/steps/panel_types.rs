//! Panel type swaps

use dashmig_document::{Object, ObjectExt};
use serde_json::json;

/// External plugin that still renders legacy singlestat panels
pub(super) const SINGLESTAT_PLUGIN: &str = "grafana-singlestat-panel";

/// v26: `text2` → `text`
pub(super) fn text2_to_text(panel: &mut Object) {
    if !panel.has_type("text2") {
        return;
    }
    panel.insert("type".into(), json!("text"));
    if let Some(options) = panel.get_object_mut("options") {
        options.remove("angular");
    }
}

/// v28: `singlestat` → the singlestat plugin when installed, else `gauge`
/// for panels showing a gauge, else `stat`
pub(super) fn retarget_singlestat(panel: &mut Object, plugin_installed: bool) {
    if !panel.has_type("singlestat") {
        return;
    }
    let shows_gauge = panel
        .get_object("gauge")
        .is_some_and(|gauge| gauge.is_truthy("show"));
    let target = if plugin_installed {
        SINGLESTAT_PLUGIN
    } else if shows_gauge {
        "gauge"
    } else {
        "stat"
    };
    panel.insert("type".into(), json!(target));
}

/// v30: `options.tooltipOptions` → `options.tooltip` on timeseries and xychart
pub(super) fn rename_tooltip_options(panel: &mut Object) {
    if !panel.has_type("timeseries") && !panel.has_type("xychart") {
        return;
    }
    let Some(options) = panel.get_object_mut("options") else {
        return;
    };
    if !options.is_truthy("tooltipOptions") {
        return;
    }
    if let Some(tooltip) = options.remove("tooltipOptions") {
        options.insert("tooltip".into(), tooltip);
    }
}
