//! Gauge panel options restructuring

use dashmig_document::{Object, ObjectExt};
use serde_json::Value;

const LEGACY_GAUGE_KEY: &str = "options-gauge";
const VALUE_OPTION_KEYS: [&str; 5] = ["unit", "stat", "decimals", "prefix", "suffix"];

/// v18: `options-gauge` replaces `options`, value settings move into
/// `valueOptions` and thresholds flip to ascending order
pub(super) fn restructure_gauge_options(panel: &mut Object) {
    if !panel.is_truthy(LEGACY_GAUGE_KEY) {
        return;
    }
    if panel.get_object(LEGACY_GAUGE_KEY).is_none() {
        tracing::debug!("legacy gauge options are not an object; left as is");
        return;
    }
    let Some(Value::Object(mut options)) = panel.remove(LEGACY_GAUGE_KEY) else {
        return;
    };

    let value_options: Object = VALUE_OPTION_KEYS
        .iter()
        .filter_map(|key| options.remove(*key).map(|v| ((*key).to_owned(), v)))
        .collect();
    options.insert("valueOptions".into(), Value::Object(value_options));

    if let Some(thresholds) = options.get_array_mut("thresholds") {
        thresholds.reverse();
    }
    // stray nested block written by an old editor
    options.remove("options");

    panel.insert("options".into(), Value::Object(options));
}
