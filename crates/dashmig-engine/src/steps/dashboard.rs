//! Dashboard-level relocations
//!
//! Legacy containers (`services`, `pulldowns`, `nav`, `sharedCrosshair`) are
//! read, their contents moved to the current location, and the container
//! deleted. A container of the wrong shape is left as is.

use dashmig_document::{truthy, Object, ObjectExt};
use serde_json::{json, Value};

/// v2: `services.filter.{time,list}` → `time`, `templating.list`
///
/// `services` is deleted whether or not either field was present.
pub(super) fn relocate_services_filter(doc: &mut Object) {
    if doc.get_object("services").is_none() {
        return;
    }
    let Some(Value::Object(mut services)) = doc.remove("services") else {
        return;
    };
    let Some(Value::Object(mut filter)) = services.remove("filter") else {
        return;
    };

    if let Some(time) = filter.remove("time") {
        doc.insert("time".into(), time);
    }
    if let Some(list) = filter.remove("list") {
        doc.ensure_object("templating").insert("list".into(), list);
    }
}

/// v6: first `annotations` pulldown → `annotations.list`; `pulldowns` deleted
pub(super) fn relocate_annotation_pulldown(doc: &mut Object) {
    if doc.get_array("pulldowns").is_none() {
        return;
    }
    let Some(Value::Array(pulldowns)) = doc.remove("pulldowns") else {
        return;
    };
    let annotations = pulldowns
        .into_iter()
        .filter_map(|p| match p {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .find(|p| p.has_type("annotations"));

    if let Some(mut pulldown) = annotations {
        let list = pulldown
            .remove("annotations")
            .filter(truthy)
            .unwrap_or_else(|| json!([]));
        doc.insert("annotations".into(), json!({ "list": list }));
    }
}

/// v7: `nav[0]` → `timepicker`; `nav` deleted
pub(super) fn relocate_nav(doc: &mut Object) {
    if doc.get_array("nav").is_none() {
        return;
    }
    let Some(Value::Array(nav)) = doc.remove("nav") else {
        return;
    };
    if let Some(first) = nav.into_iter().next() {
        doc.insert("timepicker".into(), first);
    }
}

/// v14: `sharedCrosshair` → `graphTooltip` (1 or 0)
pub(super) fn relocate_shared_crosshair(doc: &mut Object) {
    let shared = doc.is_truthy("sharedCrosshair");
    doc.remove("sharedCrosshair");
    doc.insert("graphTooltip".into(), json!(u8::from(shared)));
}
