//! Panel link and data link rewrites

use std::borrow::Cow;

use dashmig_document::{js_string, Object, ObjectExt};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{json, Value};

const KEEP_TIME_VAR: &str = "$__url_time_range";
const INCLUDE_VARS_VAR: &str = "$__all_variables";

static LEGACY_VARIABLE_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(__series_name)|(\$__series_name)|(__value_time)|(__field_name)|(\$__field_name)")
        .unwrap_or_else(|err| panic!("invalid legacy variable pattern: {err}"))
});

static SERIES_LABELS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"__series.labels").unwrap_or_else(|err| panic!("invalid labels pattern: {err}"))
});

// Replacement per capture group of LEGACY_VARIABLE_NAMES
const LEGACY_VARIABLE_REPLACEMENTS: [&str; 5] = [
    "__series.name",
    "${__series.name}",
    "__value.time",
    "__field.name",
    "${__field.name}",
];

/// Lowercase, strip everything but word characters and spaces, space runs → `-`
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c == ' ' {
            if !in_space {
                slug.push('-');
                in_space = true;
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
            in_space = false;
        }
    }
    slug
}

fn append_query(url: &mut String, query: &str) {
    if query.is_empty() {
        return;
    }
    match url.find('?') {
        Some(pos) if pos + 1 < url.len() => url.push('&'),
        Some(_) => {}
        None => url.push('?'),
    }
    url.push_str(query);
}

fn upgrade_link(link: &Object) -> Value {
    let mut url = if link.is_truthy("url") {
        link.get("url").map(js_string).unwrap_or_default()
    } else if link.is_truthy("dashboard") {
        let name = link.get("dashboard").map(js_string).unwrap_or_default();
        format!("dashboard/db/{}", slugify(&name))
    } else if link.is_truthy("dashUri") {
        let uri = link.get("dashUri").map(js_string).unwrap_or_default();
        format!("dashboard/{uri}")
    } else {
        "/".to_owned()
    };

    if link.is_truthy("keepTime") {
        append_query(&mut url, KEEP_TIME_VAR);
    }
    if link.is_truthy("includeVars") {
        append_query(&mut url, INCLUDE_VARS_VAR);
    }
    if link.is_truthy("params") {
        if let Some(params) = link.get("params") {
            append_query(&mut url, &js_string(params));
        }
    }

    let mut upgraded = Object::new();
    upgraded.insert("url".into(), json!(url));
    for key in ["title", "targetBlank"] {
        if let Some(value) = link.get(key) {
            upgraded.insert(key.into(), value.clone());
        }
    }
    Value::Object(upgraded)
}

/// v19: legacy panel links → `{url, title, targetBlank}`
pub(super) fn upgrade_panel_links(panel: &mut Object) {
    let Some(links) = panel.get_array_mut("links") else {
        return;
    };
    for link in links.iter_mut() {
        if let Value::Object(legacy) = link {
            *link = upgrade_link(legacy);
        }
    }
}

/// Apply `rewrite` to every data link url and, when `with_title` is set,
/// to the field title
fn rewrite_data_links<F>(panel: &mut Object, with_title: bool, rewrite: F)
where
    F: Fn(&str) -> Cow<'_, str>,
{
    let Some(options) = panel.get_object_mut("options") else {
        return;
    };
    let apply = |slot: &mut Value| {
        let Value::String(text) = slot else {
            return;
        };
        let updated = match rewrite(text.as_str()) {
            Cow::Owned(updated) => Some(updated),
            Cow::Borrowed(_) => None,
        };
        if let Some(updated) = updated {
            *text = updated;
        }
    };

    if let Some(links) = options.get_array_mut("dataLinks") {
        for link in links.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(url) = link.get_mut("url") {
                apply(url);
            }
        }
    }

    let Some(defaults) = options
        .get_object_mut("fieldOptions")
        .and_then(|field_options| field_options.get_object_mut("defaults"))
    else {
        return;
    };
    if let Some(links) = defaults.get_array_mut("links") {
        for link in links.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(url) = link.get_mut("url") {
                apply(url);
            }
        }
    }
    if with_title {
        if let Some(title) = defaults.get_mut("title") {
            apply(title);
        }
    }
}

fn update_variable_names(text: &str) -> Cow<'_, str> {
    LEGACY_VARIABLE_NAMES.replace_all(text, |caps: &Captures<'_>| {
        LEGACY_VARIABLE_REPLACEMENTS
            .iter()
            .enumerate()
            .find(|(index, _)| caps.get(index + 1).is_some())
            .map_or_else(|| caps[0].to_owned(), |(_, replacement)| (*replacement).to_owned())
    })
}

/// v20: legacy built-in variable names in data links and field titles
pub(super) fn update_variable_syntax(panel: &mut Object) {
    rewrite_data_links(panel, true, update_variable_names);
}

/// v21: `__series.labels` → `__field.labels` in data links
pub(super) fn series_labels_to_field_labels(panel: &mut Object) {
    rewrite_data_links(panel, false, |text| {
        SERIES_LABELS.replace_all(text, "__field.labels")
    });
}
