//! Built-in transformation steps
//!
//! One entry per schema version. Each `vNN` function is the whole step for
//! that version; the helpers it calls live in the module owning the
//! structure being rewritten. Steps absorb malformed structure rather than
//! fail, so every `vNN` returns `Ok`.

#![allow(clippy::unnecessary_wraps)]

mod dashboard;
mod datasource;
mod gauge;
mod graph;
mod grid;
mod links;
mod panel_types;
mod tables;
mod targets;
mod transformations;
mod value_mappings;
mod variables;

use dashmig_document::{for_each_panel_mut, Object};

use crate::error::StepError;
use crate::step::{Step, StepContext};

/// Highest schema version the built-in steps produce
pub const LATEST_VERSION: u32 = 34;

type StepResult = Result<(), StepError>;

pub(crate) fn builtin_steps() -> Vec<Step> {
    vec![
        Step::new(1, "initial schema", v1),
        Step::new(2, "relocate legacy filter; graph panel renames", v2),
        Step::noop(3),
        Step::noop(4),
        Step::noop(5),
        Step::new(6, "annotations from pulldowns; variable defaults", v6),
        Step::new(7, "timepicker from nav; query ref ids", v7),
        Step::new(8, "InfluxDB query schema", v8),
        Step::new(9, "singlestat thresholds", v9),
        Step::new(10, "table style thresholds", v10),
        Step::noop(11),
        Step::new(12, "variable refresh/hide; graph axes", v12),
        Step::noop(13),
        Step::new(14, "shared crosshair to graph tooltip", v14),
        Step::noop(15),
        Step::new(16, "rows to grid layout", v16),
        Step::new(17, "minSpan to maxPerRow", v17),
        Step::new(18, "gauge options", v18),
        Step::new(19, "panel links", v19),
        Step::new(20, "data link variable syntax", v20),
        Step::new(21, "data link field labels", v21),
        Step::new(22, "table style alignment", v22),
        Step::new(23, "multi-value variable current", v23),
        Step::new(24, "angular table to table-old", v24),
        Step::noop(25),
        Step::new(26, "text2 to text", v26),
        Step::new(27, "constant variables", v27),
        Step::new(28, "singlestat panels; variable tags", v28),
        Step::new(29, "query variable refresh", v29),
        Step::new(30, "value mappings; tooltip options", v30),
        Step::new(31, "merge after labelsToFields", v31),
        Step::noop(32),
        Step::new(33, "datasource references", v33),
        Step::new(34, "seriesToColumns to joinByField", v34),
    ]
}

fn v1(_doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    Ok(())
}

fn v2(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    dashboard::relocate_services_filter(doc);
    for_each_panel_mut(doc, graph::upgrade_graphite_panel);
    Ok(())
}

fn v6(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    dashboard::relocate_annotation_pulldown(doc);
    variables::apply_query_defaults(doc);
    Ok(())
}

fn v7(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    dashboard::relocate_nav(doc);
    for_each_panel_mut(doc, targets::assign_ref_ids);
    Ok(())
}

fn v8(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, targets::upgrade_influx_targets);
    Ok(())
}

fn v9(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, tables::trim_singlestat_thresholds);
    Ok(())
}

fn v10(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, tables::trim_style_thresholds);
    Ok(())
}

fn v12(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    variables::normalize_refresh_and_hide(doc);
    for_each_panel_mut(doc, graph::build_axes);
    Ok(())
}

fn v14(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    dashboard::relocate_shared_crosshair(doc);
    Ok(())
}

fn v16(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    grid::upgrade_to_grid_layout(doc);
    Ok(())
}

fn v17(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, grid::min_span_to_max_per_row);
    Ok(())
}

fn v18(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, gauge::restructure_gauge_options);
    Ok(())
}

fn v19(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, links::upgrade_panel_links);
    Ok(())
}

fn v20(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, links::update_variable_syntax);
    Ok(())
}

fn v21(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, links::series_labels_to_field_labels);
    Ok(())
}

fn v22(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, tables::align_styles_auto);
    Ok(())
}

fn v23(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    variables::align_current_with_multi(doc);
    Ok(())
}

fn v24(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, tables::angular_table_to_table_old);
    Ok(())
}

fn v26(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, panel_types::text2_to_text);
    Ok(())
}

fn v27(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    variables::upgrade_constants(doc);
    Ok(())
}

fn v28(doc: &mut Object, ctx: &StepContext<'_>) -> StepResult {
    let plugin_installed = ctx.config.singlestat_plugin_installed;
    for_each_panel_mut(doc, |panel| {
        panel_types::retarget_singlestat(panel, plugin_installed);
    });
    variables::remove_tag_options(doc);
    Ok(())
}

fn v29(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    variables::reset_query_refresh(doc);
    Ok(())
}

fn v30(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, |panel| {
        value_mappings::upgrade_panel_mappings(panel);
        panel_types::rename_tooltip_options(panel);
    });
    Ok(())
}

fn v31(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, |panel| {
        transformations::insert_after(panel, &transformations::MERGE_AFTER_LABELS_TO_FIELDS);
    });
    Ok(())
}

fn v33(doc: &mut Object, ctx: &StepContext<'_>) -> StepResult {
    datasource::migrate_variable_datasources(doc, ctx.config);
    for_each_panel_mut(doc, |panel| datasource::migrate_panel_datasource(panel, ctx.config));
    Ok(())
}

fn v34(doc: &mut Object, _ctx: &StepContext<'_>) -> StepResult {
    for_each_panel_mut(doc, |panel| {
        transformations::convert(panel, &transformations::SERIES_TO_COLUMNS_TO_JOIN_BY_FIELD);
    });
    Ok(())
}
