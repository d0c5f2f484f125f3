//! Panel and template-variable traversal
//!
//! Panels live in three places: the top-level `panels` sequence, the nested
//! `panels` of a `row` panel, and the pre-grid `rows[*].panels` layout that
//! older dashboards still carry until the grid-layout step flattens it.
//! Steps never walk these by hand; they use [`for_each_panel_mut`] (or the
//! read-only [`panels`] iterator) and see every panel exactly once.

use serde_json::Value;

use crate::access::{Object, ObjectExt};

/// How many levels of `row` nesting are descended into
///
/// Rows inside rows are still visited as panels, their own children are not.
pub const MAX_ROW_DEPTH: usize = 1;

/// Discriminator of collapsible row container panels
pub const ROW_PANEL_TYPE: &str = "row";

/// Whether a panel is a row container
#[inline]
#[must_use]
pub fn is_row(panel: &Object) -> bool {
    panel.has_type(ROW_PANEL_TYPE)
}

/// Read-only iterator over every panel of a document
///
/// Produced by [`panels`]. Lazy and cheap to clone; call [`panels`] again to
/// restart.
#[derive(Debug, Clone)]
pub struct Panels<'a> {
    roots: std::vec::IntoIter<&'a [Value]>,
    stack: Vec<std::slice::Iter<'a, Value>>,
}

impl<'a> Iterator for Panels<'a> {
    type Item = &'a Object;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(level) = self.stack.last_mut() else {
                let root = self.roots.next()?;
                self.stack.push(root.iter());
                continue;
            };
            let Some(value) = level.next() else {
                self.stack.pop();
                continue;
            };
            let Value::Object(panel) = value else {
                continue;
            };
            if self.stack.len() <= MAX_ROW_DEPTH && is_row(panel) {
                if let Some(children) = panel.get_array("panels") {
                    self.stack.push(children.iter());
                }
            }
            return Some(panel);
        }
    }
}

/// Iterate every panel of `doc`, rows before their nested panels
#[must_use]
pub fn panels(doc: &Object) -> Panels<'_> {
    let mut roots: Vec<&[Value]> = Vec::new();
    if let Some(top) = doc.get_array("panels") {
        roots.push(top);
    }
    if let Some(rows) = doc.get_array("rows") {
        roots.extend(
            rows.iter()
                .filter_map(Value::as_object)
                .filter_map(|row| row.get_array("panels"))
                .map(Vec::as_slice),
        );
    }
    Panels {
        roots: roots.into_iter(),
        stack: Vec::new(),
    }
}

/// Visit every panel of `doc` mutably, in the same order as [`panels`]
///
/// A row is visited before its nested panels, and whether it is a row is
/// decided after the visitor returns.
pub fn for_each_panel_mut<F>(doc: &mut Object, mut visit: F)
where
    F: FnMut(&mut Object),
{
    if let Some(top) = doc.get_array_mut("panels") {
        walk_at_depth(top, 0, &mut visit);
    }
    if let Some(rows) = doc.get_array_mut("rows") {
        for row in rows.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(nested) = row.get_array_mut("panels") {
                walk_at_depth(nested, 0, &mut visit);
            }
        }
    }
}

/// Visit every panel of a bare panel sequence mutably
pub fn walk_panels_mut<F>(panels: &mut [Value], mut visit: F)
where
    F: FnMut(&mut Object),
{
    walk_at_depth(panels, 0, &mut visit);
}

fn walk_at_depth<F>(panels: &mut [Value], depth: usize, visit: &mut F)
where
    F: FnMut(&mut Object),
{
    for value in panels.iter_mut() {
        let Value::Object(panel) = value else {
            tracing::debug!("skipping non-object panel entry");
            continue;
        };
        visit(panel);
        if depth < MAX_ROW_DEPTH && is_row(panel) {
            if let Some(nested) = panel.get_array_mut("panels") {
                walk_at_depth(nested, depth + 1, visit);
            }
        }
    }
}

/// Visit every template variable (`templating.list[*]`) mutably
pub fn for_each_variable_mut<F>(doc: &mut Object, mut visit: F)
where
    F: FnMut(&mut Object),
{
    let Some(list) = doc
        .get_object_mut("templating")
        .and_then(|templating| templating.get_array_mut("list"))
    else {
        return;
    };
    for variable in list.iter_mut().filter_map(Value::as_object_mut) {
        visit(variable);
    }
}
