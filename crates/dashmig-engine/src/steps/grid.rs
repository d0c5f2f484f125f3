//! Row layout to grid layout
//!
//! Pre-grid dashboards stack `rows`, each a fixed-height band of panels
//! sized by a 12-column `span`. The grid has 24 columns and measures height
//! in cells; panels are packed left to right inside each band and wrap once
//! the band is full.

use dashmig_document::{number_value, to_number, truthy, Object, ObjectExt};
use serde_json::{json, Value};

const GRID_COLUMN_COUNT: i64 = 24;
const LEGACY_COLUMN_COUNT: i64 = 12;
const WIDTH_FACTOR: i64 = GRID_COLUMN_COUNT / LEGACY_COLUMN_COUNT;
const GRID_CELL_HEIGHT: f64 = 30.0;
const GRID_CELL_VMARGIN: f64 = 8.0;
const MIN_PANEL_HEIGHT: f64 = 90.0;
const DEFAULT_PANEL_SPAN: f64 = 4.0;
const DEFAULT_ROW_HEIGHT: f64 = 250.0;
/// Tallest panel or row, in cells
const MAX_PANEL_CELLS: f64 = 10_000.0;

/// Divisors of [`GRID_COLUMN_COUNT`], ascending
const COLUMN_FACTORS: [u8; 8] = [1, 2, 3, 4, 6, 8, 12, 24];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridPos {
    x: i64,
    y: i64,
    w: i64,
    h: i64,
}

impl GridPos {
    fn to_value(self) -> Value {
        json!({ "x": self.x, "y": self.y, "w": self.w, "h": self.h })
    }
}

/// Pixel height → grid cells, clamped to `MIN_PANEL_HEIGHT..=MAX_PANEL_CELLS`
#[allow(clippy::cast_possible_truncation)]
fn cells_for_px(px: f64) -> i64 {
    let cells = (px.max(MIN_PANEL_HEIGHT) / (GRID_CELL_HEIGHT + GRID_CELL_VMARGIN)).ceil();
    cells.min(MAX_PANEL_CELLS) as i64
}

/// Legacy height (`300`, `"300px"`) → grid cells
fn grid_height(height: &Value) -> i64 {
    let px = match height {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_int_prefix(&s.replace("px", "")),
        _ => None,
    };
    cells_for_px(px.unwrap_or(MIN_PANEL_HEIGHT))
}

fn parse_int_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<f64>().ok().map(|v| sign * v)
}

/// Fill state of one row band: per column, how many cells are taken
/// measured from the band's top
#[derive(Debug)]
struct RowArea {
    area: Vec<i64>,
    y_pos: i64,
    height: i64,
}

impl RowArea {
    fn new(height: i64, y_pos: i64) -> Self {
        Self {
            area: vec![0; usize::try_from(GRID_COLUMN_COUNT).unwrap_or_default()],
            y_pos,
            height,
        }
    }

    fn add_panel(&mut self, pos: GridPos) {
        let filled = pos.y.saturating_add(pos.h).saturating_sub(self.y_pos);
        let start = usize::try_from(pos.x).unwrap_or(0);
        let count = usize::try_from(pos.w).unwrap_or(0);
        for cell in self.area.iter_mut().skip(start).take(count) {
            if *cell == 0 || filled > *cell {
                *cell = filled;
            }
        }
    }

    /// Position relative to the band for a panel `width` columns wide,
    /// wrapping to a fresh band at most once
    fn panel_position(&mut self, width: i64) -> Option<(i64, i64)> {
        if let Some(place) = self.find_place(width) {
            return Some(place);
        }
        self.y_pos = self.y_pos.saturating_add(self.height);
        self.area.fill(0);
        self.find_place(width)
    }

    // Scans from the right for the widest run of columns that still has
    // room and whose fill does not increase going left.
    fn find_place(&self, width: i64) -> Option<(i64, i64)> {
        let mut start = None;
        let mut end = None;
        for i in (0..self.area.len()).rev() {
            if self.height.saturating_sub(self.area[i]) <= 0 {
                break;
            }
            if end.is_none() {
                end = Some(i);
            } else if self.area[i] <= self.area[i + 1] {
                start = Some(i);
            } else {
                break;
            }
        }

        let (start, end) = (start?, end?);
        let run = i64::try_from(end - start).ok()?;
        if run < width.saturating_sub(1) {
            return None;
        }
        let y = self.area[start..].iter().copied().max().unwrap_or(0);
        Some((i64::try_from(start).ok()?, y))
    }
}

/// v16: flatten `rows` into `panels` with `gridPos`
pub(super) fn upgrade_to_grid_layout(doc: &mut Object) {
    match doc.get("rows") {
        None => return,
        Some(Value::Array(_)) => {}
        Some(_) => {
            tracing::debug!("legacy rows is not a sequence; left as is");
            return;
        }
    }
    let Some(Value::Array(rows)) = doc.remove("rows") else {
        return;
    };
    let rows: Vec<Object> = rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect();

    let max_panel_id = rows
        .iter()
        .filter_map(|row| row.get_array("panels"))
        .flatten()
        .filter_map(|panel| panel.get("id").and_then(Value::as_f64))
        .fold(0.0, f64::max);
    let mut next_row_id = max_panel_id + 1.0;

    let show_rows = rows.iter().any(|row| {
        ["collapse", "showTitle", "repeat"]
            .iter()
            .any(|key| row.is_truthy(key))
    });

    let mut placed: Vec<Value> = Vec::new();
    let mut y_pos: i64 = 0;

    for mut row in rows {
        if row.is_truthy("repeatIteration") {
            continue;
        }
        let row_height = row
            .get("height")
            .filter(|h| truthy(h))
            .map_or_else(|| cells_for_px(DEFAULT_ROW_HEIGHT), grid_height);
        let collapsed = row.is_truthy("collapse");

        let mut row_panel = None;
        if show_rows {
            row_panel = Some(row_panel_for(&row, next_row_id, y_pos, row_height));
            next_row_id += 1.0;
            y_pos = y_pos.saturating_add(1);
        }

        let mut area = RowArea::new(row_height, y_pos);
        let panels = match row.remove("panels") {
            Some(Value::Array(panels)) => panels,
            _ => Vec::new(),
        };

        for panel in panels {
            let Value::Object(mut panel) = panel else {
                continue;
            };
            let pos = place_panel(&mut panel, &mut area, row_height);
            y_pos = area.y_pos;
            area.add_panel(pos);

            match row_panel.as_mut().filter(|_| collapsed) {
                Some(row_panel) => row_panel.ensure_array("panels").push(Value::Object(panel)),
                None => placed.push(Value::Object(panel)),
            }
        }

        if let Some(row_panel) = row_panel {
            placed.push(Value::Object(row_panel));
        }
        if !(show_rows && collapsed) {
            y_pos = y_pos.saturating_add(row_height);
        }
    }

    let panels = doc.ensure_array("panels");
    panels.extend(placed);
    sort_by_grid_pos(panels);
}

fn row_panel_for(row: &Object, id: f64, y: i64, height: i64) -> Object {
    let mut panel = Object::new();
    panel.insert("id".into(), number_value(id));
    panel.insert("type".into(), json!("row"));
    for (from, to) in [("title", "title"), ("collapse", "collapsed"), ("repeat", "repeat")] {
        if let Some(value) = row.get(from) {
            panel.insert(to.into(), value.clone());
        }
    }
    panel.insert("panels".into(), json!([]));
    let pos = GridPos {
        x: 0,
        y,
        w: GRID_COLUMN_COUNT,
        h: height,
    };
    panel.insert("gridPos".into(), pos.to_value());
    panel
}

#[allow(clippy::cast_possible_truncation)]
fn place_panel(panel: &mut Object, area: &mut RowArea, row_height: i64) -> GridPos {
    let span = panel
        .get("span")
        .filter(|s| truthy(s))
        .and_then(to_number)
        .unwrap_or(DEFAULT_PANEL_SPAN);

    if let Some(min_span) = panel
        .get("minSpan")
        .filter(|m| truthy(m))
        .and_then(Value::as_f64)
    {
        #[allow(clippy::cast_precision_loss)]
        let widened = (WIDTH_FACTOR as f64 * min_span).min(GRID_COLUMN_COUNT as f64);
        panel.insert("minSpan".into(), number_value(widened));
    }

    let w = (span.floor() as i64).saturating_mul(WIDTH_FACTOR);
    let h = panel
        .get("height")
        .filter(|h| truthy(h))
        .map_or(row_height, grid_height);
    let (x, y) = area.panel_position(w).unwrap_or_else(|| {
        tracing::debug!(width = w, "panel does not fit its row; placed at row start");
        (0, 0)
    });

    let pos = GridPos {
        x,
        y: area.y_pos.saturating_add(y),
        w,
        h,
    };
    panel.insert("gridPos".into(), pos.to_value());
    panel.remove("span");
    pos
}

fn sort_by_grid_pos(panels: &mut [Value]) {
    let key = |panel: &Value| {
        let coord = |axis: &str| {
            panel
                .get("gridPos")
                .and_then(|pos| pos.get(axis))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        (coord("y"), coord("x"))
    };
    panels.sort_by(|a, b| {
        let (ay, ax) = key(a);
        let (by, bx) = key(b);
        ay.total_cmp(&by).then(ax.total_cmp(&bx))
    });
}

/// v17: `minSpan` → `maxPerRow`, the largest column factor not above `24 / minSpan`
pub(super) fn min_span_to_max_per_row(panel: &mut Object) {
    if let Some(min_span) = panel
        .get("minSpan")
        .filter(|m| truthy(m))
        .and_then(to_number)
    {
        #[allow(clippy::cast_precision_loss)]
        let max = GRID_COLUMN_COUNT as f64 / min_span;
        let first_above = COLUMN_FACTORS
            .iter()
            .position(|factor| f64::from(*factor) > max);
        if let Some(index) = first_above.and_then(|i| i.checked_sub(1)) {
            panel.insert("maxPerRow".into(), json!(COLUMN_FACTORS[index]));
        }
    }
    panel.remove("minSpan");
}
