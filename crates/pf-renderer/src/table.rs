//! Duration × return-interval tables.

use serde::Serialize;
use tracing::debug;

use pf_common::{round2, Gcm, PfResult, TimeRange, Units, Variable};
use pf_data::ResultBundle;

/// Stored values are thousandths of an inch.
const RAW_PER_INCH: f64 = 1000.0;

/// Convert a stored value to display units, rounded to two decimals.
pub fn convert_value(raw: f64, units: Units) -> f64 {
    round2(raw / RAW_PER_INCH * units.from_inches_factor())
}

/// Display text for a converted value.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "N/A".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// One table cell: central estimate with its confidence bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Cell {
    pub fn value_text(&self) -> String {
        format_value(self.value)
    }

    pub fn lower_text(&self) -> String {
        format_value(self.lower)
    }

    pub fn upper_text(&self) -> String {
        format_value(self.upper)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub duration: String,
    pub cells: Vec<Cell>,
}

/// Rendered table for one climate model, time range and unit system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PfTable {
    pub gcm: Gcm,
    pub timerange: TimeRange,
    pub units: Units,
    pub intervals: Vec<f64>,
    pub rows: Vec<TableRow>,
}

impl PfTable {
    pub fn caption(&self) -> String {
        format!(
            "Modeled cumulative rainfall for model {} for time range {} in {}",
            self.gcm,
            self.timerange,
            self.units.label()
        )
    }

    /// Look up a cell by its row and column labels.
    pub fn cell(&self, duration: &str, interval: f64) -> Option<&Cell> {
        let col = self.intervals.iter().position(|i| *i == interval)?;
        self.rows
            .iter()
            .find(|r| r.duration == duration)
            .and_then(|r| r.cells.get(col))
    }
}

/// Render one model's table.
///
/// Every requested duration and interval must exist in the bundle; a missing
/// label is an axis error, never an empty cell.
pub fn render(
    bundle: &ResultBundle,
    durations: &[&str],
    intervals: &[f64],
    gcm: Gcm,
    timerange: TimeRange,
    units: Units,
) -> PfResult<PfTable> {
    let mut rows = Vec::with_capacity(durations.len());

    for &duration in durations {
        let mut cells = Vec::with_capacity(intervals.len());
        for &interval in intervals {
            let select = |variable| bundle.select(gcm, duration, timerange, variable, interval);
            cells.push(Cell {
                value: convert_value(select(Variable::Pf)?, units),
                lower: convert_value(select(Variable::PfLower)?, units),
                upper: convert_value(select(Variable::PfUpper)?, units),
            });
        }
        rows.push(TableRow {
            duration: duration.to_string(),
            cells,
        });
    }

    Ok(PfTable {
        gcm,
        timerange,
        units,
        intervals: intervals.to_vec(),
        rows,
    })
}

/// Render one table per model in the bundle, or only `gcm` when given.
pub fn render_all(
    bundle: &ResultBundle,
    durations: &[&str],
    intervals: &[f64],
    gcm: Option<Gcm>,
    timerange: TimeRange,
    units: Units,
) -> PfResult<Vec<PfTable>> {
    let models: Vec<Gcm> = match gcm {
        Some(g) => vec![g],
        None => bundle.gcms().to_vec(),
    };

    let tables = models
        .into_iter()
        .map(|g| render(bundle, durations, intervals, g, timerange, units))
        .collect::<PfResult<Vec<_>>>()?;

    debug!(
        tables = tables.len(),
        timerange = %timerange,
        units = %units,
        "Rendered precipitation tables"
    );

    Ok(tables)
}
