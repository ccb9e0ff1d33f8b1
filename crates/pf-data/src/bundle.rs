//! Five-axis precipitation-frequency result array.
//!
//! Values are stored densely in the canonical axis order
//! `(gcm, duration, timerange, variable, interval)`, row-major, in thousandths
//! of an inch. Missing cells are NaN.

use pf_common::{Gcm, PfError, PfResult, TimeRange, Variable};

/// Interval labels are compared with this tolerance (years).
const INTERVAL_EPSILON: f64 = 1e-9;

/// Coordinate labels of each axis, in payload order.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleAxes {
    pub gcm: Vec<Gcm>,
    pub duration: Vec<String>,
    pub timerange: Vec<TimeRange>,
    pub variable: Vec<Variable>,
    pub interval: Vec<f64>,
}

impl BundleAxes {
    /// Axis lengths in canonical order.
    pub fn shape(&self) -> [usize; 5] {
        [
            self.gcm.len(),
            self.duration.len(),
            self.timerange.len(),
            self.variable.len(),
            self.interval.len(),
        ]
    }

    fn gcm_index(&self, gcm: Gcm) -> PfResult<usize> {
        self.gcm
            .iter()
            .position(|g| *g == gcm)
            .ok_or_else(|| PfError::axis_not_found("gcm", gcm))
    }

    fn duration_index(&self, duration: &str) -> PfResult<usize> {
        self.duration
            .iter()
            .position(|d| d == duration)
            .ok_or_else(|| PfError::axis_not_found("duration", duration))
    }

    fn timerange_index(&self, timerange: TimeRange) -> PfResult<usize> {
        self.timerange
            .iter()
            .position(|t| *t == timerange)
            .ok_or_else(|| PfError::axis_not_found("timerange", timerange))
    }

    fn variable_index(&self, variable: Variable) -> PfResult<usize> {
        self.variable
            .iter()
            .position(|v| *v == variable)
            .ok_or_else(|| PfError::axis_not_found("variable", variable))
    }

    fn interval_index(&self, interval: f64) -> PfResult<usize> {
        self.interval
            .iter()
            .position(|i| (i - interval).abs() < INTERVAL_EPSILON)
            .ok_or_else(|| PfError::axis_not_found("interval", interval))
    }
}

/// Deserialized backend payload for one point.
///
/// Immutable once built; the point cache hands out shared references.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBundle {
    axes: BundleAxes,
    values: Vec<f64>,
}

impl ResultBundle {
    /// Build a bundle from axes and values in canonical row-major order.
    pub fn new(axes: BundleAxes, values: Vec<f64>) -> PfResult<Self> {
        let expected: usize = axes.shape().iter().product();
        if values.len() != expected {
            return Err(PfError::MalformedResponse(format!(
                "expected {} values for shape {:?}, got {}",
                expected,
                axes.shape(),
                values.len()
            )));
        }
        Ok(Self { axes, values })
    }

    pub fn axes(&self) -> &BundleAxes {
        &self.axes
    }

    /// Climate models present in the bundle, in payload order.
    pub fn gcms(&self) -> &[Gcm] {
        &self.axes.gcm
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read one cell. Every label must be present on its axis.
    pub fn select(
        &self,
        gcm: Gcm,
        duration: &str,
        timerange: TimeRange,
        variable: Variable,
        interval: f64,
    ) -> PfResult<f64> {
        let idx = [
            self.axes.gcm_index(gcm)?,
            self.axes.duration_index(duration)?,
            self.axes.timerange_index(timerange)?,
            self.axes.variable_index(variable)?,
            self.axes.interval_index(interval)?,
        ];
        Ok(self.values[self.offset(idx)])
    }

    /// False when no central estimate is present anywhere.
    ///
    /// The data service answers points off its grid with an all-missing array.
    pub fn has_data(&self) -> bool {
        let Some(pf) = self.axes.variable.iter().position(|v| *v == Variable::Pf) else {
            return false;
        };
        let shape = self.axes.shape();
        (0..self.values.len())
            .filter(|&flat| (flat / shape[4]) % shape[3] == pf)
            .any(|flat| !self.values[flat].is_nan())
    }

    fn offset(&self, idx: [usize; 5]) -> usize {
        let shape = self.axes.shape();
        idx.iter()
            .zip(shape.iter())
            .fold(0, |acc, (&i, &len)| acc * len + i)
    }
}
