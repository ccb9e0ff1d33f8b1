//! Synthetic percentile payloads.
//!
//! Payloads follow the labelled-array document the percentile service
//! returns (xarray `to_dict()` layout). Cell values are predictable so tests
//! can assert on exact table text.

use serde_json::{json, Value};

// The axis lists below repeat `pf_common`'s on purpose: payloads are built
// from an independent copy so a change to the library lists shows up as a
// decode or render failure instead of passing silently.

/// Durations served by the percentile service, in table order.
pub const DURATIONS: [&str; 14] = [
    "60m", "2h", "3h", "6h", "12h", "24h", "3d", "4d", "7d", "10d", "20d", "30d", "45d", "60d",
];

/// Return intervals served by the percentile service (years).
pub const INTERVALS: [f64; 9] = [2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 500.0, 1000.0];

pub const GCMS: [&str; 2] = ["GFDL-CM3", "NCAR-CCSM4"];
pub const TIMERANGES: [&str; 3] = ["2020-2049", "2050-2079", "2080-2099"];
pub const VARIABLES: [&str; 3] = ["pf", "pf-upper", "pf-lower"];

const CANONICAL_DIMS: [&str; 5] = ["gcm", "duration", "timerange", "variable", "interval"];

/// Central estimate (thousandths of an inch) for the given axis indices.
///
/// Every value is a multiple of 10 so imperial rounding never hits a tie.
///
/// ```
/// use test_utils::synthetic_pf;
///
/// // GFDL-CM3, 60m, 2020-2049, 2-year
/// assert_eq!(synthetic_pf(0, 0, 0, 0), 490.0);
/// // NCAR-CCSM4, 2h, 2050-2079, 5-year
/// assert_eq!(synthetic_pf(1, 1, 1, 1), 490.0 + 10.0 + 150.0 + 20.0 + 60.0);
/// ```
pub fn synthetic_pf(gcm: usize, duration: usize, timerange: usize, interval: usize) -> f64 {
    (490 + 10 * gcm + 150 * duration + 20 * timerange + 60 * interval) as f64
}

/// Value for a statistic kind: bounds are fixed offsets from the central value.
pub fn synthetic_value(
    gcm: usize,
    duration: usize,
    timerange: usize,
    variable: &str,
    interval: usize,
) -> f64 {
    let pf = synthetic_pf(gcm, duration, timerange, interval);
    match variable {
        "pf-lower" => pf - 90.0,
        "pf-upper" => pf + 120.0,
        _ => pf,
    }
}

/// Builder for payload documents.
///
/// Defaults to the full production axes, canonical dim order and
/// [`synthetic_value`] cells.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    gcms: Vec<String>,
    durations: Vec<String>,
    missing: bool,
    dims_reversed: bool,
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self {
            gcms: GCMS.iter().map(|s| s.to_string()).collect(),
            durations: DURATIONS.iter().map(|s| s.to_string()).collect(),
            missing: false,
            dims_reversed: false,
        }
    }
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the `gcm` axis.
    pub fn gcms(mut self, gcms: &[&str]) -> Self {
        self.gcms = gcms.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Replace the `duration` axis.
    pub fn durations(mut self, durations: &[&str]) -> Self {
        self.durations = durations.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Every cell `null`, as served for points off the grid.
    pub fn all_missing(mut self) -> Self {
        self.missing = true;
        self
    }

    /// Emit dims in reverse order (interval outermost).
    pub fn reversed_dims(mut self) -> Self {
        self.dims_reversed = true;
        self
    }

    /// Build the JSON document.
    pub fn build(&self) -> Value {
        let mut dims = CANONICAL_DIMS;
        if self.dims_reversed {
            dims.reverse();
        }

        let shape = [
            self.gcms.len(),
            self.durations.len(),
            TIMERANGES.len(),
            VARIABLES.len(),
            INTERVALS.len(),
        ];
        // Canonical axis position of each emitted dim
        let order: Vec<usize> = dims
            .iter()
            .map(|d| CANONICAL_DIMS.iter().position(|c| c == d).unwrap_or(0))
            .collect();

        let mut index = [0usize; 5];
        let data = self.nest(&order, &shape, 0, &mut index);

        json!({
            "dims": dims,
            "attrs": {},
            "name": "pf",
            "coords": {
                "gcm": {"dims": ["gcm"], "attrs": {}, "data": self.gcms},
                "duration": {"dims": ["duration"], "attrs": {}, "data": self.durations},
                "timerange": {"dims": ["timerange"], "attrs": {}, "data": TIMERANGES},
                "variable": {"dims": ["variable"], "attrs": {}, "data": VARIABLES},
                "interval": {"dims": ["interval"], "attrs": {}, "data": INTERVALS},
            },
            "data": data,
        })
    }

    /// Nested lists for dims `order[depth..]`, with outer indices fixed in
    /// `index` (canonical positions).
    fn nest(
        &self,
        order: &[usize],
        shape: &[usize; 5],
        depth: usize,
        index: &mut [usize; 5],
    ) -> Value {
        let Some(&axis) = order.get(depth) else {
            return self.cell(index);
        };
        Value::Array(
            (0..shape[axis])
                .map(|i| {
                    index[axis] = i;
                    self.nest(order, shape, depth + 1, index)
                })
                .collect(),
        )
    }

    fn cell(&self, index: &[usize; 5]) -> Value {
        if self.missing {
            return Value::Null;
        }
        let [g, d, t, v, i] = *index;
        // Indices refer to the production axes so restricted lists keep their values
        let gcm_idx = GCMS
            .iter()
            .position(|name| *name == self.gcms[g])
            .unwrap_or(g);
        let dur_idx = DURATIONS
            .iter()
            .position(|name| *name == self.durations[d])
            .unwrap_or(d);
        json!(synthetic_value(gcm_idx, dur_idx, t, VARIABLES[v], i))
    }

    /// Build the serialized response body.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.build().to_string().into_bytes()
    }
}
