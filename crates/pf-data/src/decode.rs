//! Payload decoding.
//!
//! The percentile service returns a self-describing labelled array in the
//! layout produced by xarray's `DataArray.to_dict()`:
//!
//! ```json
//! {
//!   "dims": ["gcm", "duration", "timerange", "variable", "interval"],
//!   "coords": {
//!     "gcm": {"dims": ["gcm"], "data": ["GFDL-CM3", "NCAR-CCSM4"]},
//!     "interval": {"dims": ["interval"], "data": [2.0, 5.0]}
//!   },
//!   "data": [[[[[490, 610], ...]]]]
//! }
//! ```
//!
//! Dimensions may come in any order; they are permuted into the canonical
//! order of [`ResultBundle`]. Cell values are numbers or `null` (missing).

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use pf_common::{Gcm, PfError, PfResult, TimeRange, Variable};

use crate::bundle::{BundleAxes, ResultBundle};

/// Axis names in canonical order.
const CANONICAL_DIMS: [&str; 5] = ["gcm", "duration", "timerange", "variable", "interval"];

#[derive(Debug, Deserialize)]
struct DataArrayDoc {
    dims: Vec<String>,
    coords: HashMap<String, CoordDoc>,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct CoordDoc {
    data: Vec<Value>,
}

/// Decode a raw response body into a [`ResultBundle`].
pub fn decode_payload(body: &[u8]) -> PfResult<ResultBundle> {
    if body.is_empty() {
        return Err(PfError::MalformedResponse("empty payload".to_string()));
    }

    let doc: DataArrayDoc = serde_json::from_slice(body)?;
    decode_document(doc)
}

fn decode_document(doc: DataArrayDoc) -> PfResult<ResultBundle> {
    // Position of each canonical axis within the payload's dims
    let mut payload_pos = [0usize; 5];
    if doc.dims.len() != CANONICAL_DIMS.len() {
        return Err(malformed(format!(
            "expected 5 dimensions, got {:?}",
            doc.dims
        )));
    }
    for (canon, name) in CANONICAL_DIMS.iter().enumerate() {
        payload_pos[canon] = doc
            .dims
            .iter()
            .position(|d| d == name)
            .ok_or_else(|| malformed(format!("missing dimension '{}'", name)))?;
    }

    let axes = BundleAxes {
        gcm: parse_labels(&doc, "gcm", |v| v.as_str().and_then(|s| s.parse::<Gcm>().ok()))?,
        duration: parse_labels(&doc, "duration", |v| v.as_str().map(str::to_string))?,
        timerange: parse_labels(&doc, "timerange", |v| {
            v.as_str().and_then(|s| s.parse::<TimeRange>().ok())
        })?,
        variable: parse_labels(&doc, "variable", parse_variable)?,
        interval: parse_labels(&doc, "interval", parse_interval)?,
    };

    let canonical_shape = axes.shape();
    let payload_shape: Vec<usize> = doc
        .dims
        .iter()
        .map(|d| {
            let canon = CANONICAL_DIMS
                .iter()
                .position(|c| c == d)
                .unwrap_or_default();
            canonical_shape[canon]
        })
        .collect();

    let mut flat = Vec::with_capacity(canonical_shape.iter().product());
    flatten(&doc.data, &payload_shape, &mut flat)?;

    let values = permute_to_canonical(&flat, &payload_shape, &payload_pos, canonical_shape);

    debug!(shape = ?canonical_shape, dims = ?doc.dims, "Decoded result bundle");

    ResultBundle::new(axes, values)
}

fn parse_labels<T>(
    doc: &DataArrayDoc,
    axis: &str,
    parse: impl Fn(&Value) -> Option<T>,
) -> PfResult<Vec<T>> {
    let coord = doc
        .coords
        .get(axis)
        .ok_or_else(|| malformed(format!("missing coordinate '{}'", axis)))?;

    if coord.data.is_empty() {
        return Err(malformed(format!("coordinate '{}' is empty", axis)));
    }

    coord
        .data
        .iter()
        .map(|v| parse(v).ok_or_else(|| malformed(format!("bad '{}' label {}", axis, v))))
        .collect()
}

fn parse_variable(value: &Value) -> Option<Variable> {
    let s = value.as_str()?;
    Variable::ALL.into_iter().find(|v| v.as_str() == s)
}

fn parse_interval(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Walk nested lists depth-first, checking each level against `shape`.
fn flatten(value: &Value, shape: &[usize], out: &mut Vec<f64>) -> PfResult<()> {
    match shape.split_first() {
        None => {
            let cell = match value {
                Value::Null => f64::NAN,
                Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| malformed(format!("unrepresentable number {}", n)))?,
                other => return Err(malformed(format!("non-numeric cell {}", other))),
            };
            out.push(cell);
            Ok(())
        }
        Some((&len, rest)) => {
            let items = value
                .as_array()
                .ok_or_else(|| malformed("data nesting shallower than dims".to_string()))?;
            if items.len() != len {
                return Err(malformed(format!(
                    "data has {} entries where coordinates declare {}",
                    items.len(),
                    len
                )));
            }
            for item in items {
                flatten(item, rest, out)?;
            }
            Ok(())
        }
    }
}

/// Reorder a row-major array from payload dim order into canonical order.
fn permute_to_canonical(
    flat: &[f64],
    payload_shape: &[usize],
    payload_pos: &[usize; 5],
    canonical_shape: [usize; 5],
) -> Vec<f64> {
    let mut payload_strides = vec![1usize; payload_shape.len()];
    for k in (0..payload_shape.len().saturating_sub(1)).rev() {
        payload_strides[k] = payload_strides[k + 1] * payload_shape[k + 1];
    }

    let total: usize = canonical_shape.iter().product();
    let mut values = Vec::with_capacity(total);
    let mut idx = [0usize; 5];

    for _ in 0..total {
        let offset: usize = (0..5)
            .map(|canon| idx[canon] * payload_strides[payload_pos[canon]])
            .sum();
        values.push(flat[offset]);

        // Advance the canonical multi-index, last axis fastest
        for axis in (0..5).rev() {
            idx[axis] += 1;
            if idx[axis] < canonical_shape[axis] {
                break;
            }
            idx[axis] = 0;
        }
    }

    values
}

fn malformed(message: String) -> PfError {
    PfError::MalformedResponse(message)
}
