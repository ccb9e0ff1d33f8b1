//! Query points and the rounding used to compare and display them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PfError, PfResult};

/// Round to two decimal places, ties to even.
///
/// Both coordinates and table values are shown at this precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Largest coordinate magnitude accepted. Hundredths of this still convert
/// to `i64` exactly, so distinct rounded points never share a key.
pub const MAX_ABS_DEGREES: f64 = 1.0e9;

/// A geographic point picked on the map or typed into the form.
///
/// Only built through [`QueryPoint::new`], so every point has a valid key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryPoint {
    lat: f64,
    lon: f64,
}

impl QueryPoint {
    /// Capture a point. Geographic range is not checked; non-finite or
    /// absurdly large input is refused.
    pub fn new(lat: f64, lon: f64) -> PfResult<Self> {
        check_coordinate("lat", "latitude", lat)?;
        check_coordinate("lon", "longitude", lon)?;
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees (WGS84)
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees (WGS84)
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Cache key: both coordinates rounded to hundredths of a degree.
    pub fn rounded(&self) -> PointKey {
        PointKey {
            lat_hundredths: (self.lat * 100.0).round_ties_even() as i64,
            lon_hundredths: (self.lon * 100.0).round_ties_even() as i64,
        }
    }

    /// Tooltip form, e.g. `(66.55, -149.19)`.
    pub fn label(&self) -> String {
        self.rounded().to_string()
    }
}

fn check_coordinate(param: &str, name: &str, value: f64) -> PfResult<()> {
    if !value.is_finite() {
        return Err(PfError::invalid_parameter(
            param,
            format!("{} must be a finite number", name),
        ));
    }
    if value.abs() > MAX_ABS_DEGREES {
        return Err(PfError::invalid_parameter(
            param,
            format!("{} {} is out of range", name, value),
        ));
    }
    Ok(())
}

/// A point rounded to two decimal places, compared exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointKey {
    lat_hundredths: i64,
    lon_hundredths: i64,
}

impl PointKey {
    pub fn lat(&self) -> f64 {
        self.lat_hundredths as f64 / 100.0
    }

    pub fn lon(&self) -> f64 {
        self.lon_hundredths as f64 / 100.0
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.lat(), self.lon())
    }
}
