//! Axis vocabulary of the precipitation-frequency data set.
//!
//! The backend serves a five-axis array indexed by
//! `(gcm, duration, timerange, variable, interval)`. The labels below are the
//! wire strings of that contract and must stay in sync with it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PfError;

/// Accumulation windows, in the row order of the rendered table.
pub const DURATIONS: [&str; 14] = [
    "60m", "2h", "3h", "6h", "12h", "24h", "3d", "4d", "7d", "10d", "20d", "30d", "45d", "60d",
];

/// Return intervals in years, in the column order of the rendered table.
pub const INTERVALS: [f64; 9] = [2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 500.0, 1000.0];

/// Global climate model the projection was downscaled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gcm {
    #[serde(rename = "GFDL-CM3")]
    GfdlCm3,
    #[serde(rename = "NCAR-CCSM4")]
    NcarCcsm4,
}

impl Gcm {
    pub const ALL: [Gcm; 2] = [Gcm::GfdlCm3, Gcm::NcarCcsm4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gcm::GfdlCm3 => "GFDL-CM3",
            Gcm::NcarCcsm4 => "NCAR-CCSM4",
        }
    }
}

impl FromStr for Gcm {
    type Err = PfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gcm::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PfError::invalid_parameter("gcm", format!("unknown model '{}'", s)))
    }
}

impl fmt::Display for Gcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projection period bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "2020-2049")]
    Early,
    #[serde(rename = "2050-2079")]
    Mid,
    #[serde(rename = "2080-2099")]
    Late,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Early, TimeRange::Mid, TimeRange::Late];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Early => "2020-2049",
            TimeRange::Mid => "2050-2079",
            TimeRange::Late => "2080-2099",
        }
    }
}

impl FromStr for TimeRange {
    type Err = PfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| {
                PfError::invalid_parameter("timerange", format!("unknown time range '{}'", s))
            })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display unit system for table values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }

    /// Unit name used in table captions.
    pub fn label(&self) -> &'static str {
        match self {
            Units::Imperial => "inches",
            Units::Metric => "millimeters",
        }
    }

    /// Multiplier applied to a value already expressed in inches.
    pub fn from_inches_factor(&self) -> f64 {
        match self {
            Units::Imperial => 1.0,
            Units::Metric => 25.4,
        }
    }
}

impl FromStr for Units {
    type Err = PfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            _ => Err(PfError::invalid_parameter(
                "units",
                format!("expected 'imperial' or 'metric', got '{}'", s),
            )),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistic kind stored along the `variable` axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variable {
    /// Central estimate
    #[serde(rename = "pf")]
    Pf,
    /// Lower confidence bound
    #[serde(rename = "pf-lower")]
    PfLower,
    /// Upper confidence bound
    #[serde(rename = "pf-upper")]
    PfUpper,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::Pf, Variable::PfLower, Variable::PfUpper];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Pf => "pf",
            Variable::PfLower => "pf-lower",
            Variable::PfUpper => "pf-upper",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
