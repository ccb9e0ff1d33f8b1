//! Common types shared across the precipitation-frequency crates.

pub mod axes;
pub mod error;
pub mod point;

pub use axes::{Gcm, TimeRange, Units, Variable, DURATIONS, INTERVALS};
pub use error::{PfError, PfResult};
pub use point::{round2, PointKey, QueryPoint};
