//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.

pub mod albers;

pub use albers::AlbersEqualArea;

use pf_common::PfResult;

/// Project WGS84 latitude/longitude (degrees) into EPSG:3338 metres.
///
/// Convenience wrapper around [`AlbersEqualArea::alaska`].
pub fn project(lat_deg: f64, lon_deg: f64) -> PfResult<(f64, f64)> {
    AlbersEqualArea::alaska().project(lat_deg, lon_deg)
}
