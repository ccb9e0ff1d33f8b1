//! Albers Equal Area Conic projection on an ellipsoid.
//!
//! The backend indexes its grids in EPSG:3338 (NAD83 / Alaska Albers).
//! Formulas follow Snyder, "Map Projections: A Working Manual" (USGS PP 1395),
//! section 14, ellipsoidal form.
//!
//! EPSG:3338 parameters:
//! - Ellipsoid: GRS80 (a = 6378137 m, 1/f = 298.257222101)
//! - Standard parallels: 55°N and 65°N
//! - Latitude of origin: 50°N
//! - Central meridian: 154°W
//! - False easting / northing: 0
//!
//! WGS84 input is treated as NAD83 (null datum shift), which is what PROJ does
//! for this pair when no transformation grid is installed.

use std::f64::consts::PI;

use pf_common::{PfError, PfResult};

/// Convergence threshold for the inverse latitude iteration (radians).
const INVERSE_TOLERANCE: f64 = 1e-12;
const INVERSE_MAX_ITERATIONS: usize = 15;

/// Albers Equal Area Conic projection parameters.
#[derive(Debug, Clone)]
pub struct AlbersEqualArea {
    /// Semi-major axis (meters)
    pub a: f64,
    /// First eccentricity
    pub e: f64,
    /// Central meridian in radians
    pub lon0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Cone constant (n)
    n: f64,
    /// C constant
    c: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl AlbersEqualArea {
    /// Build a projection from ellipsoid and cone parameters (degrees).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        semi_major_axis: f64,
        inverse_flattening: f64,
        lat0_deg: f64,
        lon0_deg: f64,
        lat1_deg: f64,
        lat2_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let to_rad = PI / 180.0;
        let f = 1.0 / inverse_flattening;
        let e = (2.0 * f - f * f).sqrt();

        let lat0 = lat0_deg * to_rad;
        let lat1 = lat1_deg * to_rad;
        let lat2 = lat2_deg * to_rad;

        let m1 = m(e, lat1);
        let m2 = m(e, lat2);
        let q0 = q(e, lat0);
        let q1 = q(e, lat1);
        let q2 = q(e, lat2);

        let n = if (lat1 - lat2).abs() < 1e-10 {
            // Single standard parallel
            lat1.sin()
        } else {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        };
        let c = m1 * m1 + n * q1;
        let rho0 = semi_major_axis * (c - n * q0).sqrt() / n;

        Self {
            a: semi_major_axis,
            e,
            lon0: lon0_deg * to_rad,
            false_easting,
            false_northing,
            n,
            c,
            rho0,
        }
    }

    /// EPSG:3338, NAD83 / Alaska Albers.
    pub fn alaska() -> Self {
        Self::new(
            6378137.0,     // GRS80 a
            298.257222101, // GRS80 1/f
            50.0,          // latitude of origin
            -154.0,        // central meridian
            55.0,          // standard parallel 1
            65.0,          // standard parallel 2
            0.0,
            0.0,
        )
    }

    /// Convert geographic coordinates (degrees) to projected (x, y) meters.
    ///
    /// The input range is not checked. Points far outside Alaska still project;
    /// deciding whether data exists there is left to the data service.
    pub fn project(&self, lat_deg: f64, lon_deg: f64) -> PfResult<(f64, f64)> {
        if !lat_deg.is_finite() || !lon_deg.is_finite() {
            return Err(PfError::ProjectionError(format!(
                "non-finite coordinate ({}, {})",
                lat_deg, lon_deg
            )));
        }

        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon_deg * to_rad - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.a * (self.c - self.n * q(self.e, lat)).sqrt() / self.n;
        let theta = self.n * dlon;

        let x = self.false_easting + rho * theta.sin();
        let y = self.false_northing + self.rho0 - rho * theta.cos();

        Ok((x, y))
    }

    /// Convert projected (x, y) meters back to geographic (lat, lon) degrees.
    pub fn unproject(&self, x: f64, y: f64) -> PfResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(PfError::ProjectionError(format!(
                "non-finite coordinate ({}, {})",
                x, y
            )));
        }

        let to_deg = 180.0 / PI;
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let dy = self.rho0 - y;
        let rho = (x * x + dy * dy).sqrt();
        let theta = if self.n < 0.0 {
            (-x).atan2(-dy)
        } else {
            x.atan2(dy)
        };

        let qv = (self.c - rho * rho * self.n * self.n / (self.a * self.a)) / self.n;
        let lat = self.latitude_from_q(qv)?;
        let lon = self.lon0 + theta / self.n;

        Ok((lat * to_deg, lon * to_deg))
    }

    /// Invert q(φ) by fixed-point iteration (Snyder eq. 3-16).
    fn latitude_from_q(&self, qv: f64) -> PfResult<f64> {
        let e = self.e;
        let e2 = e * e;

        // q at the poles; values beyond it are off the ellipsoid
        let q_pole = 1.0 - (1.0 - e2) / (2.0 * e) * ((1.0 - e) / (1.0 + e)).ln();
        if qv.abs() >= q_pole {
            return Ok(PI / 2.0 * qv.signum());
        }

        let mut lat = (qv / 2.0).clamp(-1.0, 1.0).asin();
        for _ in 0..INVERSE_MAX_ITERATIONS {
            let sin_lat = lat.sin();
            let cos_lat = lat.cos();
            let one_minus = 1.0 - e2 * sin_lat * sin_lat;
            let delta = one_minus * one_minus / (2.0 * cos_lat)
                * (qv / (1.0 - e2) - sin_lat / one_minus
                    + (1.0 / (2.0 * e)) * ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).ln());
            lat += delta;
            if delta.abs() < INVERSE_TOLERANCE {
                return Ok(lat);
            }
        }

        Err(PfError::ProjectionError(format!(
            "latitude iteration did not converge for q = {}",
            qv
        )))
    }
}

/// Snyder eq. 14-15.
fn m(e: f64, lat: f64) -> f64 {
    let sin_lat = lat.sin();
    lat.cos() / (1.0 - e * e * sin_lat * sin_lat).sqrt()
}

/// Snyder eq. 3-12.
fn q(e: f64, lat: f64) -> f64 {
    let sin_lat = lat.sin();
    let e2 = e * e;
    (1.0 - e2)
        * (sin_lat / (1.0 - e2 * sin_lat * sin_lat)
            - (1.0 / (2.0 * e)) * ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).ln())
}
