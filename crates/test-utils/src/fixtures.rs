//! Common test fixtures for ak-precip tests.
//!
//! Points are `(lat, lon)` in WGS84 degrees; projected values are EPSG:3338
//! metres.

/// Well-known query points.
pub mod points {
    /// North Slope point used throughout the UI walkthrough
    pub const NORTH_SLOPE: (f64, f64) = (66.55, -149.19);

    /// Same point as clicked on the map, before rounding
    pub const NORTH_SLOPE_CLICK: (f64, f64) = (66.5532, -149.1901);

    /// Anchorage
    pub const ANCHORAGE: (f64, f64) = (61.2181, -149.9003);

    /// Fairbanks
    pub const FAIRBANKS: (f64, f64) = (64.8378, -147.7164);

    /// Juneau (panhandle, far east of the central meridian)
    pub const JUNEAU: (f64, f64) = (58.3019, -134.4197);

    /// Honolulu, outside the data set
    pub const HONOLULU: (f64, f64) = (21.3069, -157.8583);
}

/// Reference EPSG:3338 coordinates for the points above.
pub mod projected {
    pub const NORTH_SLOPE: (f64, f64) = (214_229.15, 1_851_370.67);
    pub const ANCHORAGE: (f64, f64) = (219_349.58, 1_255_301.54);
    pub const FAIRBANKS: (f64, f64) = (297_698.81, 1_667_062.25);
    pub const JUNEAU: (f64, f64) = (1_127_916.27, 1_089_943.45);
}

/// Expected cell text for the synthetic payload.
pub mod cells {
    /// GFDL-CM3 / 2020-2049 / 60m / 2-year central estimate, inches
    pub const FIRST_CELL_IMPERIAL: &str = "0.49";
    /// Same cell in millimetres (0.49 * 25.4 = 12.446)
    pub const FIRST_CELL_METRIC: &str = "12.45";
    /// Lower and upper bounds of the first cell, inches
    pub const FIRST_CELL_BOUNDS_IMPERIAL: (&str, &str) = ("0.40", "0.61");
}
