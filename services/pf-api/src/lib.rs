//! Precipitation-frequency point lookup service.
//!
//! Projects a clicked or typed point into EPSG:3338, fetches the percentile
//! bundle for it (once per rounded point), and serves the rendered tables as
//! an HTML fragment.

pub mod config;
pub mod coordinator;
pub mod handlers;
pub mod point_cache;
pub mod state;

pub use handlers::router;
