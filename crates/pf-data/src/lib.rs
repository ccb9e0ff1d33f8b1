//! Precipitation-frequency data access.
//!
//! - [`bundle`]: the five-axis result array and axis selection
//! - [`decode`]: payload decoding into a [`ResultBundle`]
//! - [`client`]: the HTTP client for the percentile service

pub mod bundle;
pub mod client;
pub mod decode;

pub use bundle::{BundleAxes, ResultBundle};
pub use client::{PfSource, RemoteDataClient};
pub use decode::decode_payload;
