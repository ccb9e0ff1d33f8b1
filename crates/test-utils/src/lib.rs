//! Shared test utilities for the ak-precip workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic percentile payloads with predictable cell values
//! - Well-known query points
//! - An in-process stand-in for the percentile service
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, PayloadBuilder, MockBackend};
//! ```

pub mod backend;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use backend::MockBackend;
pub use generators::*;
