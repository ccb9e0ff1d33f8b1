//! Service configuration.
//!
//! Read once at startup from command-line flags, with environment variables
//! (and a `.env` file, loaded in `main`) as fallbacks.

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use clap::Parser;

/// Percentile service used when `API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://apollo.snap.uaf.edu:3000/api/percentiles";

/// Alaska precipitation-frequency server
#[derive(Parser, Debug, Clone)]
#[command(name = "pf-api")]
#[command(about = "Alaska precipitation-frequency point lookup server")]
pub struct ServiceConfig {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "PF_LISTEN_ADDR")]
    pub listen: String,

    /// Percentile service endpoint
    #[arg(long, default_value = DEFAULT_API_URL, env = "API_URL")]
    pub api_url: String,

    /// Log level (overridden by RUST_LOG when set)
    #[arg(long, default_value = "info", env = "PF_LOG_LEVEL")]
    pub log_level: String,

    /// Number of worker threads
    #[arg(long, env = "PF_WORKER_THREADS")]
    pub worker_threads: Option<usize>,
}

impl ServiceConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.listen))
    }

    /// Reject settings that would only fail on the first request.
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            bail!("API_URL must be an http(s) URL, got '{}'", self.api_url);
        }

        if self.worker_threads == Some(0) {
            bail!("worker thread count must be at least 1");
        }

        Ok(())
    }
}
