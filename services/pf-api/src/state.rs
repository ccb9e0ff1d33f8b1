//! Application state for the point lookup service.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use pf_data::{PfSource, RemoteDataClient};

use crate::config::ServiceConfig;
use crate::coordinator::PrecipService;

/// Shared application state.
pub struct AppState {
    /// Request coordinator owning the point cache.
    pub service: PrecipService,

    /// Percentile service endpoint, reported by the health check.
    pub api_url: String,
}

impl AppState {
    /// Create the state for a configured percentile service.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = RemoteDataClient::new(config.api_url.clone())?;
        info!(api_url = %config.api_url, "Using percentile service");

        Ok(Self::with_source(Arc::new(client), config.api_url.clone()))
    }

    /// Create the state around any data source.
    pub fn with_source(source: Arc<dyn PfSource>, api_url: impl Into<String>) -> Self {
        Self {
            service: PrecipService::new(source),
            api_url: api_url.into(),
        }
    }
}
