//! HTTP client for the percentile service.
//!
//! One GET per point, `?xcoord=<x>&ycoord=<y>` in EPSG:3338 metres. No retry
//! and no client-side timeout: a slow backend simply delays the answer.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use pf_common::{PfError, PfResult};

use crate::bundle::ResultBundle;
use crate::decode::decode_payload;

/// Source of result bundles for projected points.
#[async_trait]
pub trait PfSource: Send + Sync {
    /// Fetch the bundle for one projected point.
    async fn fetch(&self, x: f64, y: f64) -> PfResult<ResultBundle>;
}

/// Remote data client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct RemoteDataClient {
    client: Client,
    base_url: String,
}

impl RemoteDataClient {
    pub fn new(base_url: impl Into<String>) -> PfResult<Self> {
        let client = Client::builder()
            .tcp_nodelay(true)
            .build()
            .map_err(|e| PfError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PfSource for RemoteDataClient {
    #[instrument(skip(self), fields(url = %self.base_url))]
    async fn fetch(&self, x: f64, y: f64) -> PfResult<ResultBundle> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("xcoord", x), ("ycoord", y)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Data service request failed");
                PfError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Data service returned an error status");
            return Err(PfError::Unavailable(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PfError::Unavailable(format!("Failed to read response body: {}", e)))?;

        debug!(bytes = body.len(), "Received data service payload");

        decode_payload(&body)
    }
}
