//! Point label and projection lookup.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use pf_common::{PfResult, QueryPoint};

use super::{error_response, parse_coordinate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PointQueryParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl PointQueryParams {
    fn to_point(&self) -> PfResult<QueryPoint> {
        let lat = parse_coordinate("lat", self.lat.as_deref())?;
        let lon = parse_coordinate("lon", self.lon.as_deref())?;
        QueryPoint::new(lat, lon)
    }
}

/// GET /api/point - Rounded label and EPSG:3338 coordinates of a point
pub async fn point_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<PointQueryParams>,
) -> Response {
    match params.to_point().and_then(|p| state.service.locate(p)) {
        Ok(located) => Json(located).into_response(),
        Err(e) => error_response(&e),
    }
}
