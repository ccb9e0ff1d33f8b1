//! Rendered precipitation-frequency tables for a point.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use pf_common::{Gcm, PfResult, QueryPoint, TimeRange, Units};
use pf_renderer::tables_to_html;

use super::{error_response, parse_coordinate};
use crate::coordinator::TableRequest;
use crate::state::AppState;

/// Query parameters for the tables endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TablesQueryParams {
    /// Latitude in degrees. Required.
    pub lat: Option<String>,

    /// Longitude in degrees. Required.
    pub lon: Option<String>,

    /// Projection period, defaults to 2020-2049.
    pub timerange: Option<String>,

    /// `imperial` (default) or `metric`.
    pub units: Option<String>,

    /// Single model to render; all models when absent or `all`.
    pub gcm: Option<String>,
}

impl TablesQueryParams {
    pub fn to_request(&self) -> PfResult<TableRequest> {
        let lat = parse_coordinate("lat", self.lat.as_deref())?;
        let lon = parse_coordinate("lon", self.lon.as_deref())?;

        let timerange = match non_empty(&self.timerange) {
            Some(s) => s.parse::<TimeRange>()?,
            None => TimeRange::default(),
        };
        let units = match non_empty(&self.units) {
            Some(s) => s.parse::<Units>()?,
            None => Units::default(),
        };
        let gcm = match non_empty(&self.gcm) {
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(s.parse::<Gcm>()?),
            None => None,
        };

        Ok(TableRequest {
            point: QueryPoint::new(lat, lon)?,
            gcm,
            timerange,
            units,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// GET /api/tables - HTML fragment with one table per climate model
pub async fn tables_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<TablesQueryParams>,
) -> Response {
    let request = match params.to_request() {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    tracing::info!(
        point = %request.point.label(),
        timerange = %request.timerange,
        units = %request.units,
        "Table request"
    );

    match state.service.tables_for(&request).await {
        Ok(tables) => Html(format!(
            "<div class=\"pf-results\">\n<h4>Results for point {}</h4>\n{}</div>\n",
            request.point.label(),
            tables_to_html(&tables)
        ))
        .into_response(),
        Err(e) => error_response(&e),
    }
}
