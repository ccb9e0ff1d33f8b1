//! HTTP request handlers for the point lookup service.

pub mod cache;
pub mod health;
pub mod point;
pub mod tables;

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Extension, Router,
};
use serde::Serialize;

use pf_common::{PfError, PfResult};

use crate::state::AppState;

/// Build the service router. Transport layers are added by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tables", get(tables::tables_handler))
        .route("/api/point", get(point::point_handler))
        .route("/api/cache", get(cache::cache_handler))
        .route("/health", get(health::health_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(Extension(state))
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// JSON error response with the status code for the error kind.
pub fn error_response(err: &PfError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
        tracing::error!(error = %err, kind = err.kind(), "Request failed");
    } else {
        tracing::debug!(error = %err, kind = err.kind(), "Request rejected");
    }

    let body = ErrorBody {
        error: err.kind(),
        message: err.user_message(),
    };
    let json = serde_json::to_string(&body).unwrap_or_default();

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(json.into())
        .unwrap_or_default()
}

/// Parse a required coordinate parameter.
pub(crate) fn parse_coordinate(name: &str, value: Option<&str>) -> PfResult<f64> {
    let raw = match value {
        Some(v) if !v.trim().is_empty() => v.trim(),
        _ => return Err(PfError::MissingParameter(name.to_string())),
    };

    raw.parse::<f64>()
        .map_err(|_| PfError::invalid_parameter(name, format!("'{}' is not a number", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("lat", Some(" 66.55 ")).unwrap(), 66.55);
        assert!(matches!(
            parse_coordinate("lat", None),
            Err(PfError::MissingParameter(_))
        ));
        assert!(matches!(
            parse_coordinate("lon", Some("")),
            Err(PfError::MissingParameter(_))
        ));
        assert!(matches!(
            parse_coordinate("lon", Some("west")),
            Err(PfError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(&PfError::Unavailable("down".into()));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = error_response(&PfError::MissingParameter("lat".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
