//! End-to-end tests for the HTTP surface.
//!
//! Requests go through the router with `oneshot`; the percentile service is
//! an in-process mock so the whole fetch path (projection, HTTP, decode,
//! cache, render) is exercised.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use pf_api::router;
use pf_api::state::AppState;
use pf_data::RemoteDataClient;
use test_utils::backend::unreachable_url;
use test_utils::{fixtures, MockBackend, PayloadBuilder};

fn app_for(url: String) -> Router {
    let client = RemoteDataClient::new(url.clone()).unwrap();
    router(Arc::new(AppState::with_source(Arc::new(client), url)))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn tables_uri(point: (f64, f64), extra: &str) -> String {
    format!("/api/tables?lat={}&lon={}{}", point.0, point.1, extra)
}

// ============================================================================
// Tables
// ============================================================================

#[tokio::test]
async fn test_tables_for_north_slope() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    let (status, html) = get(
        &app,
        &tables_uri(
            fixtures::points::NORTH_SLOPE,
            "&gcm=GFDL-CM3&timerange=2020-2049&units=imperial",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Results for point (66.55, -149.19)"));
    assert!(html.contains(
        "Modeled cumulative rainfall for model GFDL-CM3 for time range 2020-2049 in inches"
    ));
    let (lo, hi) = fixtures::cells::FIRST_CELL_BOUNDS_IMPERIAL;
    assert!(html.contains(&format!(
        "<th scope=\"row\">60m</th><td><p><strong>{}</strong></p><span><em>({}&ndash;{})</em></span></td>",
        fixtures::cells::FIRST_CELL_IMPERIAL,
        lo,
        hi
    )));
    assert!(!html.contains("NCAR-CCSM4-pf-table"));
}

#[tokio::test]
async fn test_tables_default_to_all_models() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    let (status, html) = get(&app, &tables_uri(fixtures::points::FAIRBANKS, "")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("id=\"GFDL-CM3-pf-table\""));
    assert!(html.contains("id=\"NCAR-CCSM4-pf-table\""));
    assert!(html.contains("time range 2020-2049 in inches"));
}

#[tokio::test]
async fn test_tables_metric() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    let (status, html) = get(
        &app,
        &tables_uri(fixtures::points::NORTH_SLOPE, "&gcm=GFDL-CM3&units=metric"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("in millimeters"));
    assert!(html.contains(&format!(
        "<strong>{}</strong>",
        fixtures::cells::FIRST_CELL_METRIC
    )));
}

#[tokio::test]
async fn test_repeat_queries_hit_backend_once() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    let (first_status, first) = get(&app, &tables_uri(fixtures::points::NORTH_SLOPE_CLICK, "")).await;
    let (_, second) = get(&app, &tables_uri(fixtures::points::NORTH_SLOPE, "")).await;
    // Switching units or time range reuses the cached bundle
    let (metric_status, _) = get(
        &app,
        &tables_uri(fixtures::points::NORTH_SLOPE, "&units=metric&timerange=2080-2099"),
    )
    .await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(metric_status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(backend.hits(), 1);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_invalid_latitude_is_bad_request() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    let (status, body) = get(&app, "/api/tables?lat=north&lon=-149.19").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "InvalidParameter");
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn test_missing_longitude_is_bad_request() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    let (status, body) = get(&app, "/api/tables?lat=66.55").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "MissingParameter");
}

#[tokio::test]
async fn test_unknown_units_is_bad_request() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    let (status, _) = get(&app, &tables_uri(fixtures::points::NORTH_SLOPE, "&units=furlongs")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_coordinate_is_bad_request() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    let (status, body) = get(&app, "/api/tables?lat=1e17&lon=-149.19").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "InvalidParameter");
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn test_point_outside_data_set_is_not_found() {
    let backend = MockBackend::start(PayloadBuilder::new().all_missing().to_bytes()).await;
    let app = app_for(backend.url());

    let (status, body) = get(&app, &tables_uri(fixtures::points::HONOLULU, "")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "OutsideDataSet");
    assert!(json["message"].as_str().unwrap().contains("(21.31, -157.86)"));
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let app = app_for(unreachable_url().await);

    let (status, body) = get(&app, &tables_uri(fixtures::points::ANCHORAGE, "")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Unavailable");
}

#[tokio::test]
async fn test_garbage_backend_body_is_bad_gateway() {
    let backend = MockBackend::start(b"<html>oops</html>".to_vec()).await;
    let app = app_for(backend.url());

    let (status, body) = get(&app, &tables_uri(fixtures::points::ANCHORAGE, "")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "MalformedResponse");
}

// ============================================================================
// Point, cache and health
// ============================================================================

#[tokio::test]
async fn test_point_lookup() {
    let app = app_for(unreachable_url().await);

    let (status, body) = get(&app, "/api/point?lat=61.2181&lon=-149.9003").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["label"], "(61.22, -149.90)");
    let (x, y) = fixtures::projected::ANCHORAGE;
    assert!((json["x"].as_f64().unwrap() - x).abs() < 0.01);
    assert!((json["y"].as_f64().unwrap() - y).abs() < 0.01);
}

#[tokio::test]
async fn test_cache_listing() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    get(&app, &tables_uri(fixtures::points::JUNEAU, "")).await;
    get(&app, &tables_uri(fixtures::points::JUNEAU, "&units=metric")).await;

    let (status, body) = get(&app, "/api/cache").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["entries"].as_array().unwrap().len(), 1);
    assert_eq!(json["entries"][0]["label"], "(58.30, -134.42)");
    assert_eq!(json["entries"][0]["has_data"], true);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
}

#[tokio::test]
async fn test_health() {
    let app = app_for(unreachable_url().await);

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["cached_points"], 0);
}

#[tokio::test]
async fn test_health_counts_cached_points() {
    let backend = MockBackend::start(PayloadBuilder::new().to_bytes()).await;
    let app = app_for(backend.url());

    get(&app, &tables_uri(fixtures::points::ANCHORAGE, "")).await;
    get(&app, &tables_uri(fixtures::points::FAIRBANKS, "")).await;

    let (_, body) = get(&app, "/health").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["cached_points"], 2);
}

#[tokio::test]
async fn test_metrics_without_recorder_is_empty() {
    let app = app_for(unreachable_url().await);

    let (status, body) = get(&app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}
