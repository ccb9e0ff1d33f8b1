//! Point cache inspection.

use std::sync::Arc;

use axum::{extract::Extension, Json};

use crate::point_cache::CacheSnapshot;
use crate::state::AppState;

/// GET /api/cache - Cached points and hit/miss counters
pub async fn cache_handler(Extension(state): Extension<Arc<AppState>>) -> Json<CacheSnapshot> {
    Json(state.service.cache_snapshot().await)
}
