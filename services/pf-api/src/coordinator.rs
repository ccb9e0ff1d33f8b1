//! Request coordinator: cache lookup, projection, fetch and rendering.
//!
//! One `PrecipService` is built per process and shared by all handlers. It
//! owns the point cache; nothing here is global.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, instrument, warn};

use pf_common::{Gcm, PfError, PfResult, PointKey, QueryPoint, TimeRange, Units, DURATIONS, INTERVALS};
use pf_data::{PfSource, ResultBundle};
use pf_renderer::{render_all, PfTable};
use projection::AlbersEqualArea;

use crate::point_cache::{CacheSnapshot, PointCache};

/// Everything needed to build the tables for one interaction.
#[derive(Debug, Clone, Copy)]
pub struct TableRequest {
    pub point: QueryPoint,
    /// Restrict output to one model; `None` renders every model in the bundle.
    pub gcm: Option<Gcm>,
    pub timerange: TimeRange,
    pub units: Units,
}

/// A query point with its display label and projected coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct LocatedPoint {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    /// EPSG:3338 easting (meters)
    pub x: f64,
    /// EPSG:3338 northing (meters)
    pub y: f64,
}

/// A fetch shared by every request for the same rounded point.
type PendingFetch = Arc<OnceCell<Arc<ResultBundle>>>;

#[derive(Default)]
struct CacheState {
    cache: PointCache,
    /// Fetches started but not yet stored in `cache`.
    pending: HashMap<PointKey, PendingFetch>,
}

pub struct PrecipService {
    projection: AlbersEqualArea,
    source: Arc<dyn PfSource>,
    state: Mutex<CacheState>,
    cached_points: AtomicUsize,
}

impl PrecipService {
    pub fn new(source: Arc<dyn PfSource>) -> Self {
        Self {
            projection: AlbersEqualArea::alaska(),
            source,
            state: Mutex::new(CacheState::default()),
            cached_points: AtomicUsize::new(0),
        }
    }

    /// Rounded label and projected coordinates for a point.
    pub fn locate(&self, point: QueryPoint) -> PfResult<LocatedPoint> {
        let key = point.rounded();
        let (x, y) = self.projection.project(point.lat(), point.lon())?;
        Ok(LocatedPoint {
            lat: key.lat(),
            lon: key.lon(),
            label: key.to_string(),
            x,
            y,
        })
    }

    /// Bundle for a point, fetched at most once per rounded point.
    ///
    /// The state lock only guards map operations. Requests that miss on the
    /// same rounded point share one `OnceCell`, so they wait on a single
    /// fetch while hits for other points proceed. A failed fetch leaves the
    /// cell empty and the next request retries.
    #[instrument(skip(self, point), fields(point = %point.label()))]
    pub async fn bundle_for(&self, point: QueryPoint) -> PfResult<Arc<ResultBundle>> {
        let key = point.rounded();

        let cell = {
            let mut state = self.state.lock().await;
            if let Some(bundle) = state.cache.lookup(&point) {
                counter!("pf_cache_hits_total").increment(1);
                debug!("Point cache hit");
                return Ok(bundle);
            }
            counter!("pf_cache_misses_total").increment(1);
            Arc::clone(state.pending.entry(key).or_default())
        };

        let bundle = cell
            .get_or_try_init(|| self.fetch_point(point))
            .await
            .map(Arc::clone)?;

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        // Whichever waiter gets here first moves the bundle into the cache
        if state
            .pending
            .get(&key)
            .is_some_and(|pending| Arc::ptr_eq(pending, &cell))
        {
            state.pending.remove(&key);
            if state.cache.insert(&point, Arc::clone(&bundle)) {
                let cached = self.cached_points.fetch_add(1, Ordering::Relaxed) + 1;
                info!(cached_points = cached, "Cached percentile data for new point");
            }
        }

        Ok(bundle)
    }

    async fn fetch_point(&self, point: QueryPoint) -> PfResult<Arc<ResultBundle>> {
        let (x, y) = self.projection.project(point.lat(), point.lon())?;
        debug!(x, y, "Projected point to EPSG:3338");

        counter!("pf_backend_fetches_total").increment(1);
        match self.source.fetch(x, y).await {
            Ok(bundle) => Ok(Arc::new(bundle)),
            Err(e) => {
                counter!("pf_backend_errors_total").increment(1);
                warn!(error = %e, "Fetching percentile data failed");
                Err(e)
            }
        }
    }

    /// Rendered tables for one interaction.
    pub async fn tables_for(&self, request: &TableRequest) -> PfResult<Vec<PfTable>> {
        let bundle = self.bundle_for(request.point).await?;

        if !bundle.has_data() {
            return Err(PfError::OutsideDataSet(request.point.label()));
        }

        let tables = render_all(
            &bundle,
            &DURATIONS,
            &INTERVALS,
            request.gcm,
            request.timerange,
            request.units,
        )?;
        counter!("pf_tables_rendered_total").increment(tables.len() as u64);

        Ok(tables)
    }

    /// Number of cached points, read without taking the state lock.
    pub fn cached_points(&self) -> usize {
        self.cached_points.load(Ordering::Relaxed)
    }

    pub async fn cache_snapshot(&self) -> CacheSnapshot {
        self.state.lock().await.cache.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pf_data::decode_payload;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use test_utils::{fixtures, PayloadBuilder};
    use tokio::sync::Notify;
    use tokio::time::timeout;

    /// Serves a fixed payload and counts calls.
    struct CountingSource {
        body: Vec<u8>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn new(body: Vec<u8>) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            })
        }

        fn slow(body: Vec<u8>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicUsize::new(0),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PfSource for CountingSource {
        async fn fetch(&self, _x: f64, _y: f64) -> PfResult<ResultBundle> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            decode_payload(&self.body)
        }
    }

    /// Holds fetches while closed until `release` is called.
    struct GatedSource {
        body: Vec<u8>,
        calls: AtomicUsize,
        closed: AtomicBool,
        open: Notify,
    }

    impl GatedSource {
        fn new(body: Vec<u8>) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                open: Notify::new(),
            })
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        fn release(&self) {
            self.closed.store(false, Ordering::SeqCst);
            self.open.notify_one();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PfSource for GatedSource {
        async fn fetch(&self, _x: f64, _y: f64) -> PfResult<ResultBundle> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.closed.load(Ordering::SeqCst) {
                self.open.notified().await;
            }
            decode_payload(&self.body)
        }
    }

    /// Fails the first call, then serves a fixed payload.
    struct FlakySource {
        body: Vec<u8>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PfSource for FlakySource {
        async fn fetch(&self, _x: f64, _y: f64) -> PfResult<ResultBundle> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(PfError::Unavailable("connection reset".to_string()));
            }
            decode_payload(&self.body)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PfSource for FailingSource {
        async fn fetch(&self, _x: f64, _y: f64) -> PfResult<ResultBundle> {
            Err(PfError::Unavailable("connection refused".to_string()))
        }
    }

    fn request(lat: f64, lon: f64) -> TableRequest {
        TableRequest {
            point: QueryPoint::new(lat, lon).unwrap(),
            gcm: None,
            timerange: TimeRange::Early,
            units: Units::Imperial,
        }
    }

    #[tokio::test]
    async fn test_repeat_query_fetches_once() {
        let source = CountingSource::new(PayloadBuilder::new().to_bytes());
        let service = PrecipService::new(source.clone());

        let (lat, lon) = fixtures::points::NORTH_SLOPE;
        let first = service.tables_for(&request(lat, lon)).await.unwrap();
        let second = service.tables_for(&request(lat, lon)).await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_nearby_click_reuses_rounded_point() {
        let source = CountingSource::new(PayloadBuilder::new().to_bytes());
        let service = PrecipService::new(source.clone());

        let (lat, lon) = fixtures::points::NORTH_SLOPE_CLICK;
        service.bundle_for(QueryPoint::new(lat, lon).unwrap()).await.unwrap();
        let (lat, lon) = fixtures::points::NORTH_SLOPE;
        service.bundle_for(QueryPoint::new(lat, lon).unwrap()).await.unwrap();

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_points_fetch_separately() {
        let source = CountingSource::new(PayloadBuilder::new().to_bytes());
        let service = PrecipService::new(source.clone());

        for (lat, lon) in [fixtures::points::ANCHORAGE, fixtures::points::FAIRBANKS] {
            service.bundle_for(QueryPoint::new(lat, lon).unwrap()).await.unwrap();
        }

        assert_eq!(source.calls(), 2);
        assert_eq!(service.cache_snapshot().await.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_for_same_point_fetch_once() {
        let source = CountingSource::slow(PayloadBuilder::new().to_bytes(), Duration::from_millis(50));
        let service = Arc::new(PrecipService::new(source.clone()));

        let (lat, lon) = fixtures::points::ANCHORAGE;
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .bundle_for(QueryPoint::new(lat, lon).unwrap())
                        .await
                        .map(|_| ())
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_missing_bundle_is_outside_data_set() {
        let source = CountingSource::new(PayloadBuilder::new().all_missing().to_bytes());
        let service = PrecipService::new(source.clone());

        let (lat, lon) = fixtures::points::HONOLULU;
        let err = service.tables_for(&request(lat, lon)).await.unwrap_err();
        match err {
            PfError::OutsideDataSet(label) => assert_eq!(label, "(21.31, -157.86)"),
            other => panic!("expected OutsideDataSet, got {:?}", other),
        }

        // The empty answer is cached like any other bundle
        service.tables_for(&request(lat, lon)).await.unwrap_err();
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let service = PrecipService::new(Arc::new(FailingSource));

        let (lat, lon) = fixtures::points::FAIRBANKS;
        let err = service.tables_for(&request(lat, lon)).await.unwrap_err();
        assert!(matches!(err, PfError::Unavailable(_)));
        assert!(service.cache_snapshot().await.entries.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_in_flight_does_not_block_cached_points() {
        let source = GatedSource::new(PayloadBuilder::new().to_bytes());
        let service = Arc::new(PrecipService::new(source.clone()));

        let (lat, lon) = fixtures::points::ANCHORAGE;
        let cached = QueryPoint::new(lat, lon).unwrap();
        service.bundle_for(cached).await.unwrap();

        source.close();
        let slow = {
            let service = Arc::clone(&service);
            let (lat, lon) = fixtures::points::FAIRBANKS;
            tokio::spawn(async move {
                service
                    .bundle_for(QueryPoint::new(lat, lon).unwrap())
                    .await
                    .map(|_| ())
            })
        };
        while source.calls() < 2 {
            tokio::task::yield_now().await;
        }

        let hit = timeout(Duration::from_secs(1), service.bundle_for(cached))
            .await
            .expect("cached point waited on another point's fetch");
        assert!(hit.is_ok());
        let snapshot = timeout(Duration::from_secs(1), service.cache_snapshot())
            .await
            .expect("snapshot waited on a fetch");
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(service.cached_points(), 1);

        source.release();
        slow.await.unwrap().unwrap();
        assert_eq!(service.cached_points(), 2);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried() {
        let source = Arc::new(FlakySource {
            body: PayloadBuilder::new().to_bytes(),
            calls: AtomicUsize::new(0),
        });
        let service = PrecipService::new(source.clone());

        let (lat, lon) = fixtures::points::JUNEAU;
        let point = QueryPoint::new(lat, lon).unwrap();
        assert!(service.bundle_for(point).await.is_err());
        assert_eq!(service.cached_points(), 0);

        service.bundle_for(point).await.unwrap();
        service.bundle_for(point).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.cached_points(), 1);
    }

    #[test]
    fn test_locate() {
        let service = PrecipService::new(Arc::new(FailingSource));
        let (lat, lon) = fixtures::points::NORTH_SLOPE_CLICK;
        let located = service.locate(QueryPoint::new(lat, lon).unwrap()).unwrap();

        assert_eq!(located.label, "(66.55, -149.19)");
        assert_eq!(located.lat, 66.55);
        let (x, y) = fixtures::projected::NORTH_SLOPE;
        // Unrounded click is a few hundred meters from the rounded point
        assert!((located.x - x).abs() < 500.0);
        assert!((located.y - y).abs() < 500.0);
    }
}
