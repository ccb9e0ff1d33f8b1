//! In-process stand-in for the percentile service.
//!
//! Serves a fixed body on `/api/percentiles` from an ephemeral port and
//! records how often it was called.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    routing::get,
    Router,
};

#[derive(Clone)]
struct BackendState {
    body: Arc<Vec<u8>>,
    status: StatusCode,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
}

/// A running mock backend. The server task lives as long as the runtime.
pub struct MockBackend {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    /// Serve `body` with status 200.
    pub async fn start(body: Vec<u8>) -> Self {
        Self::start_with_status(body, 200).await
    }

    /// Serve `body` with the given status code.
    pub async fn start_with_status(body: Vec<u8>, status: u16) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_query = Arc::new(Mutex::new(None));
        let state = BackendState {
            body: Arc::new(body),
            status: StatusCode::from_u16(status).expect("valid status code"),
            hits: Arc::clone(&hits),
            last_query: Arc::clone(&last_query),
        };

        let app = Router::new()
            .route("/api/percentiles", get(percentiles))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend failed");
        });

        Self {
            addr,
            hits,
            last_query,
        }
    }

    /// Base URL to configure the client with.
    pub fn url(&self) -> String {
        format!("http://{}/api/percentiles", self.addr)
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw query string of the most recent request.
    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().expect("query lock").clone()
    }
}

/// A URL nothing listens on, for unreachable-backend tests.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe port");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}/api/percentiles", addr)
}

async fn percentiles(
    State(state): State<BackendState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Vec<u8>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().expect("query lock") = query;
    (state.status, state.body.as_ref().clone())
}
