//! HTTP API: ingestion, queries, health and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ids_lib::{Alert, BroadcastHub, MetricReport, Pipeline, PipelineMetrics};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::ws;

/// How long shutdown waits for realtime connections to send Close and end
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub hub: Arc<BroadcastHub>,
    pub metrics: PipelineMetrics,
    /// Keepalive ping interval for realtime connections
    pub keepalive: Duration,
    /// Realtime connection and delivery tasks, from handshake to close
    pub connections: TaskTracker,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, keepalive: Duration) -> Self {
        let hub = pipeline.hub().clone();
        Self {
            pipeline,
            hub,
            metrics: PipelineMetrics::new(),
            keepalive,
            connections: TaskTracker::new(),
        }
    }

    /// Close every subscriber queue, then wait up to `grace` for the
    /// realtime connections to send their Close frame and finish.
    ///
    /// Returns the number of subscribers that were closed.
    pub async fn close_subscribers(&self, grace: Duration) -> usize {
        let closed = self.hub.shutdown_all().await;
        self.connections.close();

        if tokio::time::timeout(grace, self.connections.wait())
            .await
            .is_err()
        {
            warn!(
                remaining = self.connections.len(),
                "Realtime connections still open after shutdown grace period"
            );
        }
        closed
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceivedResponse {
    pub received: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u8,
}

/// Liveness check. Touches no state.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Ingest one metric report
async fn ingest_metric(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MetricReport>, JsonRejection>,
) -> ApiResult<Json<ReceivedResponse>> {
    let Json(report) = payload.map_err(|rejection| {
        state.metrics.inc_validation_failures();
        ApiError::MalformedBody(rejection.body_text())
    })?;

    state.pipeline.ingest(report).await?;

    Ok(Json(ReceivedResponse { received: true }))
}

/// Stability score of the latest sample
async fn stability_score(State(state): State<Arc<AppState>>) -> Json<ScoreResponse> {
    Json(ScoreResponse {
        score: state.pipeline.stability_score().await,
    })
}

/// Every alert raised so far, oldest first
async fn alerts(State(state): State<Arc<AppState>>) -> Json<Vec<Alert>> {
    Json(state.pipeline.alerts().await)
}

/// Prometheus metrics endpoint
async fn prometheus_metrics() -> ApiResult<impl IntoResponse> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", post(ingest_metric))
        .route("/stability_score", get(stability_score))
        .route("/alerts", get(alerts))
        .route("/ws", get(ws::ws_handler))
        .route("/internal/metrics", get(prometheus_metrics))
        .with_state(state)
}

/// Serve the API on an already-bound listener until `shutdown` resolves.
///
/// The listener stops accepting first; only then are subscribers closed, so
/// no connection can register after the hub shut down. Returns the number
/// of subscribers closed.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> anyhow::Result<usize>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state.clone());

    info!(addr = %listener.local_addr()?, "Starting API server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped accepting connections, closing subscribers");
    Ok(state.close_subscribers(SHUTDOWN_GRACE).await)
}
