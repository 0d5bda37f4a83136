//! Integration tests for the HTTP API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use chaincast_ids::{create_router, AppState};
use ids_lib::{BroadcastHub, Pipeline};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn setup_test_app() -> (Router, Arc<AppState>) {
    let hub = Arc::new(BroadcastHub::default());
    let pipeline = Arc::new(Pipeline::new(hub));
    let state = Arc::new(AppState::new(pipeline, Duration::from_secs(30)));
    let router = create_router(state.clone());

    (router, state)
}

fn sample_body(gas_price: f64) -> Value {
    json!({
        "network": "eth",
        "gas_price": gas_price,
        "block_time": 5,
        "tx_volume": 100,
        "pending_tx": 10,
        "failed_tx_rate": 0.1
    })
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_raw(app: &Router, uri: &str, body: String) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_returns_ok() {
    let (app, _state) = setup_test_app();

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_post_metric_is_received() {
    let (app, state) = setup_test_app();

    let response = post_json(&app, "/metrics", sample_body(50.0)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"received": true}));

    assert_eq!(state.pipeline.sample_count().await, 1);
}

#[tokio::test]
async fn test_gas_spike_appears_in_alerts() {
    let (app, _state) = setup_test_app();

    post_json(&app, "/metrics", sample_body(50.0)).await;
    post_json(&app, "/metrics", sample_body(200.0)).await;

    let response = get(&app, "/alerts").await;
    assert_eq!(response.status(), StatusCode::OK);

    let alerts = body_json(response).await;
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["id"], 1);
    assert_eq!(alerts[0]["type"], "Gas Spike");
    assert_eq!(alerts[0]["severity"], "High");
    assert_eq!(alerts[0]["sample"]["gas_price"], 200.0);
    assert_eq!(alerts[0]["ts"], alerts[0]["sample"]["ts"]);
}

#[tokio::test]
async fn test_alerts_empty_initially() {
    let (app, _state) = setup_test_app();

    let alerts = body_json(get(&app, "/alerts").await).await;
    assert_eq!(alerts, json!([]));
}

#[tokio::test]
async fn test_missing_field_rejected_without_mutation() {
    let (app, state) = setup_test_app();

    let mut body = sample_body(50.0);
    body.as_object_mut().unwrap().remove("gas_price");

    let response = post_json(&app, "/metrics", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let error = body_json(response).await;
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["error"].as_str().unwrap().contains("gas_price"));

    assert_eq!(state.pipeline.sample_count().await, 0);
}

#[tokio::test]
async fn test_wrong_type_rejected() {
    let (app, state) = setup_test_app();

    let mut body = sample_body(50.0);
    body["tx_volume"] = json!("lots");

    let response = post_json(&app, "/metrics", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.pipeline.sample_count().await, 0);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let (app, state) = setup_test_app();

    let response = post_raw(&app, "/metrics", "{not json".to_string()).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(state.pipeline.sample_count().await, 0);
}

#[tokio::test]
async fn test_empty_network_rejected() {
    let (app, state) = setup_test_app();

    let mut body = sample_body(50.0);
    body["network"] = json!("");

    let response = post_json(&app, "/metrics", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.pipeline.sample_count().await, 0);
}

#[tokio::test]
async fn test_stability_score_default_and_latest() {
    let (app, _state) = setup_test_app();

    let score = body_json(get(&app, "/stability_score").await).await;
    assert_eq!(score, json!({"score": 100}));

    // (1 - 0.1) * 100 - 10 / 1000 = 89.99
    post_json(&app, "/metrics", sample_body(50.0)).await;
    let score = body_json(get(&app, "/stability_score").await).await;
    assert_eq!(score, json!({"score": 90}));

    let mut failing = sample_body(50.0);
    failing["failed_tx_rate"] = json!(1.0);
    post_json(&app, "/metrics", failing).await;
    let score = body_json(get(&app, "/stability_score").await).await;
    assert_eq!(score, json!({"score": 0}));
}

#[tokio::test]
async fn test_prometheus_metrics_endpoint() {
    let (app, _state) = setup_test_app();

    post_json(&app, "/metrics", sample_body(50.0)).await;

    let response = get(&app, "/internal/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assert!(body_str.contains("chaincast_samples_ingested_total"));
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let (app, _state) = setup_test_app();

    let response = get(&app, "/unknown").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
