//! HTTP API tests for serve mode.
//!
//! Tests verify:
//! - The viewer document and health endpoints
//! - Overlay listing
//! - Opacity reads and writes, and their error responses

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ndarray::{Array2, Array3};
use serde_json::Value;
use tower::ServiceExt;

use histoseg_viewer::composite::ClassScheme;
use histoseg_viewer::overlay::{OverlaySession, Visualization};
use histoseg_viewer::{create_router, AppState, RouterConfig};

fn test_state() -> AppState {
    let image = Array3::from_elem((4, 6, 3), 120);
    let mut vis = Visualization::new("case_01/he.png", &image, ClassScheme::default()).unwrap();
    for path in ["run_a/seg.png", "run_b/seg.nii.gz"] {
        let labels = Array2::from_elem((4, 6), 1);
        let session = OverlaySession::from_labels(path, &labels, (4, 6), vis.scheme()).unwrap();
        vis.push_overlay(session).unwrap();
    }
    AppState::new(vis)
}

fn router(state: &AppState) -> Router {
    create_router(state.clone(), RouterConfig::new().with_tracing(false))
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_json(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(state, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn put_opacity(state: &AppState, index: usize, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/overlays/{}/opacity", index))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(state, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

// =============================================================================
// Document and health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, json) = get_json(&test_state(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_viewer_document() {
    let state = test_state();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = router(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Image (case_01/he.png) Segmentation (run_a/seg.png)"));
    assert!(html.contains("Image (case_01/he.png) Segmentation (run_b/seg.nii.gz)"));
    assert!(html.contains(r#""live":true"#));
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder()
        .uri("/tiles/x/0/0/0.jpg")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&test_state(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Overlays
// =============================================================================

#[tokio::test]
async fn test_list_overlays() {
    let (status, json) = get_json(&test_state(), "/api/overlays").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["image"], "case_01/he.png");
    assert_eq!(json["rows"], 4);
    assert_eq!(json["cols"], 6);

    let overlays = json["overlays"].as_array().unwrap();
    assert_eq!(overlays.len(), 2);
    assert_eq!(overlays[1]["index"], 1);
    assert_eq!(overlays[1]["name"], "run_b/seg.nii.gz");
    assert_eq!(
        overlays[0]["title"],
        "Image (case_01/he.png) Segmentation (run_a/seg.png)"
    );
    assert_eq!(overlays[0]["opacity"], 0.5);
}

#[tokio::test]
async fn test_get_opacity() {
    let (status, json) = get_json(&test_state(), "/api/overlays/1/opacity").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["index"], 1);
    assert_eq!(json["opacity"], 0.5);
}

#[tokio::test]
async fn test_get_opacity_missing_overlay() {
    let (status, json) = get_json(&test_state(), "/api/overlays/2/opacity").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_put_opacity_updates_one_overlay() {
    let state = test_state();
    let before = state.visualization.read().await.overlays()[1].buffer().clone();

    let (status, json) = put_opacity(&state, 1, r#"{"opacity": 0.2}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["opacity"], 0.2);

    let (status, _) = put_opacity(&state, 1, r#"{"opacity": 0.8}"#).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = get_json(&state, "/api/overlays/1/opacity").await;
    assert_eq!(json["opacity"], 0.8);
    let (_, json) = get_json(&state, "/api/overlays/0/opacity").await;
    assert_eq!(json["opacity"], 0.5);

    let vis = state.visualization.read().await;
    assert_eq!(vis.overlays()[1].buffer(), &before);
}

#[tokio::test]
async fn test_put_opacity_reflected_in_document() {
    let state = test_state();
    put_opacity(&state, 0, r#"{"opacity": 0.25}"#).await;

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (_, body) = send(&state, request).await;
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains(r#"id="opacity-0" type="range" min="0" max="1" step="0.01" value="0.25""#));
}

#[tokio::test]
async fn test_put_invalid_opacity() {
    let state = test_state();

    let (status, json) = put_opacity(&state, 0, r#"{"opacity": 1.5}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_opacity");

    let (status, _) = put_opacity(&state, 0, r#"{"opacity": -0.01}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = get_json(&state, "/api/overlays/0/opacity").await;
    assert_eq!(json["opacity"], 0.5);
}

#[tokio::test]
async fn test_put_opacity_missing_overlay() {
    let (status, json) = put_opacity(&test_state(), 7, r#"{"opacity": 0.3}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_put_malformed_body() {
    let (status, _) = put_opacity(&test_state(), 0, r#"{"alpha": 0.3}"#).await;
    assert!(status.is_client_error());
}
