//! HTTP request handlers for the overlay viewer.
//!
//! # Endpoints
//!
//! - `GET /` - The viewer document
//! - `GET /health` - Health check
//! - `GET /api/overlays` - Overlay names, titles and opacities
//! - `GET /api/overlays/{index}/opacity` - Current opacity of one overlay
//! - `PUT /api/overlays/{index}/opacity` - Opacity-changed event from a slider

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::OverlayError;
use crate::overlay::Visualization;

use super::viewer::{generate_document, OpacitySync};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// Opacity writes take the lock exclusively; document renders and API reads
/// share it, so a render always sees one consistent set of opacities.
#[derive(Clone)]
pub struct AppState {
    pub visualization: Arc<RwLock<Visualization>>,
}

impl AppState {
    pub fn new(visualization: Visualization) -> Self {
        Self {
            visualization: Arc::new(RwLock::new(visualization)),
        }
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body of an opacity update.
#[derive(Debug, Deserialize)]
pub struct OpacityRequest {
    pub opacity: f64,
}

/// Current opacity of one overlay.
#[derive(Debug, Serialize)]
pub struct OpacityResponse {
    pub index: usize,
    pub opacity: f64,
}

/// One entry of the overlay listing.
#[derive(Debug, Serialize)]
pub struct OverlayResponse {
    pub index: usize,
    pub name: String,
    pub title: String,
    pub opacity: f64,
}

/// Response from the overlay listing endpoint.
#[derive(Debug, Serialize)]
pub struct OverlaysResponse {
    /// Short name of the base image
    pub image: String,
    pub rows: usize,
    pub cols: usize,
    pub overlays: Vec<OverlayResponse>,
}

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_opacity")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    pub status: u16,
}

impl ErrorResponse {
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: status.as_u16(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Client errors are logged at WARN, anything else at ERROR.
impl IntoResponse for OverlayError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            OverlayError::NoSuchOverlay { .. } => (StatusCode::NOT_FOUND, "not_found"),
            OverlayError::InvalidOpacity(_) => (StatusCode::BAD_REQUEST, "invalid_opacity"),
            OverlayError::ShapeMismatch { .. } => (StatusCode::CONFLICT, "shape_mismatch"),
            OverlayError::Load(_) | OverlayError::NotAnImage { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "load_error")
            }
            OverlayError::Composite(_) => (StatusCode::UNPROCESSABLE_ENTITY, "composite_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = error_type, "{}", message);
        } else {
            warn!(status = status.as_u16(), error = error_type, "{}", message);
        }

        let body = ErrorResponse::with_status(error_type, message, status);
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /` - the viewer, with sliders wired to the opacity API.
pub async fn viewer_handler(State(state): State<AppState>) -> Html<String> {
    let visualization = state.visualization.read().await;
    Html(generate_document(&visualization, OpacitySync::Server))
}

/// `GET /health`
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/overlays`
pub async fn overlays_handler(
    State(state): State<AppState>,
) -> Result<Json<OverlaysResponse>, OverlayError> {
    let visualization = state.visualization.read().await;
    let (rows, cols) = visualization.extent();

    let overlays = visualization
        .overlays()
        .iter()
        .enumerate()
        .map(|(index, overlay)| {
            Ok(OverlayResponse {
                index,
                name: overlay.name().to_string(),
                title: visualization.title(index)?,
                opacity: overlay.opacity(),
            })
        })
        .collect::<Result<Vec<_>, OverlayError>>()?;

    Ok(Json(OverlaysResponse {
        image: visualization.image_name().to_string(),
        rows,
        cols,
        overlays,
    }))
}

/// `GET /api/overlays/{index}/opacity`
pub async fn get_opacity_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<OpacityResponse>, OverlayError> {
    let visualization = state.visualization.read().await;
    let opacity = visualization.overlay(index)?.opacity();
    Ok(Json(OpacityResponse { index, opacity }))
}

/// `PUT /api/overlays/{index}/opacity` with `{"opacity": 0.7}`.
///
/// Overwrites the opacity; the overlay buffer is left as is.
pub async fn put_opacity_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<OpacityRequest>,
) -> Result<Json<OpacityResponse>, OverlayError> {
    let mut visualization = state.visualization.write().await;
    visualization.set_opacity(index, request.opacity)?;

    debug!(index, opacity = request.opacity, "opacity changed");
    if request.opacity == 0.0 {
        info!(index, "overlay hidden");
    }

    Ok(Json(OpacityResponse {
        index,
        opacity: request.opacity,
    }))
}
