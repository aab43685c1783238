//! Router configuration for the overlay viewer.
//!
//! # Route Structure
//!
//! ```text
//! /                                - Viewer document
//! /health                          - Health check
//! /api/overlays                    - Overlay listing
//! /api/overlays/{index}/opacity    - Get or set one overlay's opacity
//! ```
//!
//! # Example
//!
//! ```ignore
//! use histoseg_viewer::overlay::Visualization;
//! use histoseg_viewer::server::{create_router, AppState, RouterConfig};
//!
//! let vis = Visualization::open("case/he.png", &["case/seg.png"], Default::default())?;
//! let router = create_router(AppState::new(vis), RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    get_opacity_handler, health_handler, overlays_handler, put_opacity_handler, viewer_handler,
    AppState,
};

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Tracing is enabled by default.
    pub fn new() -> Self {
        Self {
            enable_tracing: true,
        }
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the application router.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let router = Router::new()
        .route("/", get(viewer_handler))
        .route("/health", get(health_handler))
        .route("/api/overlays", get(overlays_handler))
        .route(
            "/api/overlays/{index}/opacity",
            get(get_opacity_handler).put(put_opacity_handler),
        )
        .with_state(state);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
