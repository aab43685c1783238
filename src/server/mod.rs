//! Render surface and the optional HTTP server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Visualization                            │
//! │                              │                                  │
//! │          ┌───────────────────┴──────────────────┐               │
//! │          ▼                                      ▼               │
//! │  ┌───────────────┐                 ┌───────────────────────┐    │
//! │  │    viewer     │ ◄────────────── │  handlers / routes    │    │
//! │  │ (HTML document│   GET /         │  (axum, opacity API)  │    │
//! │  │  to a file)   │                 │                       │    │
//! │  └───────────────┘                 └───────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;
pub mod viewer;

pub use handlers::{
    get_opacity_handler, health_handler, overlays_handler, put_opacity_handler, viewer_handler,
    AppState, ErrorResponse, HealthResponse, OpacityRequest, OpacityResponse, OverlayResponse,
    OverlaysResponse,
};
pub use routes::{create_router, RouterConfig};
pub use viewer::{generate_document, write_document, OpacitySync, DEFAULT_OUTPUT};
