//! Overlay sessions, the class legend and the assembled visualization.
//!
//! ```text
//!   image path ──► load_data ──► image_to_buffer ──► Arc<base buffer>
//!                                                          │
//!   seg path 1 ──► OverlaySession (buffer, opacity 0.5) ───┤
//!   seg path 2 ──► OverlaySession (buffer, opacity 0.5) ───┼──► Visualization
//!                                                          │
//!   ClassScheme ──► build_legend ──────────────────────────┘
//! ```

pub mod legend;
pub mod session;
pub mod visualization;

pub use legend::{
    build_legend, Legend, LegendCell, TextColor, CELL_ALPHA, CELL_MARGIN, FIG_MAX_DIM,
    LEGEND_HEIGHT,
};
pub use session::{OverlaySession, DEFAULT_OPACITY};
pub use visualization::{short_name, FigureLayout, Visualization};
