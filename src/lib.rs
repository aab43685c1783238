//! # histoseg-viewer
//!
//! Overlay pixel-wise segmentations on histology tiles and medical volumes.
//!
//! An image and one or more label maps are loaded through a loader chosen
//! by file extension, packed into 32-bit RGBA display buffers, and drawn
//! in an HTML viewer with one panel per segmentation, an opacity slider
//! and a class legend.
//!
//! ## Features
//!
//! - **Extension dispatch**: `.nii`, `.nii.gz` and `.png`, compound extensions matched exactly
//! - **Whole-slide tiles**: tiled TIFF reader with JPEG and uncompressed tiles, premultiplied alpha handling
//! - **Packed display buffers**: one `u32` per pixel, little-endian RGBA, bottom-up rows
//! - **Overlay sessions**: per-overlay opacity with the buffer computed once
//! - **Serve mode**: axum server with a live opacity API
//!
//! ## Architecture
//!
//! - [`io`] - Positioned reads from local files
//! - [`mod@format`] - Extension resolution, TIFF structure and JPEG tables
//! - [`slide`] - Pyramid levels, tiles and regions of a whole-slide image
//! - [`loader`] - Format loaders and the dispatcher
//! - [`composite`] - Class schemes and RGBA display buffers
//! - [`overlay`] - Overlay sessions, legend and figure layout
//! - [`server`] - HTML document and the HTTP server
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use histoseg_viewer::{write_document, ClassScheme, Visualization};
//!
//! let vis = Visualization::open(
//!     "case_01/he.png",
//!     &["run_a/seg.png", "run_b/seg.nii.gz"],
//!     ClassScheme::default(),
//! )?;
//! write_document(&vis, "image_and_segmentation.html")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod composite;
pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod loader;
pub mod overlay;
pub mod server;
pub mod slide;

// Re-export commonly used types
pub use composite::{
    image_to_buffer, label_to_buffer, pack_rgba, unpack_rgba, ClassColorTable, ClassInfo,
    ClassScheme, PackedDisplayBuffer, BACKGROUND,
};
pub use config::{Cli, Command, InputArgs, InspectConfig, RenderConfig, ServeConfig};
pub use error::{
    CompositeError, FormatError, IoError, LoadError, OverlayError, SchemeError, TiffError,
};
pub use format::{compound_extension, resolve_extension, SupportedExtension};
pub use io::{FileRangeReader, RangeReader};
pub use loader::{
    load_data, loader_for, unpremultiply_tile, FormatLoader, NiftiLoader, PngLoader, RasterVolume,
    SlideTileLoader, TILE_SIZE,
};
pub use overlay::{
    build_legend, short_name, FigureLayout, Legend, LegendCell, OverlaySession, TextColor,
    Visualization, DEFAULT_OPACITY,
};
pub use server::{
    create_router, generate_document, write_document, AppState, OpacitySync, RouterConfig,
    DEFAULT_OUTPUT,
};
pub use slide::SlideReader;
