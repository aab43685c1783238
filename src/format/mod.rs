//! File format handling.
//!
//! - [`extension`] maps a path to the loader that understands it.
//! - [`tiff`] parses tiled TIFF/BigTIFF pyramids used by whole-slide images.
//! - [`jpeg`] prepares abbreviated JPEG tiles for decoding.

pub mod extension;
pub mod jpeg;
pub mod tiff;

pub use extension::{compound_extension, resolve_extension, SupportedExtension};
pub use jpeg::{is_abbreviated_stream, is_complete_stream, merge_jpeg_tables, prepare_tile_jpeg};
