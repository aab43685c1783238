//! Whole-slide image access.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            SlideTileLoader              │
//! │   (224 x 224 region → intensity volume) │
//! └────────────────────┬────────────────────┘
//!                      │ read_region
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              SlideReader                │
//! │  (tile fetch, JPEG tables, RGBA decode) │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │   TiffPyramid   │    │    RangeReader      │
//! │  (level table)  │    │  (byte-range I/O)   │
//! └─────────────────┘    └─────────────────────┘
//! ```

mod reader;

pub use reader::{premultiply, SlideReader};
