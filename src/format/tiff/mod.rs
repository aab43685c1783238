//! Tiled TIFF parsing for whole-slide images.
//!
//! Only the subset needed to pull tiles out of a pyramidal slide is covered:
//!
//! - **Byte order**: `II` (little-endian) or `MM` (big-endian), declared in
//!   the header and honored for every multi-byte value.
//!
//! - **Classic TIFF and BigTIFF**: 32-bit or 64-bit offsets, handled
//!   transparently by [`TiffHeader`].
//!
//! - **IFDs**: each directory describes one image. Tiled directories are the
//!   pyramid levels; stripped ones (label, macro) are skipped.
//!
//! ```text
//!   header ──► IFD 0 ──► IFD 1 ──► IFD 2 ──► 0
//!              (tiled)   (strips)  (tiled)
//!                │                   │
//!             level 0             level 1
//! ```

mod parser;
mod pyramid;
mod tags;
mod values;

pub use parser::{ByteOrder, Ifd, IfdEntry, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
pub use pyramid::{PyramidLevel, TiffPyramid, TileData};
pub use tags::{Compression, FieldType, TiffTag};
pub use values::{parse_u64_array, ValueReader};
