//! Whole-slide tile loader.
//!
//! Reads one fixed-size region of a tiled TIFF slide and turns it into an
//! RGB intensity volume. No file extension routes here; callers build the
//! loader explicitly.

use std::path::Path;

use image::RgbaImage;
use ndarray::Array3;
use tracing::debug;

use crate::error::LoadError;
use crate::io::FileRangeReader;
use crate::slide::SlideReader;

use super::{FormatLoader, RasterVolume};

/// Edge length of the region read from a slide
pub const TILE_SIZE: u32 = 224;

/// Reads a square region of one pyramid level.
#[derive(Debug, Clone, Copy)]
pub struct SlideTileLoader {
    pub level: usize,
    pub origin: (u32, u32),
    pub size: u32,
}

impl Default for SlideTileLoader {
    fn default() -> Self {
        SlideTileLoader {
            level: 0,
            origin: (0, 0),
            size: TILE_SIZE,
        }
    }
}

impl FormatLoader for SlideTileLoader {
    fn name(&self) -> &'static str {
        "slide-tile"
    }

    /// Always yields an intensity volume; `is_label` is ignored.
    fn load(&self, path: &Path, is_label: bool) -> Result<RasterVolume, LoadError> {
        let slide = SlideReader::open(FileRangeReader::open(path)?)?;
        let region = slide.read_region(self.level, self.origin, (self.size, self.size))?;

        debug!(
            slide = slide.identifier(),
            level = self.level,
            origin = ?self.origin,
            size = self.size,
            is_label,
            "read slide region"
        );

        Ok(RasterVolume::Intensity(unpremultiply_tile(&region)?))
    }
}

/// Undo alpha premultiplication and drop the alpha channel.
///
/// Each color channel becomes `min(255, c * 255 / a)`, truncated to an
/// integer. Fails with [`LoadError::CorruptTile`] if any pixel has zero
/// alpha.
pub fn unpremultiply_tile(tile: &RgbaImage) -> Result<Array3<u32>, LoadError> {
    let zero_alpha_pixels = tile.pixels().filter(|p| p[3] == 0).count();
    if zero_alpha_pixels > 0 {
        return Err(LoadError::CorruptTile { zero_alpha_pixels });
    }

    let (width, height) = tile.dimensions();
    Ok(Array3::from_shape_fn(
        (height as usize, width as usize, 3),
        |(row, col, channel)| {
            let pixel = tile.get_pixel(col as u32, row as u32);
            let alpha = pixel[3] as u32;
            (pixel[channel] as u32 * 255 / alpha).min(255)
        },
    ))
}
