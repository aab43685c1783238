//! Pixel access to tiled whole-slide images.
//!
//! [`SlideReader`] wraps a [`RangeReader`] and the parsed [`TiffPyramid`].
//! Tiles are fetched on demand, JPEG tiles get their shared tables merged in,
//! and every decoded tile is normalized to premultiplied RGBA so that region
//! reads compose tiles without caring about the source sample layout.

use bytes::Bytes;
use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::TiffError;
use crate::format::jpeg::prepare_tile_jpeg;
use crate::format::tiff::{Compression, PyramidLevel, TiffPyramid, TileData};
use crate::io::RangeReader;

/// ExtraSamples value for unassociated (straight) alpha
const UNASSOCIATED_ALPHA: u16 = 2;

// =============================================================================
// SlideReader
// =============================================================================

/// Opened whole-slide image.
pub struct SlideReader<R: RangeReader> {
    reader: R,
    pyramid: TiffPyramid,
    tiles: Vec<TileData>,
}

impl<R: RangeReader> SlideReader<R> {
    /// Parse the pyramid and the tile tables of every level.
    pub fn open(reader: R) -> Result<Self, TiffError> {
        let pyramid = TiffPyramid::parse(&reader)?;
        let tiles = pyramid
            .levels
            .iter()
            .map(|level| TileData::load(&reader, level, &pyramid.header))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SlideReader {
            reader,
            pyramid,
            tiles,
        })
    }

    pub fn identifier(&self) -> &str {
        self.reader.identifier()
    }

    pub fn level_count(&self) -> usize {
        self.pyramid.level_count()
    }

    /// Dimensions of level 0 as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        let base = &self.pyramid.levels[0];
        (base.width, base.height)
    }

    fn level(&self, level: usize) -> Result<(&PyramidLevel, &TileData), TiffError> {
        match (self.pyramid.get_level(level), self.tiles.get(level)) {
            (Some(l), Some(t)) => Ok((l, t)),
            _ => Err(TiffError::InvalidLevel {
                level,
                level_count: self.level_count(),
            }),
        }
    }

    /// Raw tile bytes as stored in the file.
    pub fn read_raw_tile(&self, level: usize, tile_x: u32, tile_y: u32) -> Result<Bytes, TiffError> {
        let (pyramid_level, tile_data) = self.level(level)?;
        let (offset, size) = pyramid_level
            .tile_index(tile_x, tile_y)
            .and_then(|index| tile_data.get_tile_location(index))
            .ok_or(TiffError::TileOutOfRange {
                level,
                tile_x,
                tile_y,
            })?;

        Ok(self.reader.read_exact_at(offset, size as usize)?)
    }

    /// Decode one tile to premultiplied RGBA of the level's tile size.
    pub fn read_tile(&self, level: usize, tile_x: u32, tile_y: u32) -> Result<RgbaImage, TiffError> {
        let (pyramid_level, tile_data) = self.level(level)?;
        let raw = self.read_raw_tile(level, tile_x, tile_y)?;
        let decode_error = |message: String| TiffError::TileDecode {
            tile_x,
            tile_y,
            message,
        };

        let tile = match Compression::from_u16(pyramid_level.compression) {
            Some(Compression::Jpeg) => {
                let jpeg = prepare_tile_jpeg(tile_data.jpeg_tables.as_deref(), &raw);
                image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
                    .map_err(|e| decode_error(e.to_string()))?
                    .to_rgba8()
            }
            Some(Compression::None) => {
                uncompressed_to_rgba(pyramid_level, &raw).map_err(decode_error)?
            }
            None => return Err(TiffError::UnsupportedCompression(pyramid_level.compression)),
        };

        debug!(
            slide = self.identifier(),
            level,
            tile_x,
            tile_y,
            bytes = raw.len(),
            "decoded tile"
        );

        Ok(tile)
    }

    /// Read a `width` x `height` region of `level` whose top-left corner is
    /// at `(x, y)` in that level's pixel space.
    ///
    /// The result is premultiplied RGBA; pixels that fall outside the level
    /// are transparent black.
    pub fn read_region(
        &self,
        level: usize,
        (x, y): (u32, u32),
        (width, height): (u32, u32),
    ) -> Result<RgbaImage, TiffError> {
        let (info, _) = self.level(level)?;
        let mut region = RgbaImage::new(width, height);

        // Clip the request to the level so edge tiles' padding is never read
        let x_end = (x as u64 + width as u64).min(info.width as u64) as u32;
        let y_end = (y as u64 + height as u64).min(info.height as u64) as u32;
        if x >= x_end || y >= y_end {
            return Ok(region);
        }

        for tile_y in y / info.tile_height..=(y_end - 1) / info.tile_height {
            for tile_x in x / info.tile_width..=(x_end - 1) / info.tile_width {
                let tile = self.read_tile(level, tile_x, tile_y)?;
                let tile_left = tile_x * info.tile_width;
                let tile_top = tile_y * info.tile_height;

                let cols = x.max(tile_left)..x_end.min(tile_left + tile.width());
                let rows = y.max(tile_top)..y_end.min(tile_top + tile.height());
                for py in rows {
                    for px in cols.clone() {
                        let pixel = *tile.get_pixel(px - tile_left, py - tile_top);
                        region.put_pixel(px - x, py - y, pixel);
                    }
                }
            }
        }

        Ok(region)
    }
}

// =============================================================================
// Sample conversion
// =============================================================================

/// Convert an uncompressed chunky 8-bit tile to premultiplied RGBA.
fn uncompressed_to_rgba(level: &PyramidLevel, raw: &[u8]) -> Result<RgbaImage, String> {
    if level.bits_per_sample != 8 || level.planar_configuration != 1 {
        return Err(format!(
            "only chunky 8-bit samples are supported, got {} bits with planar configuration {}",
            level.bits_per_sample, level.planar_configuration
        ));
    }

    let spp = level.samples_per_pixel as usize;
    if spp == 0 {
        return Err("tile has no samples per pixel".to_string());
    }
    let pixels = level.tile_width as usize * level.tile_height as usize;
    if raw.len() < pixels * spp {
        return Err(format!(
            "tile holds {} bytes, expected {}",
            raw.len(),
            pixels * spp
        ));
    }

    let straight_alpha = level.extra_samples == Some(UNASSOCIATED_ALPHA);
    let mut rgba = Vec::with_capacity(pixels * 4);
    for sample in raw[..pixels * spp].chunks_exact(spp) {
        let pixel = match *sample {
            [v] => [v, v, v, 255],
            [r, g, b] => [r, g, b, 255],
            [r, g, b, a, ..] if straight_alpha => premultiply([r, g, b, a]),
            [r, g, b, a, ..] => [r, g, b, a],
            _ => return Err(format!("unsupported samples per pixel: {}", spp)),
        };
        rgba.extend_from_slice(&pixel);
    }

    RgbaImage::from_raw(level.tile_width, level.tile_height, rgba)
        .ok_or_else(|| "tile buffer size mismatch".to_string())
}

/// Scale color channels by alpha, rounding to nearest.
pub fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let scale = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
    [scale(r), scale(g), scale(b), a]
}
