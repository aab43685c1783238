//! Pyramid level identification.
//!
//! A slide file chains several IFDs: the resolution levels, plus label,
//! macro and thumbnail images. Only tiled IFDs are pyramid levels; they are
//! ordered by decreasing area so that level 0 is always the full-resolution
//! image.

use bytes::Bytes;
use tracing::debug;

use crate::error::TiffError;
use crate::io::RangeReader;

use super::parser::{ByteOrder, Ifd, TiffHeader, BIGTIFF_HEADER_SIZE};
use super::tags::TiffTag;
use super::values::ValueReader;

/// Maximum number of IFDs to walk before giving up on the chain
const MAX_IFDS: usize = 100;

// =============================================================================
// PyramidLevel
// =============================================================================

/// One resolution level of the pyramid.
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    /// Position of the IFD in the file's IFD chain
    pub ifd_index: usize,

    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,

    /// Raw compression tag value (1 when absent)
    pub compression: u16,

    /// Samples per pixel (1 when absent)
    pub samples_per_pixel: u16,

    /// Bits per sample of the first channel (1 when absent)
    pub bits_per_sample: u16,

    /// Planar configuration (1 = chunky)
    pub planar_configuration: u16,

    /// ExtraSamples value of the first extra channel, if any
    /// (1 = associated alpha, 2 = unassociated alpha)
    pub extra_samples: Option<u16>,

    pub ifd: Ifd,
}

impl PyramidLevel {
    /// Build a level from a tiled IFD; `None` if required tags are missing.
    fn from_ifd<R: RangeReader>(
        ifd: Ifd,
        ifd_index: usize,
        values: &ValueReader<'_, R>,
    ) -> Result<Option<Self>, TiffError> {
        let byte_order = values.byte_order();
        let scalar = |tag: TiffTag| -> Result<Option<u32>, TiffError> {
            match ifd.get_entry_by_tag(tag) {
                Some(entry) => values.read_u32(entry, tag.name()).map(Some),
                None => Ok(None),
            }
        };

        let (Some(tile_width), Some(tile_height), Some(width), Some(height)) = (
            scalar(TiffTag::TileWidth)?,
            scalar(TiffTag::TileLength)?,
            scalar(TiffTag::ImageWidth)?,
            scalar(TiffTag::ImageLength)?,
        ) else {
            return Ok(None);
        };

        if tile_width == 0 || tile_height == 0 {
            return Err(TiffError::InvalidTagValue {
                tag: "TileWidth",
                message: format!("tile size {}x{} is empty", tile_width, tile_height),
            });
        }

        let first_sample = |tag: TiffTag| -> Result<Option<u16>, TiffError> {
            match ifd.get_entry_by_tag(tag) {
                Some(entry) => {
                    let values = values.read_u64_array(entry, tag.name())?;
                    Ok(values.first().map(|v| *v as u16))
                }
                None => Ok(None),
            }
        };

        let compression = ifd_u16(&ifd, TiffTag::Compression, byte_order).unwrap_or(1);
        let samples_per_pixel = ifd_u16(&ifd, TiffTag::SamplesPerPixel, byte_order).unwrap_or(1);
        if samples_per_pixel == 0 {
            return Err(TiffError::InvalidTagValue {
                tag: "SamplesPerPixel",
                message: "a pixel must hold at least one sample".to_string(),
            });
        }
        let planar_configuration =
            ifd_u16(&ifd, TiffTag::PlanarConfiguration, byte_order).unwrap_or(1);
        let bits_per_sample = first_sample(TiffTag::BitsPerSample)?.unwrap_or(1);
        let extra_samples = first_sample(TiffTag::ExtraSamples)?;

        Ok(Some(PyramidLevel {
            ifd_index,
            width,
            height,
            tile_width,
            tile_height,
            tiles_x: width.div_ceil(tile_width),
            tiles_y: height.div_ceil(tile_height),
            compression,
            samples_per_pixel,
            bits_per_sample,
            planar_configuration,
            extra_samples,
            ifd,
        }))
    }

    /// Linear tile index (row-major), `None` when out of range.
    pub fn tile_index(&self, tile_x: u32, tile_y: u32) -> Option<usize> {
        if tile_x >= self.tiles_x || tile_y >= self.tiles_y {
            return None;
        }
        Some(tile_y as usize * self.tiles_x as usize + tile_x as usize)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_x as usize * self.tiles_y as usize
    }
}

fn ifd_u16(ifd: &Ifd, tag: TiffTag, byte_order: ByteOrder) -> Option<u16> {
    ifd.inline_u32(tag, byte_order).map(|v| v as u16)
}

// =============================================================================
// TiffPyramid
// =============================================================================

/// All pyramid levels of a tiled TIFF, largest first.
#[derive(Debug, Clone)]
pub struct TiffPyramid {
    pub header: TiffHeader,
    pub levels: Vec<PyramidLevel>,
}

impl TiffPyramid {
    /// Walk the IFD chain and collect the tiled directories.
    pub fn parse<R: RangeReader>(reader: &R) -> Result<Self, TiffError> {
        let header_len = (BIGTIFF_HEADER_SIZE as u64).min(reader.size()) as usize;
        let header_bytes = reader.read_exact_at(0, header_len)?;
        let header = TiffHeader::parse(&header_bytes, reader.size())?;
        let values = ValueReader::new(reader, &header);

        let mut levels = Vec::new();
        let mut offset = header.first_ifd_offset;
        let mut ifd_index = 0;

        while offset != 0 && ifd_index < MAX_IFDS {
            if offset >= reader.size() {
                return Err(TiffError::InvalidIfdOffset(offset));
            }

            let count_bytes = reader.read_exact_at(offset, header.ifd_count_size())?;
            let entry_count = if header.is_bigtiff {
                header.byte_order.read_u64(&count_bytes)
            } else {
                header.byte_order.read_u16(&count_bytes) as u64
            };

            let ifd_bytes = reader.read_exact_at(offset, Ifd::calculate_size(entry_count, &header))?;
            let ifd = Ifd::parse(&ifd_bytes, &header)?;
            let next = ifd.next_ifd_offset;

            if ifd.is_tiled() {
                if let Some(level) = PyramidLevel::from_ifd(ifd, ifd_index, &values)? {
                    levels.push(level);
                }
            } else {
                debug!(ifd_index, "skipping non-tiled IFD");
            }

            offset = next;
            ifd_index += 1;
        }

        if levels.is_empty() {
            return Err(TiffError::StripOrganization);
        }

        levels.sort_by_key(|l| std::cmp::Reverse(l.width as u64 * l.height as u64));

        debug!(
            identifier = reader.identifier(),
            levels = levels.len(),
            width = levels[0].width,
            height = levels[0].height,
            "parsed slide pyramid"
        );

        Ok(TiffPyramid { header, levels })
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn get_level(&self, level: usize) -> Option<&PyramidLevel> {
        self.levels.get(level)
    }
}

// =============================================================================
// TileData
// =============================================================================

/// Tile locations and shared JPEG tables of one level.
#[derive(Debug, Clone)]
pub struct TileData {
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
    pub jpeg_tables: Option<Bytes>,
}

impl TileData {
    /// Read the TileOffsets, TileByteCounts and JPEGTables of `level`.
    pub fn load<R: RangeReader>(
        reader: &R,
        level: &PyramidLevel,
        header: &TiffHeader,
    ) -> Result<Self, TiffError> {
        let values = ValueReader::new(reader, header);
        let array = |tag: TiffTag| -> Result<Vec<u64>, TiffError> {
            let entry = level
                .ifd
                .get_entry_by_tag(tag)
                .ok_or(TiffError::MissingTag(tag.name()))?;
            values.read_u64_array(entry, tag.name())
        };

        let offsets = array(TiffTag::TileOffsets)?;
        let byte_counts = array(TiffTag::TileByteCounts)?;

        if offsets.len() != byte_counts.len() || offsets.len() < level.tile_count() {
            return Err(TiffError::InvalidTagValue {
                tag: "TileOffsets",
                message: format!(
                    "{} offsets and {} byte counts for {} tiles",
                    offsets.len(),
                    byte_counts.len(),
                    level.tile_count()
                ),
            });
        }

        let jpeg_tables = match level.ifd.get_entry_by_tag(TiffTag::JpegTables) {
            Some(entry) => Some(values.read_bytes(entry)?),
            None => None,
        };

        Ok(TileData {
            offsets,
            byte_counts,
            jpeg_tables,
        })
    }

    /// Offset and byte count of a tile.
    pub fn get_tile_location(&self, tile_index: usize) -> Option<(u64, u64)> {
        Some((
            *self.offsets.get(tile_index)?,
            *self.byte_counts.get(tile_index)?,
        ))
    }
}
