//! TIFF header and image file directory parsing.
//!
//! # Header
//! ```text
//! Classic TIFF (8 bytes):  byte order (2) | version 42 (2) | first IFD offset (4)
//! BigTIFF     (16 bytes):  byte order (2) | version 43 (2) | offset size = 8 (2)
//!                          | reserved (2) | first IFD offset (8)
//! ```
//!
//! # IFD
//! ```text
//! entry count (2 | 8) | entries (12 | 20 bytes each) | next IFD offset (4 | 8)
//! entry: tag (2) | field type (2) | count (4 | 8) | value or offset (4 | 8)
//! ```

use crate::error::TiffError;
use crate::io::{read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le};

use super::tags::{FieldType, TiffTag};

/// Magic bytes indicating little-endian byte order ("II")
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM")
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

const VERSION_TIFF: u16 = 42;
const VERSION_BIGTIFF: u16 = 43;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of BigTIFF header in bytes
pub const BIGTIFF_HEADER_SIZE: usize = 16;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) declared by a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => read_u64_le(bytes),
            ByteOrder::BigEndian => read_u64_be(bytes),
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    pub is_bigtiff: bool,
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from the first bytes of a file.
    ///
    /// `bytes` should hold [`BIGTIFF_HEADER_SIZE`] bytes when available; eight
    /// are enough for classic TIFF. `file_size` bounds the first IFD offset.
    pub fn parse(bytes: &[u8], file_size: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let (is_bigtiff, first_ifd_offset) = match byte_order.read_u16(&bytes[2..4]) {
            VERSION_TIFF => (false, byte_order.read_u32(&bytes[4..8]) as u64),
            VERSION_BIGTIFF => {
                if bytes.len() < BIGTIFF_HEADER_SIZE {
                    return Err(TiffError::FileTooSmall {
                        required: BIGTIFF_HEADER_SIZE as u64,
                        actual: bytes.len() as u64,
                    });
                }
                let offset_size = byte_order.read_u16(&bytes[4..6]);
                if offset_size != 8 {
                    return Err(TiffError::InvalidBigTiffOffsetSize(offset_size));
                }
                (true, byte_order.read_u64(&bytes[8..16]))
            }
            version => return Err(TiffError::InvalidVersion(version)),
        };

        if first_ifd_offset >= file_size {
            return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
        }

        Ok(TiffHeader {
            byte_order,
            is_bigtiff,
            first_ifd_offset,
        })
    }

    /// Size of an IFD entry in bytes (12 classic, 20 BigTIFF).
    #[inline]
    pub const fn ifd_entry_size(&self) -> usize {
        if self.is_bigtiff {
            20
        } else {
            12
        }
    }

    /// Size of the entry count field at the start of an IFD.
    #[inline]
    pub const fn ifd_count_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            2
        }
    }

    /// Size of offsets and of the inline value field.
    #[inline]
    pub const fn offset_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }

    #[inline]
    fn read_offset(&self, bytes: &[u8]) -> u64 {
        if self.is_bigtiff {
            self.byte_order.read_u64(bytes)
        } else {
            self.byte_order.read_u32(bytes) as u64
        }
    }
}

// =============================================================================
// IfdEntry
// =============================================================================

/// One tag of an image file directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdEntry {
    /// Raw tag number
    pub tag: u16,

    /// Decoded field type, `None` for types the parser does not know
    pub field_type: Option<FieldType>,

    /// Raw field type number
    pub field_type_raw: u16,

    /// Number of values
    pub count: u64,

    /// Raw value/offset field (first 4 bytes used for classic TIFF)
    pub value_offset_bytes: [u8; 8],

    /// Whether the values live in `value_offset_bytes`
    pub is_inline: bool,

    /// The value/offset field read as an offset
    pub offset: u64,
}

impl IfdEntry {
    /// Total size of the values in bytes, if the field type is known.
    pub fn value_byte_size(&self) -> Option<u64> {
        self.field_type
            .map(|t| t.size_in_bytes().saturating_mul(self.count))
    }

    /// Read a single inline Short/Long/Long8 value.
    pub fn inline_u64(&self, byte_order: ByteOrder) -> Option<u64> {
        if !self.is_inline || self.count != 1 {
            return None;
        }
        match self.field_type? {
            FieldType::Short => Some(byte_order.read_u16(&self.value_offset_bytes) as u64),
            FieldType::Long => Some(byte_order.read_u32(&self.value_offset_bytes) as u64),
            FieldType::Long8 => Some(byte_order.read_u64(&self.value_offset_bytes)),
            _ => None,
        }
    }

    /// Read a single inline value that must fit in a `u32`.
    pub fn inline_u32(&self, byte_order: ByteOrder) -> Option<u32> {
        self.inline_u64(byte_order)
            .and_then(|v| u32::try_from(v).ok())
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// A parsed image file directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifd {
    pub entries: Vec<IfdEntry>,
    pub next_ifd_offset: u64,
}

impl Ifd {
    /// Total byte size of an IFD holding `entry_count` entries.
    pub fn calculate_size(entry_count: u64, header: &TiffHeader) -> usize {
        header.ifd_count_size()
            + entry_count as usize * header.ifd_entry_size()
            + header.offset_size()
    }

    /// Parse an IFD from bytes starting at its entry count field.
    pub fn parse(bytes: &[u8], header: &TiffHeader) -> Result<Self, TiffError> {
        let count_size = header.ifd_count_size();
        if bytes.len() < count_size {
            return Err(TiffError::FileTooSmall {
                required: count_size as u64,
                actual: bytes.len() as u64,
            });
        }

        let entry_count = if header.is_bigtiff {
            header.byte_order.read_u64(bytes)
        } else {
            header.byte_order.read_u16(bytes) as u64
        };

        let required = Self::calculate_size(entry_count, header);
        if bytes.len() < required {
            return Err(TiffError::FileTooSmall {
                required: required as u64,
                actual: bytes.len() as u64,
            });
        }

        let entry_size = header.ifd_entry_size();
        let offset_size = header.offset_size();
        let byte_order = header.byte_order;

        let entries = bytes[count_size..count_size + entry_count as usize * entry_size]
            .chunks_exact(entry_size)
            .map(|raw| {
                let tag = byte_order.read_u16(&raw[0..2]);
                let field_type_raw = byte_order.read_u16(&raw[2..4]);
                let field_type = FieldType::from_u16(field_type_raw);
                let (count, value_field) = if header.is_bigtiff {
                    (byte_order.read_u64(&raw[4..12]), &raw[12..20])
                } else {
                    (byte_order.read_u32(&raw[4..8]) as u64, &raw[8..12])
                };

                let mut value_offset_bytes = [0u8; 8];
                value_offset_bytes[..offset_size].copy_from_slice(value_field);

                let is_inline = field_type
                    .map(|t| t.size_in_bytes().saturating_mul(count) <= offset_size as u64)
                    .unwrap_or(false);

                IfdEntry {
                    tag,
                    field_type,
                    field_type_raw,
                    count,
                    value_offset_bytes,
                    is_inline,
                    offset: header.read_offset(value_field),
                }
            })
            .collect();

        let next_pos = count_size + entry_count as usize * entry_size;
        let next_ifd_offset = header.read_offset(&bytes[next_pos..next_pos + offset_size]);

        Ok(Ifd {
            entries,
            next_ifd_offset,
        })
    }

    pub fn get_entry_by_tag(&self, tag: TiffTag) -> Option<&IfdEntry> {
        let raw = tag.as_u16();
        self.entries.iter().find(|e| e.tag == raw)
    }

    /// Inline scalar value of `tag`, if present.
    pub fn inline_u32(&self, tag: TiffTag, byte_order: ByteOrder) -> Option<u32> {
        self.get_entry_by_tag(tag)?.inline_u32(byte_order)
    }

    /// Whether this directory describes a tiled image.
    pub fn is_tiled(&self) -> bool {
        self.get_entry_by_tag(TiffTag::TileWidth).is_some()
            && self.get_entry_by_tag(TiffTag::TileLength).is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
