//! TIFF tag value reading.
//!
//! Small values are stored inline in the IFD entry; larger ones (tile offset
//! arrays, JPEG tables) live elsewhere in the file and are fetched in a
//! single range read.

use bytes::Bytes;

use crate::error::TiffError;
use crate::io::RangeReader;

use super::parser::{ByteOrder, IfdEntry, TiffHeader};
use super::tags::FieldType;

/// Reads tag values through a [`RangeReader`], respecting the file's byte
/// order and offset width.
pub struct ValueReader<'a, R: RangeReader> {
    reader: &'a R,
    header: &'a TiffHeader,
}

impl<'a, R: RangeReader> ValueReader<'a, R> {
    pub fn new(reader: &'a R, header: &'a TiffHeader) -> Self {
        Self { reader, header }
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.header.byte_order
    }

    /// Raw bytes of an entry's values, inline or fetched from the file.
    pub fn read_bytes(&self, entry: &IfdEntry) -> Result<Bytes, TiffError> {
        let size = entry
            .value_byte_size()
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

        if entry.is_inline {
            Ok(Bytes::copy_from_slice(
                &entry.value_offset_bytes[..size as usize],
            ))
        } else {
            Ok(self.reader.read_exact_at(entry.offset, size as usize)?)
        }
    }

    /// Read an array of integers (Short, Long or Long8) widened to `u64`.
    ///
    /// This is how TileOffsets and TileByteCounts are read.
    pub fn read_u64_array(&self, entry: &IfdEntry, tag: &'static str) -> Result<Vec<u64>, TiffError> {
        let field_type = entry
            .field_type
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;
        let bytes = self.read_bytes(entry)?;
        parse_u64_array(&bytes, entry.count, field_type, self.byte_order(), tag)
    }

    /// Read a single integer value, inline or not.
    pub fn read_u32(&self, entry: &IfdEntry, tag: &'static str) -> Result<u32, TiffError> {
        if let Some(value) = entry.inline_u32(self.byte_order()) {
            return Ok(value);
        }

        let values = self.read_u64_array(entry, tag)?;
        match values.as_slice() {
            [value] => u32::try_from(*value).map_err(|_| TiffError::InvalidTagValue {
                tag,
                message: format!("value {} does not fit in 32 bits", value),
            }),
            _ => Err(TiffError::InvalidTagValue {
                tag,
                message: format!("expected count 1, got {}", entry.count),
            }),
        }
    }
}

/// Decode `count` integers of `field_type` from `bytes`.
pub fn parse_u64_array(
    bytes: &[u8],
    count: u64,
    field_type: FieldType,
    byte_order: ByteOrder,
    tag: &'static str,
) -> Result<Vec<u64>, TiffError> {
    let width = field_type.size_in_bytes() as usize;
    let count = count as usize;

    if bytes.len() < width * count {
        return Err(TiffError::InvalidTagValue {
            tag,
            message: format!("expected {} bytes, got {}", width * count, bytes.len()),
        });
    }

    let values = bytes[..width * count].chunks_exact(width);
    match field_type {
        FieldType::Byte => Ok(values.map(|c| c[0] as u64).collect()),
        FieldType::Short => Ok(values.map(|c| byte_order.read_u16(c) as u64).collect()),
        FieldType::Long => Ok(values.map(|c| byte_order.read_u32(c) as u64).collect()),
        FieldType::Long8 => Ok(values.map(|c| byte_order.read_u64(c)).collect()),
        other => Err(TiffError::InvalidTagValue {
            tag,
            message: format!("expected an integer type, got {:?}", other),
        }),
    }
}
