use bytes::Bytes;

use crate::error::IoError;

/// Trait for reading byte ranges from a file-like resource.
///
/// The slide parser only ever touches the header, the image directories,
/// the tile offset arrays and the handful of tiles covering the requested
/// region, so readers never need to load a whole slide into memory.
pub trait RangeReader {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Get the total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Get a unique identifier for this resource (for logging).
    fn identifier(&self) -> &str;

    /// Check that `[offset, offset + len)` lies inside the resource.
    fn check_range(&self, offset: u64, len: usize) -> Result<(), IoError> {
        let end = offset.checked_add(len as u64);
        match end {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.size(),
            }),
        }
    }
}

// =============================================================================
// Endian Helper Functions
// =============================================================================
//
// TIFF files declare their byte order in the header; every multi-byte read
// in the parser goes through one of these.
//
// All helpers panic if the slice is shorter than the integer width.

#[inline]
pub fn read_u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

#[inline]
pub fn read_u16_be(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

#[inline]
pub fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[inline]
pub fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[inline]
pub fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(word)
}

#[inline]
pub fn read_u64_be(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(word)
}
