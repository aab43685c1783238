//! Packing volumes into RGBA display buffers.
//!
//! Each output pixel is a `u32` whose little-endian bytes are `[R, G, B, A]`.
//! The render surface places its origin bottom-left, so row 0 of a volume
//! becomes the last buffer row:
//!
//! ```text
//!   volume row 0   ──►  buffer row n-1
//!   volume row 1   ──►  buffer row n-2
//!   ...
//!   volume row n-1 ──►  buffer row 0
//! ```

use ndarray::{s, Array2, Array3};

use crate::error::CompositeError;

use super::scheme::{ClassColorTable, BACKGROUND};

/// Pack four channel bytes into one `u32`, R in the lowest byte.
#[inline]
pub const fn pack_rgba(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

/// Inverse of [`pack_rgba`].
#[inline]
pub const fn unpack_rgba(packed: u32) -> [u8; 4] {
    packed.to_le_bytes()
}

// =============================================================================
// PackedDisplayBuffer
// =============================================================================

/// Rows x cols packed RGBA pixels in render order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedDisplayBuffer {
    pixels: Array2<u32>,
}

impl PackedDisplayBuffer {
    /// Wrap pixels that are already in render (bottom-up) order.
    pub fn from_packed(pixels: Array2<u32>) -> Self {
        Self { pixels }
    }

    pub fn rows(&self) -> usize {
        self.pixels.nrows()
    }

    pub fn cols(&self) -> usize {
        self.pixels.ncols()
    }

    /// `(rows, cols)`.
    pub fn extent(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    pub fn pixels(&self) -> &Array2<u32> {
        &self.pixels
    }

    /// Channel bytes of the pixel at buffer position `(row, col)`.
    pub fn rgba(&self, row: usize, col: usize) -> [u8; 4] {
        unpack_rgba(self.pixels[[row, col]])
    }

    /// Flat `R G B A` bytes, buffer row 0 first.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_le_bytes()).collect()
    }

    /// The same pixels with row order flipped.
    pub fn flipped(&self) -> Self {
        Self {
            pixels: self.pixels.slice(s![..;-1, ..]).to_owned(),
        }
    }
}

// =============================================================================
// Compositing
// =============================================================================

/// Pack an intensity image.
///
/// | channels | R G B        | A          |
/// |----------|--------------|------------|
/// | 1        | ch 0         | 255        |
/// | 2        | ch 0         | ch 1       |
/// | 3        | ch 0..3      | 255        |
/// | 4        | ch 0..3      | ch 3       |
/// | 5+       | ch 0..3      | 255        |
///
/// Samples above 255 saturate.
pub fn image_to_buffer(image: &Array3<u32>) -> Result<PackedDisplayBuffer, CompositeError> {
    let (rows, cols, channels) = image.dim();
    if channels == 0 {
        return Err(CompositeError::EmptyChannels);
    }

    let sample = |r: usize, c: usize, ch: usize| image[[r, c, ch]].min(255) as u8;
    let pixels = Array2::from_shape_fn((rows, cols), |(row, col)| {
        let r = rows - 1 - row;
        let rgba = match channels {
            1 => {
                let v = sample(r, col, 0);
                [v, v, v, 255]
            }
            2 => {
                let v = sample(r, col, 0);
                [v, v, v, sample(r, col, 1)]
            }
            4 => [
                sample(r, col, 0),
                sample(r, col, 1),
                sample(r, col, 2),
                sample(r, col, 3),
            ],
            _ => [sample(r, col, 0), sample(r, col, 1), sample(r, col, 2), 255],
        };
        pack_rgba(rgba)
    });

    Ok(PackedDisplayBuffer { pixels })
}

/// Pack a label map through `colors`.
///
/// Background pixels get alpha 0, every other class alpha 255; overlay
/// opacity is applied by the render surface, not here.
pub fn label_to_buffer(
    labels: &Array2<u32>,
    colors: &ClassColorTable,
) -> Result<PackedDisplayBuffer, CompositeError> {
    let mut pixels = Array2::zeros(labels.dim());
    for (pixel, &class_id) in pixels.iter_mut().zip(labels.slice(s![..;-1, ..])) {
        let [r, g, b] = colors.color(class_id)?;
        let alpha = if class_id == BACKGROUND { 0 } else { 255 };
        *pixel = pack_rgba([r, g, b, alpha]);
    }

    Ok(PackedDisplayBuffer { pixels })
}
