//! PNG rasters.
//!
//! Samples keep their native bit depth: 16-bit PNGs yield values up to
//! 65535. Rescaling happens, if at all, when the compositor saturates them.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};
use ndarray::{Array3, Axis};

use crate::error::{IoError, LoadError};

use super::{FormatLoader, RasterVolume};

/// Loader for `.png` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngLoader;

impl FormatLoader for PngLoader {
    fn name(&self) -> &'static str {
        "png"
    }

    fn load(&self, path: &Path, is_label: bool) -> Result<RasterVolume, LoadError> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|e| IoError::from_std(&display, e))?;

        let image = ImageReader::with_format(BufReader::new(file), ImageFormat::Png)
            .decode()
            .map_err(|e| LoadError::Decode {
                path: display.clone(),
                message: e.to_string(),
            })?;

        let samples = widen_samples(image, &display)?;
        if !is_label {
            return Ok(RasterVolume::Intensity(samples));
        }

        match samples.dim().2 {
            1 => Ok(RasterVolume::Label(samples.index_axis_move(Axis(2), 0))),
            channels => Err(LoadError::NotALabelMap {
                path: display,
                channels,
            }),
        }
    }
}

/// Decoded image as (row, column, channel) `u32` samples.
fn widen_samples(image: DynamicImage, path: &str) -> Result<Array3<u32>, LoadError> {
    let (width, height) = (image.width() as usize, image.height() as usize);

    let (channels, samples): (usize, Vec<u32>) = match image {
        DynamicImage::ImageLuma8(b) => (1, b.into_raw().into_iter().map(u32::from).collect()),
        DynamicImage::ImageLumaA8(b) => (2, b.into_raw().into_iter().map(u32::from).collect()),
        DynamicImage::ImageRgb8(b) => (3, b.into_raw().into_iter().map(u32::from).collect()),
        DynamicImage::ImageRgba8(b) => (4, b.into_raw().into_iter().map(u32::from).collect()),
        DynamicImage::ImageLuma16(b) => (1, b.into_raw().into_iter().map(u32::from).collect()),
        DynamicImage::ImageLumaA16(b) => (2, b.into_raw().into_iter().map(u32::from).collect()),
        DynamicImage::ImageRgb16(b) => (3, b.into_raw().into_iter().map(u32::from).collect()),
        DynamicImage::ImageRgba16(b) => (4, b.into_raw().into_iter().map(u32::from).collect()),
        other => (4, other.to_rgba8().into_raw().into_iter().map(u32::from).collect()),
    };

    Array3::from_shape_vec((height, width, channels), samples).map_err(|e| {
        LoadError::InvalidVolume {
            path: path.to_string(),
            message: e.to_string(),
        }
    })
}
