//! One segmentation overlay and its opacity.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::debug;

use crate::composite::{label_to_buffer, ClassScheme, PackedDisplayBuffer};
use crate::error::{LoadError, OverlayError};
use crate::loader::{load_data, RasterVolume};

use super::visualization::short_name;

/// Opacity every overlay starts with
pub const DEFAULT_OPACITY: f64 = 0.5;

/// A composited segmentation plus the opacity it is drawn with.
///
/// The buffer is built once. [`set_opacity`](Self::set_opacity) is the only
/// mutation and never touches it: the render surface scales the overlay's
/// alpha at draw time.
#[derive(Debug, Clone)]
pub struct OverlaySession {
    path: PathBuf,
    name: String,
    buffer: PackedDisplayBuffer,
    opacity: f64,
}

impl OverlaySession {
    /// Load the segmentation at `path` and composite it.
    ///
    /// `image_extent` is the `(rows, cols)` of the base image; a
    /// segmentation of any other extent fails with
    /// [`OverlayError::ShapeMismatch`].
    pub fn open(
        path: impl AsRef<Path>,
        image_extent: (usize, usize),
        scheme: &ClassScheme,
    ) -> Result<Self, OverlayError> {
        let path = path.as_ref();
        let labels = match load_data(path, true)? {
            RasterVolume::Label(labels) => labels,
            RasterVolume::Intensity(image) => {
                return Err(LoadError::NotALabelMap {
                    path: path.display().to_string(),
                    channels: image.dim().2,
                }
                .into())
            }
        };

        Self::from_labels(path, &labels, image_extent, scheme)
    }

    /// Composite an already loaded label map.
    pub fn from_labels(
        path: impl AsRef<Path>,
        labels: &Array2<u32>,
        image_extent: (usize, usize),
        scheme: &ClassScheme,
    ) -> Result<Self, OverlayError> {
        let path = path.as_ref();
        if labels.dim() != image_extent {
            return Err(OverlayError::ShapeMismatch {
                path: path.display().to_string(),
                segmentation: labels.dim(),
                image: image_extent,
            });
        }

        let buffer = label_to_buffer(labels, scheme.colors())?;
        debug!(path = %path.display(), extent = ?buffer.extent(), "composited overlay");

        Ok(OverlaySession {
            path: path.to_path_buf(),
            name: short_name(path),
            buffer,
            opacity: DEFAULT_OPACITY,
        })
    }

    /// Overwrite the opacity. Values outside `[0, 1]` (and NaN) are rejected
    /// and leave the session unchanged.
    pub fn set_opacity(&mut self, value: f64) -> Result<(), OverlayError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(OverlayError::InvalidOpacity(value));
        }
        self.opacity = value;
        Ok(())
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn buffer(&self) -> &PackedDisplayBuffer {
        &self.buffer
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Short display name (`parent/file`).
    pub fn name(&self) -> &str {
        &self.name
    }
}
