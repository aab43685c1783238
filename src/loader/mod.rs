//! Format loaders and the loader dispatcher.
//!
//! Every loader normalizes its input to a [`RasterVolume`] whose axes are
//! `(row, column[, channel])`:
//!
//! ```text
//!   path ──► resolve_extension ──► .nii / .nii.gz ──► NiftiLoader ──┐
//!                               └► .png ───────────► PngLoader ────┤
//!                                                                  ▼
//!                                                            RasterVolume
//!                                                      Intensity(row, col, ch)
//!                                                      Label(row, col)
//! ```
//!
//! [`SlideTileLoader`] produces the same representation from tiled TIFF
//! slides but is only reachable by constructing it directly.

mod nifti;
mod raster;
mod slide;

use std::collections::BTreeSet;
use std::path::Path;

use ndarray::{Array2, Array3};
use tracing::debug;

use crate::error::LoadError;
use crate::format::{resolve_extension, SupportedExtension};

pub use nifti::NiftiLoader;
pub use raster::PngLoader;
pub use slide::{unpremultiply_tile, SlideTileLoader, TILE_SIZE};

// =============================================================================
// RasterVolume
// =============================================================================

/// Loaded image data in the common axis convention.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterVolume {
    /// Samples per (row, column, channel), nominally `0..=255`
    Intensity(Array3<u32>),
    /// One class id per (row, column)
    Label(Array2<u32>),
}

impl RasterVolume {
    pub fn kind(&self) -> &'static str {
        match self {
            RasterVolume::Intensity(_) => "intensity",
            RasterVolume::Label(_) => "label",
        }
    }

    /// `(rows, cols)` of the volume.
    pub fn extent(&self) -> (usize, usize) {
        match self {
            RasterVolume::Intensity(v) => (v.dim().0, v.dim().1),
            RasterVolume::Label(v) => v.dim(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            RasterVolume::Intensity(v) => v.shape(),
            RasterVolume::Label(v) => v.shape(),
        }
    }

    pub fn as_intensity(&self) -> Option<&Array3<u32>> {
        match self {
            RasterVolume::Intensity(v) => Some(v),
            RasterVolume::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&Array2<u32>> {
        match self {
            RasterVolume::Label(v) => Some(v),
            RasterVolume::Intensity(_) => None,
        }
    }

    /// Distinct class ids of a label map, ascending. Empty for images.
    pub fn class_ids(&self) -> BTreeSet<u32> {
        self.as_label()
            .map(|labels| labels.iter().copied().collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// FormatLoader
// =============================================================================

/// A decoder for one family of file formats.
pub trait FormatLoader: Send + Sync {
    /// Short name used in logs and by `inspect`.
    fn name(&self) -> &'static str;

    /// Load `path`; with `is_label` the result is a label map.
    fn load(&self, path: &Path, is_label: bool) -> Result<RasterVolume, LoadError>;
}

static NIFTI_LOADER: NiftiLoader = NiftiLoader;
static PNG_LOADER: PngLoader = PngLoader;

/// Loader registered for an extension.
pub fn loader_for(extension: SupportedExtension) -> &'static dyn FormatLoader {
    match extension {
        SupportedExtension::Nii | SupportedExtension::NiiGz => &NIFTI_LOADER,
        SupportedExtension::Png => &PNG_LOADER,
    }
}

/// Load an image or a segmentation, choosing the loader from the extension.
pub fn load_data(path: impl AsRef<Path>, is_label: bool) -> Result<RasterVolume, LoadError> {
    let path = path.as_ref();
    let extension = resolve_extension(path)?;
    let loader = loader_for(extension);

    let volume = loader.load(path, is_label)?;
    debug!(
        path = %path.display(),
        %extension,
        loader = loader.name(),
        kind = volume.kind(),
        shape = ?volume.shape(),
        "loaded volume"
    );

    Ok(volume)
}
