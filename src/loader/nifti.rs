//! NIfTI-1 volumes (`.nii`, `.nii.gz`).
//!
//! NIfTI stores voxels in (x, y, z) order with x varying fastest. Swapping
//! the first two axes gives the (row, column, slice) layout every other
//! loader produces.

use std::path::Path;

use ndarray::{Array3, ArrayD, Axis, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use crate::error::{IoError, LoadError};

use super::{FormatLoader, RasterVolume};

/// Loader for NIfTI-1 files, gzip-compressed or not.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiLoader;

impl FormatLoader for NiftiLoader {
    fn name(&self) -> &'static str {
        "nifti"
    }

    fn load(&self, path: &Path, is_label: bool) -> Result<RasterVolume, LoadError> {
        let display = path.display().to_string();
        std::fs::metadata(path).map_err(|e| IoError::from_std(&display, e))?;

        let decode_error = |e: nifti::NiftiError| LoadError::Decode {
            path: display.clone(),
            message: e.to_string(),
        };

        let object = ReaderOptions::new().read_file(path).map_err(decode_error)?;
        let data = object
            .into_volume()
            .into_ndarray::<f64>()
            .map_err(decode_error)?;

        let voxels = to_rank3(data, &display)?.permuted_axes([1, 0, 2]);
        Ok(normalize(voxels, is_label))
    }
}

/// Lift 2-D volumes to one slice and drop trailing singleton axes.
fn to_rank3(mut data: ArrayD<f64>, path: &str) -> Result<Array3<f64>, LoadError> {
    let invalid = |message: String| LoadError::InvalidVolume {
        path: path.to_string(),
        message,
    };

    match data.ndim() {
        0 | 1 => {
            return Err(invalid(format!(
                "expected at least 2 dimensions, got shape {:?}",
                data.shape()
            )))
        }
        2 => data.insert_axis_inplace(Axis(2)),
        3 => {}
        _ => {
            if data.shape()[3..].iter().any(|&len| len != 1) {
                return Err(invalid(format!(
                    "only the first three dimensions may exceed 1, got shape {:?}",
                    data.shape()
                )));
            }
            while data.ndim() > 3 {
                data = data.index_axis_move(Axis(3), 0);
            }
        }
    }

    if data.shape().contains(&0) {
        return Err(invalid(format!("empty volume of shape {:?}", data.shape())));
    }

    data.into_dimensionality::<Ix3>()
        .map_err(|e| invalid(e.to_string()))
}

/// Convert (row, column, slice) voxels to display values.
///
/// Label maps keep the first slice with each voxel truncated to `u8`.
/// Intensities are scaled by 255; float-to-int casts saturate, so negative
/// and NaN voxels become 0.
fn normalize(voxels: Array3<f64>, is_label: bool) -> RasterVolume {
    if is_label {
        RasterVolume::Label(voxels.index_axis(Axis(2), 0).mapv(|v| v as u8 as u32))
    } else {
        RasterVolume::Intensity(voxels.mapv(|v| (v * 255.0) as u32))
    }
}
