//! The base image, its overlays and the figure layout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::Array3;
use tracing::info;

use crate::composite::{image_to_buffer, ClassScheme, PackedDisplayBuffer};
use crate::error::OverlayError;
use crate::loader::{load_data, RasterVolume};

use super::legend::{build_legend, Legend, FIG_MAX_DIM, LEGEND_HEIGHT};
use super::session::OverlaySession;

/// `parent_dir/file_name` of `path`.
///
/// A path without a parent directory yields `/file_name`.
pub fn short_name(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    format!("{}/{}", parent, file)
}

/// On-screen size of every figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureLayout {
    /// Image extent in pixels
    pub rows: usize,
    pub cols: usize,
    /// Figure size, longest side `FIG_MAX_DIM`
    pub width: u32,
    pub height: u32,
}

impl FigureLayout {
    pub fn for_extent((rows, cols): (usize, usize)) -> Self {
        let ratio = FIG_MAX_DIM as f64 / rows.max(cols).max(1) as f64;
        FigureLayout {
            rows,
            cols,
            width: (ratio * cols as f64) as u32,
            height: (ratio * rows as f64) as u32,
        }
    }
}

// =============================================================================
// Visualization
// =============================================================================

/// Everything the render surface draws.
#[derive(Debug, Clone)]
pub struct Visualization {
    image_path: PathBuf,
    image_name: String,
    base: Arc<PackedDisplayBuffer>,
    overlays: Vec<OverlaySession>,
    scheme: ClassScheme,
    layout: FigureLayout,
    legend: Legend,
}

impl Visualization {
    /// Load the base image and every segmentation.
    ///
    /// The first failing segmentation aborts the whole visualization.
    pub fn open<P: AsRef<Path>>(
        image_path: impl AsRef<Path>,
        segmentation_paths: &[P],
        scheme: ClassScheme,
    ) -> Result<Self, OverlayError> {
        let image_path = image_path.as_ref();
        let image = match load_data(image_path, false)? {
            RasterVolume::Intensity(image) => image,
            RasterVolume::Label(_) => {
                return Err(OverlayError::NotAnImage {
                    path: image_path.display().to_string(),
                })
            }
        };

        let mut visualization = Self::new(image_path, &image, scheme)?;
        for path in segmentation_paths {
            let session =
                OverlaySession::open(path, visualization.extent(), &visualization.scheme)?;
            visualization.push_overlay(session)?;
        }

        info!(
            image = %visualization.image_name,
            overlays = visualization.overlays.len(),
            width = visualization.layout.width,
            height = visualization.layout.height,
            "visualization ready"
        );

        Ok(visualization)
    }

    /// Visualization of an already loaded image, without overlays.
    pub fn new(
        image_path: impl AsRef<Path>,
        image: &Array3<u32>,
        scheme: ClassScheme,
    ) -> Result<Self, OverlayError> {
        let image_path = image_path.as_ref();
        let base = image_to_buffer(image)?;
        let layout = FigureLayout::for_extent(base.extent());
        let legend = build_legend(&scheme, layout.width, LEGEND_HEIGHT);

        Ok(Visualization {
            image_path: image_path.to_path_buf(),
            image_name: short_name(image_path),
            base: Arc::new(base),
            overlays: Vec::new(),
            scheme,
            layout,
            legend,
        })
    }

    /// Append an overlay whose extent matches the base image.
    pub fn push_overlay(&mut self, session: OverlaySession) -> Result<(), OverlayError> {
        if session.buffer().extent() != self.extent() {
            return Err(OverlayError::ShapeMismatch {
                path: session.path().display().to_string(),
                segmentation: session.buffer().extent(),
                image: self.extent(),
            });
        }
        self.overlays.push(session);
        Ok(())
    }

    /// `(rows, cols)` of the base image.
    pub fn extent(&self) -> (usize, usize) {
        self.base.extent()
    }

    pub fn base(&self) -> &Arc<PackedDisplayBuffer> {
        &self.base
    }

    pub fn overlays(&self) -> &[OverlaySession] {
        &self.overlays
    }

    pub fn overlay(&self, index: usize) -> Result<&OverlaySession, OverlayError> {
        self.overlays.get(index).ok_or(OverlayError::NoSuchOverlay {
            index,
            count: self.overlays.len(),
        })
    }

    /// Apply an opacity-changed event to overlay `index`.
    pub fn set_opacity(&mut self, index: usize, value: f64) -> Result<(), OverlayError> {
        let count = self.overlays.len();
        self.overlays
            .get_mut(index)
            .ok_or(OverlayError::NoSuchOverlay { index, count })?
            .set_opacity(value)
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn scheme(&self) -> &ClassScheme {
        &self.scheme
    }

    pub fn layout(&self) -> FigureLayout {
        self.layout
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    /// Panel title of overlay `index`.
    pub fn title(&self, index: usize) -> Result<String, OverlayError> {
        self.overlay(index).map(|overlay| self.overlay_title(overlay))
    }

    /// Panel title of one of this visualization's overlays.
    pub fn overlay_title(&self, overlay: &OverlaySession) -> String {
        format!(
            "Image ({}) Segmentation ({})",
            self.image_name,
            overlay.name()
        )
    }
}
