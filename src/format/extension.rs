//! File extension resolution.
//!
//! The loader is chosen from the file name alone. Every dot-separated token
//! after the first one is part of the extension, so `brain.nii.gz` resolves
//! to `.nii.gz` rather than `.gz`. Matching is case-sensitive and never
//! guesses: `scan.v2.png` yields `.v2.png`, which is rejected.

use std::fmt;
use std::path::Path;

use crate::error::FormatError;

/// Extensions that a loader is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedExtension {
    /// Uncompressed NIfTI-1 volume
    Nii,
    /// Gzip-compressed NIfTI-1 volume
    NiiGz,
    /// Portable Network Graphics raster
    Png,
}

impl SupportedExtension {
    pub const ALL: [SupportedExtension; 3] = [
        SupportedExtension::Nii,
        SupportedExtension::NiiGz,
        SupportedExtension::Png,
    ];

    /// Dot-prefixed suffix as it appears in file names.
    pub const fn as_str(self) -> &'static str {
        match self {
            SupportedExtension::Nii => ".nii",
            SupportedExtension::NiiGz => ".nii.gz",
            SupportedExtension::Png => ".png",
        }
    }

    /// Match a compound extension exactly.
    pub fn from_compound(extension: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == extension)
    }
}

impl fmt::Display for SupportedExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join every token after the first `.` of the final path segment.
///
/// Returns an empty string when the file name has no dot.
pub fn compound_extension(path: impl AsRef<Path>) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    name.split('.')
        .skip(1)
        .fold(String::new(), |mut acc, token| {
            acc.push('.');
            acc.push_str(token);
            acc
        })
}

/// Resolve `path` to a supported extension.
pub fn resolve_extension(path: impl AsRef<Path>) -> Result<SupportedExtension, FormatError> {
    let path = path.as_ref();
    let extension = compound_extension(path);

    SupportedExtension::from_compound(&extension).ok_or_else(|| FormatError::UnsupportedFormat {
        path: path.display().to_string(),
        extension,
        supported: supported_list(),
    })
}

fn supported_list() -> String {
    SupportedExtension::ALL
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
