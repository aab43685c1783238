use thiserror::Error;

/// I/O errors that can occur when reading byte ranges from a file
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Any other read failure
    #[error("Read error on {path}: {message}")]
    Read { path: String, message: String },
}

impl IoError {
    /// Build an `IoError` from a `std::io::Error` raised while accessing `path`.
    pub fn from_std(path: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            IoError::NotFound(path.to_string())
        } else {
            IoError::Read {
                path: path.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Errors raised while resolving a file path to a supported format
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// Extension is not one of the recognized suffixes
    #[error("Unsupported format: extension '{extension}' of {path} is not one of {supported}")]
    UnsupportedFormat {
        path: String,
        extension: String,
        supported: String,
    },
}

/// Errors that can occur when parsing tiled TIFF slides
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Required tag is missing from IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Unsupported compression scheme
    #[error("Unsupported compression: {0} (only JPEG and uncompressed tiles are supported)")]
    UnsupportedCompression(u16),

    /// File has no tiled image directory
    #[error("Unsupported organization: file uses strips instead of tiles")]
    StripOrganization,

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),

    /// Requested pyramid level does not exist
    #[error("Invalid level: {level} (slide has {level_count} levels)")]
    InvalidLevel { level: usize, level_count: usize },

    /// Tile coordinates outside the level's tile grid
    #[error("Tile ({tile_x}, {tile_y}) is out of range for level {level}")]
    TileOutOfRange {
        level: usize,
        tile_x: u32,
        tile_y: u32,
    },

    /// Tile bytes could not be decoded into pixels
    #[error("Failed to decode tile ({tile_x}, {tile_y}): {message}")]
    TileDecode {
        tile_x: u32,
        tile_y: u32,
        message: String,
    },
}

/// Errors produced by the format loaders and the loader dispatcher
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// Path does not resolve to a supported format
    #[error(transparent)]
    Format(#[from] FormatError),

    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Whole-slide structure could not be parsed
    #[error("Slide error: {0}")]
    Slide(#[from] TiffError),

    /// The decoder for the format rejected the file contents
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    /// Volume rank or axis lengths cannot be mapped to (row, column, channel)
    #[error("Invalid volume {path}: {message}")]
    InvalidVolume { path: String, message: String },

    /// A label map was requested from a multi-channel image
    #[error("{path} has {channels} channels, a label map needs exactly one")]
    NotALabelMap { path: String, channels: usize },

    /// Whole-slide tile contains fully transparent pixels
    #[error("Corrupt tile: {zero_alpha_pixels} pixel(s) with zero alpha")]
    CorruptTile { zero_alpha_pixels: usize },
}

/// Errors raised while packing volumes into display buffers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// Label value with no entry in the class color table
    #[error("Unknown class id {class_id}: no color is defined for it")]
    UnknownClass { class_id: u32 },

    /// Intensity image without any channel
    #[error("Image has no channels")]
    EmptyChannels,
}

/// Errors raised while opening or driving an overlay session
#[derive(Debug, Clone, Error)]
pub enum OverlayError {
    /// Segmentation failed to load
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Segmentation failed to composite
    #[error(transparent)]
    Composite(#[from] CompositeError),

    /// Segmentation extent differs from the base image extent
    #[error(
        "Segmentation {path} dimension ({}, {}) does not match image dimension ({}, {})",
        segmentation.0, segmentation.1, image.0, image.1
    )]
    ShapeMismatch {
        path: String,
        segmentation: (usize, usize),
        image: (usize, usize),
    },

    /// Opacity outside the unit interval
    #[error("Invalid opacity {0}: must be within [0, 1]")]
    InvalidOpacity(f64),

    /// The base image could not be used as an intensity image
    #[error("{path} is a label map, expected an intensity image")]
    NotAnImage { path: String },

    /// Overlay index past the number of segmentations
    #[error("Overlay {index} does not exist ({count} overlays)")]
    NoSuchOverlay { index: usize, count: usize },
}

/// Errors raised while reading a class scheme file
#[derive(Debug, Clone, Error)]
pub enum SchemeError {
    /// Scheme file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Scheme file is not valid JSON for a class scheme
    #[error("Invalid class scheme {path}: {message}")]
    Parse { path: String, message: String },

    /// Same class id listed more than once
    #[error("Class id {0} is defined more than once")]
    DuplicateClass(u32),

    /// Scheme defines no foreground class
    #[error("Class scheme defines no foreground class")]
    NoClasses,
}
