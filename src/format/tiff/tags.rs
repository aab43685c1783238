//! TIFF tag and field type definitions.
//!
//! Only the tags needed to locate and decode the tiles of a pyramid level are
//! named here. Everything else is kept as a raw tag number in [`IfdEntry`]
//! and ignored.
//!
//! [`IfdEntry`]: super::IfdEntry

/// TIFF field types used by the tags we read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    Undefined,
    Long8,
}

impl FieldType {
    /// Size in bytes of one value of this type.
    pub const fn size_in_bytes(self) -> u64 {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::Undefined => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Rational | FieldType::Long8 => 8,
        }
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            7 => Some(FieldType::Undefined),
            16 => Some(FieldType::Long8),
            _ => None,
        }
    }
}

/// Tags consulted when reading tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffTag {
    ImageWidth,
    ImageLength,
    BitsPerSample,
    Compression,
    SamplesPerPixel,
    PlanarConfiguration,
    TileWidth,
    TileLength,
    TileOffsets,
    TileByteCounts,
    ExtraSamples,
    JpegTables,
}

impl TiffTag {
    pub const fn as_u16(self) -> u16 {
        match self {
            TiffTag::ImageWidth => 256,
            TiffTag::ImageLength => 257,
            TiffTag::BitsPerSample => 258,
            TiffTag::Compression => 259,
            TiffTag::SamplesPerPixel => 277,
            TiffTag::PlanarConfiguration => 284,
            TiffTag::TileWidth => 322,
            TiffTag::TileLength => 323,
            TiffTag::TileOffsets => 324,
            TiffTag::TileByteCounts => 325,
            TiffTag::ExtraSamples => 338,
            TiffTag::JpegTables => 347,
        }
    }

    /// Tag name for error messages.
    pub const fn name(self) -> &'static str {
        match self {
            TiffTag::ImageWidth => "ImageWidth",
            TiffTag::ImageLength => "ImageLength",
            TiffTag::BitsPerSample => "BitsPerSample",
            TiffTag::Compression => "Compression",
            TiffTag::SamplesPerPixel => "SamplesPerPixel",
            TiffTag::PlanarConfiguration => "PlanarConfiguration",
            TiffTag::TileWidth => "TileWidth",
            TiffTag::TileLength => "TileLength",
            TiffTag::TileOffsets => "TileOffsets",
            TiffTag::TileByteCounts => "TileByteCounts",
            TiffTag::ExtraSamples => "ExtraSamples",
            TiffTag::JpegTables => "JPEGTables",
        }
    }
}

/// Tile compression schemes the slide reader can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Raw interleaved samples
    None,
    /// JPEG (TIFF 6.0 "new style"), possibly abbreviated with shared tables
    Jpeg,
}

impl Compression {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Compression::None),
            7 => Some(Compression::Jpeg),
            _ => None,
        }
    }
}
