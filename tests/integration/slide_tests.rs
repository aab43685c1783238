//! Whole-slide reader and tile loader tests.

use histoseg_viewer::error::{LoadError, TiffError};
use histoseg_viewer::io::FileRangeReader;
use histoseg_viewer::loader::{FormatLoader, RasterVolume, SlideTileLoader, TILE_SIZE};
use histoseg_viewer::slide::SlideReader;

use super::test_utils::*;

fn gradient(x: u32, y: u32) -> Vec<u8> {
    vec![(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]
}

fn open(path: &std::path::Path) -> SlideReader<FileRangeReader> {
    SlideReader::open(FileRangeReader::open(path).unwrap()).unwrap()
}

// =============================================================================
// Pyramid structure
// =============================================================================

#[test]
fn test_levels_are_ordered_by_area() {
    let dir = tempfile::tempdir().unwrap();
    // Smaller level first in the file
    let path = TiffBuilder::new()
        .add_level(TestLevel::uncompressed(50, 30, 16, 3, gradient))
        .add_level(TestLevel::uncompressed(200, 120, 16, 3, gradient))
        .write_to(dir.path().join("slide.tif"));

    let slide = open(&path);
    assert_eq!(slide.level_count(), 2);
    assert_eq!(slide.dimensions(), (200, 120));

    // Level 1 is the 50 x 30 IFD: 4 x 2 tiles of 16
    assert!(slide.read_tile(1, 3, 1).is_ok());
    assert!(matches!(
        slide.read_tile(1, 4, 0),
        Err(TiffError::TileOutOfRange { .. })
    ));
    assert!(matches!(
        slide.read_tile(2, 0, 0),
        Err(TiffError::InvalidLevel { level: 2, .. })
    ));
}

#[test]
fn test_invalid_magic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.tif");
    std::fs::write(&path, b"XX*\0\x08\0\0\0\0\0\0\0\0\0\0\0").unwrap();

    let result = SlideReader::open(FileRangeReader::open(&path).unwrap());
    assert!(matches!(result, Err(TiffError::InvalidMagic(_))));
}

#[test]
fn test_zero_samples_per_pixel_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut level = TestLevel::uncompressed(4, 4, 4, 3, gradient);
    level.samples_per_pixel = 0;
    let path = TiffBuilder::new()
        .add_level(level)
        .write_to(dir.path().join("slide.tif"));

    let loader = SlideTileLoader {
        size: 4,
        ..Default::default()
    };
    let err = loader.load(&path, false).unwrap_err();
    assert!(
        matches!(
            err,
            LoadError::Slide(TiffError::InvalidTagValue {
                tag: "SamplesPerPixel",
                ..
            })
        ),
        "got {:?}",
        err
    );
}

#[test]
fn test_stripped_tiff_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strips.tif");

    // Header plus one IFD with only ImageWidth and ImageLength
    let mut data = Vec::new();
    data.extend_from_slice(b"II");
    data.extend_from_slice(&42u16.to_le_bytes());
    data.extend_from_slice(&8u32.to_le_bytes());
    data.extend_from_slice(&2u16.to_le_bytes());
    for (tag, value) in [(256u16, 64u32), (257, 64)] {
        data.extend_from_slice(&tag.to_le_bytes());
        data.extend_from_slice(&4u16.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&0u32.to_le_bytes());
    std::fs::write(&path, data).unwrap();

    let result = SlideReader::open(FileRangeReader::open(&path).unwrap());
    assert!(matches!(result, Err(TiffError::StripOrganization)));
}

// =============================================================================
// Tiles and regions
// =============================================================================

#[test]
fn test_region_spans_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let path = TiffBuilder::new()
        .add_level(TestLevel::uncompressed(40, 40, 16, 3, gradient))
        .write_to(dir.path().join("slide.tif"));

    let slide = open(&path);
    let region = slide.read_region(0, (10, 12), (20, 20)).unwrap();

    for (x, y, pixel) in region.enumerate_pixels() {
        let expected = gradient(x + 10, y + 12);
        assert_eq!(&pixel.0[..3], &expected[..], "pixel ({}, {})", x, y);
        assert_eq!(pixel.0[3], 255);
    }
}

#[test]
fn test_region_outside_level_is_transparent() {
    let dir = tempfile::tempdir().unwrap();
    let path = TiffBuilder::new()
        .add_level(TestLevel::uncompressed(20, 20, 16, 3, gradient))
        .write_to(dir.path().join("slide.tif"));

    let slide = open(&path);
    let region = slide.read_region(0, (15, 15), (10, 10)).unwrap();

    assert_eq!(region.get_pixel(0, 0).0[3], 255);
    assert_eq!(region.get_pixel(4, 4).0[3], 255);
    // Past the 20x20 level, including the padding of edge tiles
    assert_eq!(region.get_pixel(5, 0).0, [0, 0, 0, 0]);
    assert_eq!(region.get_pixel(0, 5).0, [0, 0, 0, 0]);
    assert_eq!(region.get_pixel(9, 9).0, [0, 0, 0, 0]);
}

#[test]
fn test_tile_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = TiffBuilder::new()
        .add_level(TestLevel::uncompressed(20, 20, 16, 3, gradient))
        .write_to(dir.path().join("slide.tif"));

    let slide = open(&path);
    assert!(slide.read_tile(0, 1, 1).is_ok());
    assert!(matches!(
        slide.read_tile(0, 2, 0),
        Err(TiffError::TileOutOfRange { .. })
    ));
    assert!(matches!(
        slide.read_tile(3, 0, 0),
        Err(TiffError::InvalidLevel { level: 3, .. })
    ));
}

#[test]
fn test_jpeg_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let path = TiffBuilder::new()
        .add_level(TestLevel::jpeg(32, [200, 40, 90]))
        .add_level(TestLevel::abbreviated_jpeg(16, [200, 40, 90]))
        .write_to(dir.path().join("slide.svs"));

    let slide = open(&path);
    for level in 0..2 {
        let tile = slide.read_tile(level, 0, 0).unwrap();
        let pixel = tile.get_pixel(5, 5).0;
        for (actual, expected) in pixel.iter().zip([200u8, 40, 90, 255]) {
            assert!(
                (*actual as i32 - expected as i32).abs() <= 6,
                "level {}: {:?}",
                level,
                pixel
            );
        }
    }
}

// =============================================================================
// SlideTileLoader
// =============================================================================

#[test]
fn test_default_tile_loader_reads_224_square() {
    let dir = tempfile::tempdir().unwrap();
    let path = TiffBuilder::new()
        .add_level(TestLevel::uncompressed(256, 256, 128, 3, gradient))
        .write_to(dir.path().join("slide.tif"));

    let volume = SlideTileLoader::default().load(&path, false).unwrap();
    let RasterVolume::Intensity(image) = volume else {
        panic!("expected an intensity volume");
    };

    let size = TILE_SIZE as usize;
    assert_eq!(image.dim(), (size, size, 3));
    assert_eq!(image[[3, 200, 0]], 200);
    assert_eq!(image[[3, 200, 1]], 3);
    assert_eq!(image[[223, 223, 2]], (446 % 256) as u32);
}

#[test]
fn test_tile_loader_ignores_label_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = TiffBuilder::new()
        .add_level(TestLevel::uncompressed(8, 8, 8, 3, gradient))
        .write_to(dir.path().join("slide.tif"));

    let loader = SlideTileLoader {
        size: 8,
        ..Default::default()
    };
    assert_eq!(loader.load(&path, true).unwrap().kind(), "intensity");
}

#[test]
fn test_associated_alpha_is_unpremultiplied() {
    let dir = tempfile::tempdir().unwrap();
    let level = TestLevel::uncompressed(4, 4, 4, 4, |_, _| vec![100, 50, 0, 128])
        .with_extra_samples(1);
    let path = TiffBuilder::new()
        .add_level(level)
        .write_to(dir.path().join("slide.tif"));

    let loader = SlideTileLoader {
        size: 4,
        ..Default::default()
    };
    let RasterVolume::Intensity(image) = loader.load(&path, false).unwrap() else {
        panic!("expected an intensity volume");
    };

    // 100 * 255 / 128 = 199.2, 50 * 255 / 128 = 99.6; both truncate
    assert_eq!(image[[0, 0, 0]], 199);
    assert_eq!(image[[0, 0, 1]], 99);
    assert_eq!(image[[3, 3, 2]], 0);
}

#[test]
fn test_zero_alpha_tile_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let level = TestLevel::uncompressed(4, 4, 4, 4, |x, _| {
        if x == 0 {
            vec![0, 0, 0, 0]
        } else {
            vec![10, 10, 10, 255]
        }
    })
    .with_extra_samples(2);
    let path = TiffBuilder::new()
        .add_level(level)
        .write_to(dir.path().join("slide.tif"));

    let loader = SlideTileLoader {
        size: 4,
        ..Default::default()
    };
    let err = loader.load(&path, false).unwrap_err();
    assert!(matches!(err, LoadError::CorruptTile { zero_alpha_pixels: 4 }));
}

#[test]
fn test_region_past_slide_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = TiffBuilder::new()
        .add_level(TestLevel::uncompressed(100, 100, 64, 3, gradient))
        .write_to(dir.path().join("slide.tif"));

    // The default 224 square overhangs a 100 x 100 slide
    let err = SlideTileLoader::default().load(&path, false).unwrap_err();
    assert!(matches!(err, LoadError::CorruptTile { .. }));
}

#[test]
fn test_missing_slide() {
    let dir = tempfile::tempdir().unwrap();
    let err = SlideTileLoader::default()
        .load(&dir.path().join("absent.svs"), false)
        .unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}
