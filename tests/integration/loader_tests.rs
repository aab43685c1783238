//! Loader dispatch tests against files on disk.

use histoseg_viewer::composite::image_to_buffer;
use histoseg_viewer::error::{FormatError, LoadError};
use histoseg_viewer::loader::{load_data, RasterVolume};
use ndarray::array;

use super::test_utils::*;

// =============================================================================
// Extension dispatch
// =============================================================================

#[test]
fn test_unsupported_extensions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    for name in ["slide.tif", "mask.PNG", "scan.v2.png", "volume.gz", "README"] {
        let path = dir.path().join(name);
        std::fs::write(&path, b"irrelevant").unwrap();

        let err = load_data(&path, false).unwrap_err();
        assert!(
            matches!(err, LoadError::Format(FormatError::UnsupportedFormat { .. })),
            "{} should be rejected, got {:?}",
            name,
            err
        );
    }
}

#[test]
fn test_unsupported_error_names_extension() {
    let err = load_data("cases/brain.nii.bz2", false).unwrap_err();
    let message = err.to_string();
    assert!(message.contains(".nii.bz2"));
    assert!(message.contains(".nii.gz"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_data(dir.path().join("absent.png"), false).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn test_garbage_png_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png at all").unwrap();

    let err = load_data(&path, false).unwrap_err();
    assert!(matches!(err, LoadError::Decode { .. }));
}

// =============================================================================
// NIfTI
// =============================================================================

#[test]
fn test_nifti_intensity_axes_and_scaling() {
    let dir = tempfile::tempdir().unwrap();
    // x = 3, y = 2, z = 1; file order is x fastest
    let voxels = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
    let path = write_nifti(dir.path().join("image.nii"), &[3, 2, 1], &voxels);

    let volume = load_data(&path, false).unwrap();
    let image = volume.as_intensity().expect("intensity volume");

    // rows follow y, columns follow x
    assert_eq!(image.dim(), (2, 3, 1));
    assert_eq!(image[[0, 0, 0]], 0);
    assert_eq!(image[[0, 2, 0]], (0.4f32 as f64 * 255.0) as u32);
    assert_eq!(image[[1, 0, 0]], (0.6f32 as f64 * 255.0) as u32);
    assert_eq!(image[[1, 2, 0]], 255);
}

#[test]
fn test_nifti_gz_label_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_nifti_labels(
        dir.path().join("seg.nii.gz"),
        &[&[0, 1, 1, 2], &[3, 3, 0, 2]],
    );

    let volume = load_data(&path, true).unwrap();
    assert_eq!(volume.kind(), "label");
    assert_eq!(
        volume.as_label().unwrap(),
        &array![[0, 1, 1, 2], [3, 3, 0, 2]]
    );
    assert_eq!(volume.class_ids().into_iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
}

#[test]
fn test_nifti_and_nifti_gz_agree() {
    let dir = tempfile::tempdir().unwrap();
    let labels: [&[u8]; 2] = [&[1, 2, 3], &[0, 0, 1]];
    let plain = write_nifti_labels(dir.path().join("seg.nii"), &labels);
    let gzipped = write_nifti_labels(dir.path().join("seg.nii.gz"), &labels);

    assert_eq!(load_data(plain, true).unwrap(), load_data(gzipped, true).unwrap());
}

#[test]
fn test_nifti_trailing_singletons_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_nifti(dir.path().join("image.nii"), &[2, 2, 3, 1], &[0.5; 12]);

    let volume = load_data(&path, false).unwrap();
    assert_eq!(volume.shape(), &[2, 2, 3]);
}

#[test]
fn test_nifti_time_series_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_nifti(dir.path().join("series.nii"), &[2, 2, 1, 2], &[0.0; 8]);

    let err = load_data(&path, false).unwrap_err();
    assert!(matches!(err, LoadError::InvalidVolume { .. }));
}

#[test]
fn test_nifti_label_keeps_first_slice() {
    let dir = tempfile::tempdir().unwrap();
    // Two slices of 2x1; the second slice is all 3s
    let path = write_nifti(dir.path().join("seg.nii"), &[2, 1, 2], &[1.0, 2.0, 3.0, 3.0]);

    let volume = load_data(&path, true).unwrap();
    assert_eq!(volume.as_label().unwrap(), &array![[1, 2]]);
}

// =============================================================================
// PNG
// =============================================================================

#[test]
fn test_png_rgb_intensity() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb_png(dir.path().join("he.png"), 4, 3, |x, y| {
        [x as u8 * 10, y as u8 * 20, 200]
    });

    let volume = load_data(&path, false).unwrap();
    let image = volume.as_intensity().unwrap();
    assert_eq!(image.dim(), (3, 4, 3));
    assert_eq!(image[[2, 3, 0]], 30);
    assert_eq!(image[[2, 3, 1]], 40);
    assert_eq!(image[[0, 0, 2]], 200);
}

#[test]
fn test_png_without_alpha_is_opaque() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb_png(dir.path().join("he.png"), 3, 2, |x, y| {
        [x as u8, y as u8, 9]
    });

    let volume = load_data(&path, false).unwrap();
    let buffer = image_to_buffer(volume.as_intensity().unwrap()).unwrap();
    assert_eq!(buffer.extent(), (2, 3));
    for row in 0..2 {
        for col in 0..3 {
            assert_eq!(buffer.rgba(row, col)[3], 255);
        }
    }
}

#[test]
fn test_png_alpha_survives_compositing() {
    let dir = tempfile::tempdir().unwrap();
    let alpha = |x: u32, y: u32| (x * 60 + y * 7) as u8;
    let path = write_rgba_png(dir.path().join("he.png"), 4, 3, |x, y| {
        [x as u8 * 10, y as u8 * 20, 200, alpha(x, y)]
    });

    let volume = load_data(&path, false).unwrap();
    assert_eq!(volume.shape(), &[3, 4, 4]);
    let buffer = image_to_buffer(volume.as_intensity().unwrap()).unwrap();

    // File row y lands in buffer row 2 - y
    for y in 0..3u32 {
        for x in 0..4u32 {
            let pixel = buffer.rgba(2 - y as usize, x as usize);
            assert_eq!(pixel, [x as u8 * 10, y as u8 * 20, 200, alpha(x, y)]);
        }
    }
}

#[test]
fn test_png_sixteen_bit_keeps_depth() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gray16_png(dir.path().join("deep.png"), 2, 2, 1000);

    let volume = load_data(&path, false).unwrap();
    assert_eq!(volume.shape(), &[2, 2, 1]);
    assert!(volume.as_intensity().unwrap().iter().all(|&v| v == 1000));
}

#[test]
fn test_png_label_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_label_png(dir.path().join("seg.png"), &[&[0, 1], &[2, 3], &[3, 3]]);

    let volume = load_data(&path, true).unwrap();
    assert_eq!(volume.as_label().unwrap(), &array![[0, 1], [2, 3], [3, 3]]);
    assert_eq!(volume.extent(), (3, 2));
}

#[test]
fn test_rgb_png_is_not_a_label_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb_png(dir.path().join("seg.png"), 2, 2, |_, _| [1, 1, 1]);

    let err = load_data(&path, true).unwrap_err();
    assert!(matches!(err, LoadError::NotALabelMap { channels: 3, .. }));
}

#[test]
fn test_label_png_as_image_is_intensity() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_label_png(dir.path().join("seg.png"), &[&[1, 2]]);

    match load_data(&path, false).unwrap() {
        RasterVolume::Intensity(image) => assert_eq!(image.dim(), (1, 2, 1)),
        other => panic!("expected intensity, got {:?}", other.kind()),
    }
}
