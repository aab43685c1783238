//! End-to-end tests: files on disk to a rendered document.

use histoseg_viewer::composite::{pack_rgba, ClassScheme};
use histoseg_viewer::error::{CompositeError, LoadError, OverlayError, SchemeError};
use histoseg_viewer::overlay::Visualization;
use histoseg_viewer::server::{generate_document, write_document, OpacitySync};

use super::test_utils::*;

#[test]
fn test_png_image_with_two_segmentations() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("run_a")).unwrap();
    std::fs::create_dir(dir.path().join("run_b")).unwrap();

    let image = write_rgb_png(dir.path().join("he.png"), 3, 2, |x, y| {
        [x as u8 * 50, y as u8 * 100, 7]
    });
    let seg_a = write_label_png(dir.path().join("run_a/seg.png"), &[&[0, 1, 2], &[3, 0, 0]]);
    let seg_b = write_nifti_labels(
        dir.path().join("run_b/seg.nii.gz"),
        &[&[1, 1, 1], &[0, 0, 0]],
    );

    let vis = Visualization::open(&image, &[&seg_a, &seg_b], ClassScheme::default()).unwrap();
    assert_eq!(vis.extent(), (2, 3));
    assert_eq!(vis.overlays().len(), 2);
    assert_eq!(vis.overlays()[0].name(), "run_a/seg.png");
    assert_eq!(vis.overlays()[1].name(), "run_b/seg.nii.gz");

    // Volume row 0 lands in the last buffer row
    assert_eq!(vis.base().rgba(1, 2), [100, 0, 7, 255]);
    assert_eq!(vis.base().rgba(0, 0), [0, 100, 7, 255]);

    let first = vis.overlays()[0].buffer();
    assert_eq!(first.rgba(1, 0), [0, 0, 0, 0]);
    assert_eq!(first.rgba(1, 1), [0, 255, 0, 255]);
    assert_eq!(first.rgba(1, 2), [0, 0, 255, 255]);
    assert_eq!(first.pixels()[[0, 0]], pack_rgba([255, 0, 0, 255]));

    for overlay in vis.overlays() {
        assert_eq!(overlay.opacity(), 0.5);
    }
}

#[test]
fn test_nifti_image_and_label() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_nifti(dir.path().join("ct.nii"), &[2, 2, 1], &[0.0, 1.0, 0.5, 0.25]);
    let seg = write_nifti_labels(dir.path().join("seg.nii"), &[&[0, 2], &[2, 0]]);

    let vis = Visualization::open(&image, &[&seg], ClassScheme::default()).unwrap();
    assert_eq!(vis.extent(), (2, 2));

    // Single-channel image is drawn as gray
    assert_eq!(vis.base().rgba(1, 1), [255, 255, 255, 255]);
}

#[test]
fn test_shape_mismatch_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_rgb_png(dir.path().join("he.png"), 4, 4, |_, _| [1, 2, 3]);
    let wide: &[u8] = &[0; 4];
    let narrow: &[u8] = &[0; 3];
    let good = write_label_png(dir.path().join("good.png"), &[wide; 4]);
    let bad = write_label_png(dir.path().join("bad.png"), &[narrow; 4]);

    let err = Visualization::open(&image, &[&good, &bad], ClassScheme::default()).unwrap_err();
    match err {
        OverlayError::ShapeMismatch {
            segmentation,
            image,
            ..
        } => {
            assert_eq!(segmentation, (4, 3));
            assert_eq!(image, (4, 4));
        }
        other => panic!("expected a shape mismatch, got {}", other),
    }
}

#[test]
fn test_unknown_class_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_rgb_png(dir.path().join("he.png"), 2, 1, |_, _| [0, 0, 0]);
    let seg = write_label_png(dir.path().join("seg.png"), &[&[1, 9]]);

    let err = Visualization::open(&image, &[&seg], ClassScheme::default()).unwrap_err();
    assert!(matches!(
        err,
        OverlayError::Composite(CompositeError::UnknownClass { class_id: 9 })
    ));
}

#[test]
fn test_rgb_segmentation_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_rgb_png(dir.path().join("he.png"), 2, 2, |_, _| [0, 0, 0]);
    let seg = write_rgb_png(dir.path().join("seg.png"), 2, 2, |_, _| [1, 1, 1]);

    let err = Visualization::open(&image, &[&seg], ClassScheme::default()).unwrap_err();
    assert!(matches!(
        err,
        OverlayError::Load(LoadError::NotALabelMap { channels: 3, .. })
    ));
}

#[test]
fn test_custom_scheme_file() {
    let dir = tempfile::tempdir().unwrap();
    let classes = dir.path().join("classes.json");
    std::fs::write(
        &classes,
        r#"{"classes": [
            {"id": 1, "name": "Gland", "color": [255, 255, 0]},
            {"id": 9, "name": "Necrosis", "color": [128, 0, 128]}
        ]}"#,
    )
    .unwrap();

    let scheme = ClassScheme::load(&classes).unwrap();
    let image = write_rgb_png(dir.path().join("he.png"), 2, 1, |_, _| [0, 0, 0]);
    let seg = write_label_png(dir.path().join("seg.png"), &[&[1, 9]]);

    let vis = Visualization::open(&image, &[&seg], scheme).unwrap();
    assert_eq!(vis.overlays()[0].buffer().rgba(0, 1), [128, 0, 128, 255]);

    let names: Vec<_> = vis.legend().cells.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Gland", "Necrosis"]);
}

#[test]
fn test_invalid_scheme_file() {
    let dir = tempfile::tempdir().unwrap();
    let classes = dir.path().join("classes.json");

    std::fs::write(&classes, r#"{"classes": [{"id": 1, "name": "x"}]}"#).unwrap();
    assert!(matches!(
        ClassScheme::load(&classes),
        Err(SchemeError::Parse { .. })
    ));

    std::fs::write(
        &classes,
        r#"{"classes": [{"id": 2, "name": "a", "color": [1, 2, 3]}, {"id": 2, "name": "b", "color": [1, 2, 3]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        ClassScheme::load(&classes),
        Err(SchemeError::DuplicateClass(2))
    ));
}

#[test]
fn test_opacity_changes_keep_buffers() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_rgb_png(dir.path().join("he.png"), 2, 2, |_, _| [9, 9, 9]);
    let seg = write_label_png(dir.path().join("seg.png"), &[&[1, 2], &[3, 0]]);

    let mut vis = Visualization::open(&image, &[&seg], ClassScheme::default()).unwrap();
    let before = vis.overlays()[0].buffer().clone();

    vis.set_opacity(0, 0.2).unwrap();
    vis.set_opacity(0, 0.8).unwrap();
    assert!(vis.set_opacity(0, -0.1).is_err());

    assert_eq!(vis.overlays()[0].opacity(), 0.8);
    assert_eq!(vis.overlays()[0].buffer(), &before);

    let html = generate_document(&vis, OpacitySync::Static);
    assert!(html.contains(r#"value="0.80""#));
}

#[test]
fn test_rendered_document_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("case")).unwrap();
    let image = write_rgb_png(dir.path().join("case/he.png"), 300, 700, |_, _| [200, 100, 50]);
    let seg = write_label_png(dir.path().join("case/seg.png"), &vec![&[1u8; 300][..]; 700]);

    let vis = Visualization::open(&image, &[&seg], ClassScheme::default()).unwrap();
    let output = dir.path().join("image_and_segmentation.html");
    write_document(&vis, &output).unwrap();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("Image (case/he.png) Segmentation (case/seg.png)"));
    // 300 columns by 700 rows fits in 257 x 600
    assert!(html.contains(r#"width="257" height="600""#));
    assert!(html.contains(">Tumor</span>"));
}
