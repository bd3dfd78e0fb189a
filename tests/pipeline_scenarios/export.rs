//! Image stages writing real PNG files

use morphline::{Pipeline, Store};
use morph_stages::image::{FILE_NAME, PIXELS_DATA};
use morph_stages::noise::NoiseParameters;
use morph_stages::png::SIGNATURE;
use morph_stages::{presets, Checkerboard, ExportPng, SetFileName};
use tempfile::TempDir;

#[test]
fn test_checkerboard_to_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("board.png");

    let pipeline = presets::checkerboard(8, 8, &path).unwrap();
    assert_eq!(
        pipeline.analyze().to_string(),
        "All pipeline operations compatible.\n"
    );

    let store = pipeline.run().unwrap();
    assert_eq!(store.field(&PIXELS_DATA).unwrap().len(), 64);
    assert_eq!(store.field(&FILE_NAME).unwrap(), &path);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes[..8], SIGNATURE);
}

#[test]
fn test_noise_to_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("noise.png");
    let params = NoiseParameters {
        width: 24,
        height: 16,
        frequency: 0.1,
    };

    let report = presets::noise(params, 3, &path)
        .unwrap()
        .run_with(&mut Store::new())
        .unwrap();
    assert_eq!(report.stages.len(), 5);
    assert!(path.exists());
}

#[test]
fn test_export_before_file_name_is_rejected() {
    let pipeline = Pipeline::first_op(Checkerboard {
        width: 2,
        height: 2,
    })
    .unwrap()
    .then_op(ExportPng)
    .unwrap()
    .then_op(SetFileName("late.png".into()))
    .unwrap();

    let analysis = pipeline.analyze();
    assert!(!analysis.is_compatible());
    assert!(analysis.to_string().starts_with(
        "Pipeline operation ExportPng is not compatible with contract from ancestor Checkerboard\n"
    ));
    assert!(analysis.to_string().contains("FileName"));
    assert!(pipeline.run().is_err());
}
