//! # Render Tests
//!
//! Single-file watermarking through the public API.

mod common;

use id_watermark::{FontLoader, Renderer, WatermarkError, pipeline};
use chrono::TimeZone;
use image::DynamicImage;

use common::{config, sample_image, write_corrupt, write_image};

#[test]
fn test_dimensions_survive_every_aspect_ratio() {
    let renderer = Renderer::new(config("ACME Corp")).unwrap();
    for (w, h) in [(640, 480), (480, 640), (333, 333), (1000, 3), (2, 700)] {
        let source = DynamicImage::ImageRgb8(sample_image(w, h));
        let out = renderer.render(&source).unwrap();
        assert_eq!(out.dimensions(), (w, h));
    }
}

#[test]
fn test_renders_are_pixel_identical() {
    let source = DynamicImage::ImageRgb8(sample_image(300, 200));
    let a = Renderer::new(config("ACME Corp")).unwrap().render(&source).unwrap();
    let b = Renderer::new(config("ACME Corp")).unwrap().render(&source).unwrap();
    assert!(a == b);
}

#[test]
fn test_watermark_changes_pixels() {
    let source = DynamicImage::ImageRgb8(sample_image(300, 200));
    let out = Renderer::new(config("ACME Corp")).unwrap().render(&source).unwrap();
    let changed = out
        .pixels()
        .zip(source.to_rgba8().pixels())
        .filter(|(a, b)| a != b)
        .count();
    assert!(changed > 0);
    assert!(changed < 300 * 200);
}

#[test]
fn test_company_name_changes_output() {
    let source = DynamicImage::ImageRgb8(sample_image(200, 200));
    let a = Renderer::new(config("ACME Corp")).unwrap().render(&source).unwrap();
    let b = Renderer::new(config("Globex Corporation International"))
        .unwrap()
        .render(&source)
        .unwrap();
    assert!(a != b);
}

#[test]
fn test_process_file_jpeg_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("card.jpg");
    let output = dir.path().join("card-marked.jpeg");
    write_image(&input, 210, 130);

    let renderer = Renderer::new(config("ACME Corp").with_output_quality(80)).unwrap();
    pipeline::process_file(&renderer, &input, &output).unwrap();

    let marked = image::open(&output).unwrap();
    assert_eq!((marked.width(), marked.height()), (210, 130));
}

#[test]
fn test_process_file_reports_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    write_corrupt(&input);

    let renderer = Renderer::new(config("ACME Corp")).unwrap();
    let err = pipeline::process_file(&renderer, &input, &dir.path().join("out.png")).unwrap_err();
    assert!(matches!(err, WatermarkError::Decode(_)));
}

#[test]
fn test_unsupported_input_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.bmp");
    std::fs::write(&input, b"BM").unwrap();

    let renderer = Renderer::new(config("ACME Corp")).unwrap();
    let err = pipeline::process_file(&renderer, &input, &dir.path().join("out.png")).unwrap_err();
    assert!(matches!(err, WatermarkError::Decode(_)));
}

#[test]
fn test_loader_falls_back_to_listed_font() {
    let loader = FontLoader::new(vec![
        "/nonexistent/Missing.ttf".into(),
        common::bundled_font_path(),
    ]);
    let font = loader.load(Some(std::path::Path::new("/nonexistent/Preferred.ttf"))).unwrap();
    assert!(font.advance_width("ACME", 40.0).unwrap() > 0.0);
}

#[test]
fn test_real_font_covers_whole_image() {
    let config = id_watermark::WatermarkConfig::new("ACME Corp", common::bundled_font())
        .with_timestamp(chrono::Local.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
        .with_opacity(255);
    let renderer = Renderer::new(config).unwrap();
    assert!(renderer.text_width() > 0.0);

    let source = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        400,
        300,
        image::Rgb([255, 255, 255]),
    ));
    let out = renderer.render(&source).unwrap();
    assert_eq!(out.dimensions(), (400, 300));

    // bands wider than one row or column stride must each hold ink
    let inked = |x0: u32, y0: u32, w: u32, h: u32| {
        (y0..y0 + h).any(|y| (x0..x0 + w).any(|x| out.get_pixel(x, y).0[..3] != [255, 255, 255]))
    };
    for y0 in (0..300).step_by(100) {
        assert!(inked(0, y0, 400, 100), "no ink in rows {}..{}", y0, y0 + 100);
    }
    for x0 in (0..400).step_by(100) {
        assert!(inked(x0, 0, 100, 300), "no ink in columns {}..{}", x0, x0 + 100);
    }

    let again = renderer.render(&source).unwrap();
    assert!(out == again);
}
