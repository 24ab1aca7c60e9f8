//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{Local, TimeZone};
use id_watermark::font::testing::BlockFace;
use id_watermark::{FontHandle, TtfFace, WatermarkConfig};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// DejaVu Sans, shipped alongside the tests.
pub fn bundled_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fonts/DejaVuSans.ttf")
}

pub fn bundled_font() -> FontHandle {
    FontHandle::new(TtfFace::from_file(&bundled_font_path()).unwrap())
}

/// Config with a pinned date so output is reproducible.
pub fn config(company: &str) -> WatermarkConfig {
    WatermarkConfig::new(company, FontHandle::new(BlockFace))
        .with_timestamp(Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        .with_font_size(12.0)
        .with_text_spacing(10.0)
        .with_line_spacing(10.0)
        .with_opacity(120)
}

/// Gradient test image, so watermark pixels differ from the source.
pub fn sample_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 180])
    })
}

pub fn write_image(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    sample_image(width, height).save(path).unwrap();
}

pub fn write_corrupt(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"\xFF\xD8\xFF\xE0 definitely not a jpeg").unwrap();
}
