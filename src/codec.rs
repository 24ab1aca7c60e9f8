//! # Image Codec
//!
//! JPEG and PNG only. The format is chosen from the file extension, case
//! insensitively, both when reading and when writing.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::path::Path;

use crate::error::{Result, WatermarkError};

/// Extensions eligible for watermarking, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Supported raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Format for a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Format for a path, by extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    fn as_image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }
}

/// True if `path` has a supported image extension.
pub fn is_supported(path: &Path) -> bool {
    ImageFormat::from_path(path).is_some()
}

/// Decode `bytes` as `format`.
pub fn decode(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    image::load_from_memory_with_format(bytes, format.as_image_format())
        .map_err(|e| WatermarkError::Decode(e.to_string()))
}

/// Encode `image` as `format`. `quality` (1-100) only applies to JPEG.
pub fn encode(image: &RgbaImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let (width, height) = image.dimensions();

    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| WatermarkError::Encode(e.to_string()))?;
        }
        ImageFormat::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| WatermarkError::Encode(e.to_string()))?;
        }
    }

    Ok(bytes)
}

/// Read and decode an image file, format taken from its extension.
pub fn read_image(path: &Path) -> Result<DynamicImage> {
    let format = ImageFormat::from_path(path).ok_or_else(|| {
        WatermarkError::Decode(format!(
            "unsupported input format: {} (supported: .jpg, .jpeg, .png)",
            path.display()
        ))
    })?;
    let bytes = std::fs::read(path)?;
    decode(&bytes, format).map_err(|e| match e {
        WatermarkError::Decode(msg) => {
            WatermarkError::Decode(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Encode and write an image file, format taken from its extension.
pub fn write_image(path: &Path, image: &RgbaImage, quality: u8) -> Result<()> {
    let format = ImageFormat::from_path(path).ok_or_else(|| {
        WatermarkError::Encode(format!(
            "unsupported output format: {} (supported: .jpg, .jpeg, .png)",
            path.display()
        ))
    })?;
    let bytes = encode(image, format, quality)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
