//! Single-file watermark pipeline: read, decode, render, encode, write.
//!
//! Shared by the `process` command and every batch worker.

use std::path::Path;
use tracing::debug;

use crate::codec;
use crate::error::Result;
use crate::watermark::Renderer;

/// Watermark `input` into `output`. Formats follow the file extensions.
pub fn process_file(renderer: &Renderer, input: &Path, output: &Path) -> Result<()> {
    let image = codec::read_image(input)?;
    let marked = renderer.render(&image)?;
    codec::write_image(output, &marked, renderer.config().output_quality)?;

    debug!(
        file = %input.display(),
        output = %output.display(),
        width = marked.width(),
        height = marked.height(),
        "watermarked image"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatermarkError;
    use crate::font::FontHandle;
    use crate::font::testing::BlockFace;
    use crate::watermark::WatermarkConfig;
    use image::{Rgb, RgbImage};

    fn renderer() -> Renderer {
        Renderer::new(WatermarkConfig::new("ACME", FontHandle::new(BlockFace))).unwrap()
    }

    #[test]
    fn test_png_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpg");
        RgbImage::from_pixel(40, 30, Rgb([10, 200, 30])).save(&input).unwrap();

        process_file(&renderer(), &input, &output).unwrap();

        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (40, 30));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = process_file(
            &renderer(),
            &dir.path().join("missing.png"),
            &dir.path().join("out.png"),
        )
        .unwrap_err();
        assert!(matches!(err, WatermarkError::Io(_)));
    }

    #[test]
    fn test_corrupt_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.jpg");
        let output = dir.path().join("out.jpg");
        std::fs::write(&input, b"not a jpeg").unwrap();

        let err = process_file(&renderer(), &input, &output).unwrap_err();
        assert!(matches!(err, WatermarkError::Decode(_)));
        assert!(!output.exists());
    }
}
