//! # Watermark Renderer
//!
//! Burns the repeating `"{company} - {date}"` string into an image.
//!
//! ```text
//! source ──► white square canvas (side = diagonal)
//!              │  paste source at centered origin
//!              │  stamp glyph mask at every tile (color, alpha = opacity × coverage)
//!              ▼
//!            crop at the same origin ──► result (same size as source)
//! ```
//!
//! The glyph mask is rasterized once in [`Renderer::new`]; every call to
//! [`Renderer::render`] only reads shared state, so one renderer serves all
//! batch workers at once.

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use tracing::trace;

use super::config::WatermarkConfig;
use super::layout::{CanvasGeometry, Tile, TileLayout, px_to_units, units_to_px};
use crate::error::{Result, WatermarkError};
use crate::font::GlyphMask;

const CANVAS_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Stateless (per call) watermark renderer.
#[derive(Debug)]
pub struct Renderer {
    config: WatermarkConfig,
    text: String,
    /// Advance of `text` in length units
    text_width: f64,
    mask: GlyphMask,
}

impl Renderer {
    /// Validate `config` and rasterize the watermark string.
    pub fn new(config: WatermarkConfig) -> Result<Self> {
        config.validate()?;

        let text = config.watermark_text();
        let pixel_size = units_to_px(config.font_size as f64) as f32;

        let advance = config.font.advance_width(&text, pixel_size)?;
        if !advance.is_finite() || advance < 0.0 {
            return Err(WatermarkError::Render(format!(
                "font reported a degenerate text width: {}",
                advance
            )));
        }

        let mask = config.font.rasterize(&text, pixel_size)?;
        if mask.coverage.len() != mask.width as usize * mask.height as usize {
            return Err(WatermarkError::Render(format!(
                "glyph mask is {}x{} but holds {} samples",
                mask.width,
                mask.height,
                mask.coverage.len()
            )));
        }

        Ok(Self {
            config,
            text,
            text_width: px_to_units(advance as f64),
            mask,
        })
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    /// The string being tiled.
    pub fn watermark_text(&self) -> &str {
        &self.text
    }

    /// Width of the watermark string in length units.
    pub fn text_width(&self) -> f64 {
        self.text_width
    }

    /// Watermark `image`. The result always has the source's dimensions.
    pub fn render(&self, image: &DynamicImage) -> Result<RgbaImage> {
        let geometry = CanvasGeometry::new(image.width(), image.height())?;
        let layout = TileLayout::new(
            geometry.diagonal,
            self.config.font_size as f64,
            self.config.line_spacing as f64,
            self.text_width,
            self.config.text_spacing as f64,
        )?;

        let mut canvas =
            RgbaImage::from_pixel(geometry.side_px, geometry.side_px, CANVAS_BACKGROUND);
        imageops::overlay(
            &mut canvas,
            &image.to_rgba8(),
            geometry.origin_x as i64,
            geometry.origin_y as i64,
        );

        let mut stamped = 0usize;
        for tile in layout.tiles() {
            if self.stamp(&mut canvas, &geometry, tile) {
                stamped += 1;
            }
        }
        trace!(
            width = geometry.image_width,
            height = geometry.image_height,
            canvas = geometry.side_px,
            tiles = stamped,
            "watermark tiled"
        );

        Ok(imageops::crop_imm(
            &canvas,
            geometry.origin_x,
            geometry.origin_y,
            geometry.image_width,
            geometry.image_height,
        )
        .to_image())
    }

    /// Blend the glyph mask at one tile. Returns false if nothing landed on
    /// the canvas.
    fn stamp(&self, canvas: &mut RgbaImage, geometry: &CanvasGeometry, tile: Tile) -> bool {
        let mask = &self.mask;
        let opacity = self.config.opacity as f32 / 255.0;
        if mask.is_empty() || opacity == 0.0 {
            return false;
        }

        let left = units_to_px(tile.x).round() as i64 + mask.origin_x as i64;
        let top = geometry.flip_y(tile.y) + mask.origin_y as i64;
        let side = canvas.width() as i64;

        let x_start = left.max(0);
        let y_start = top.max(0);
        let x_end = (left + mask.width as i64).min(side);
        let y_end = (top + mask.height as i64).min(side);
        if x_start >= x_end || y_start >= y_end {
            return false;
        }

        let color = self.config.color;
        for y in y_start..y_end {
            for x in x_start..x_end {
                let coverage = mask.get((x - left) as u32, (y - top) as u32);
                if coverage <= 0.0 {
                    continue;
                }
                let alpha = opacity * coverage;
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                pixel[0] = blend_channel(pixel[0], color.r, alpha);
                pixel[1] = blend_channel(pixel[1], color.g, alpha);
                pixel[2] = blend_channel(pixel[2], color.b, alpha);
            }
        }
        true
    }
}

/// Source-over onto an opaque background.
#[inline]
fn blend_channel(background: u8, foreground: u8, alpha: f32) -> u8 {
    let value = background as f32 * (1.0 - alpha) + foreground as f32 * alpha;
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::BlockFace;
    use crate::font::{FontHandle, Typeface};
    use crate::watermark::config::Rgb;
    use chrono::{Local, TimeZone};
    use image::RgbImage;

    fn config() -> WatermarkConfig {
        WatermarkConfig::new("ACME Corp", FontHandle::new(BlockFace))
            .with_timestamp(Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
            .with_font_size(10.0)
            .with_text_spacing(5.0)
            .with_line_spacing(5.0)
            .with_opacity(255)
            .with_color(Rgb::new(0, 0, 0))
    }

    fn white(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([255; 3])))
    }

    #[test]
    fn test_output_keeps_dimensions() {
        let renderer = Renderer::new(config()).unwrap();
        for (w, h) in [(200, 100), (100, 200), (64, 64), (1, 300), (257, 31)] {
            let out = renderer.render(&white(w, h)).unwrap();
            assert_eq!(out.dimensions(), (w, h), "source {}x{}", w, h);
        }
    }

    #[test]
    fn test_watermark_reaches_crop() {
        let renderer = Renderer::new(config()).unwrap();
        let out = renderer.render(&white(200, 100)).unwrap();
        assert!(out.pixels().any(|p| p[0] < 255), "no text inside the crop");
        assert!(out.pixels().any(|p| p[0] == 255), "crop fully covered");
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = Renderer::new(config()).unwrap();
        let source = white(180, 120);
        assert_eq!(renderer.render(&source).unwrap(), renderer.render(&source).unwrap());

        let again = Renderer::new(config()).unwrap();
        assert_eq!(renderer.render(&source).unwrap(), again.render(&source).unwrap());
    }

    #[test]
    fn test_zero_opacity_leaves_source_untouched() {
        let renderer = Renderer::new(config().with_opacity(0)).unwrap();
        let source = DynamicImage::ImageRgb8(RgbImage::from_fn(50, 40, |x, y| {
            image::Rgb([x as u8 * 5, y as u8 * 6, 77])
        }));
        let out = renderer.render(&source).unwrap();
        assert_eq!(out, source.to_rgba8());
    }

    #[test]
    fn test_transparent_source_is_flattened() {
        let renderer = Renderer::new(config().with_opacity(0)).unwrap();
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 0])));
        let out = renderer.render(&source).unwrap();
        assert!(out.pixels().all(|p| *p == CANVAS_BACKGROUND));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Renderer::new(config().with_font_size(5.0)).unwrap_err();
        assert!(matches!(err, WatermarkError::ConfigValidation(_)));
    }

    #[test]
    fn test_text_width_in_length_units() {
        let renderer = Renderer::new(config()).unwrap();
        // BlockFace: 0.6 em per char; 10 units == 13.33 px em
        let chars = renderer.watermark_text().chars().count() as f64;
        let expected = chars * 0.6 * 10.0;
        assert!((renderer.text_width() - expected).abs() < 1e-3);
    }

    struct BrokenFace;

    impl Typeface for BrokenFace {
        fn advance_width(&self, _: &str, _: f32) -> Result<f32> {
            Err(WatermarkError::Render("font has no units-per-em".to_string()))
        }

        fn rasterize(&self, _: &str, _: f32) -> Result<GlyphMask> {
            Ok(GlyphMask::empty())
        }
    }

    #[test]
    fn test_malformed_font_is_render_error() {
        let config = WatermarkConfig::new("ACME", FontHandle::new(BrokenFace));
        assert!(matches!(Renderer::new(config), Err(WatermarkError::Render(_))));
    }

    #[test]
    fn test_blend_channel() {
        assert_eq!(blend_channel(255, 0, 0.0), 255);
        assert_eq!(blend_channel(255, 0, 1.0), 0);
        assert_eq!(blend_channel(200, 100, 0.5), 150);
    }
}
