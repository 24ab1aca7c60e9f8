//! TTF/OTF rendering for watermark text.
//!
//! Renders a string to an anti-aliased coverage mask using ab_glyph. The
//! mask is computed once per run and stamped across the canvas by the
//! renderer.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use std::path::Path;

use super::{GlyphMask, Typeface};
use crate::error::{Result, WatermarkError};

/// A parsed TrueType/OpenType font.
pub struct TtfFace {
    font: FontArc,
}

impl TtfFace {
    /// Parse font bytes (TTF, OTF, or the first face of a collection).
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(data)
            .map_err(|e| WatermarkError::FontLoad(format!("parsing font: {}", e)))?;
        Ok(Self { font })
    }

    /// Read and parse a font file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            WatermarkError::FontLoad(format!("reading font file {}: {}", path.display(), e))
        })?;
        Self::from_bytes(data).map_err(|e| match e {
            WatermarkError::FontLoad(msg) => {
                WatermarkError::FontLoad(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Map an em size in pixels to ab_glyph's scale, which is measured in
    /// ascent-to-descent height.
    fn scale(&self, pixel_size: f32) -> Result<PxScale> {
        let units_per_em = self
            .font
            .units_per_em()
            .ok_or_else(|| WatermarkError::Render("font has no units-per-em".to_string()))?;
        Ok(PxScale::from(
            pixel_size * self.font.height_unscaled() / units_per_em,
        ))
    }

    /// Pen position of every glyph, plus the final caret.
    fn layout(&self, text: &str, scale: PxScale) -> (Vec<(GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(scale);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret_x = 0.0f32;
        let mut prev: Option<GlyphId> = None;

        for ch in text.chars() {
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                caret_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push((glyph_id, caret_x));
            caret_x += scaled.h_advance(glyph_id);
            prev = Some(glyph_id);
        }

        (glyphs, caret_x)
    }
}

impl Typeface for TtfFace {
    fn advance_width(&self, text: &str, pixel_size: f32) -> Result<f32> {
        let scale = self.scale(pixel_size)?;
        Ok(self.layout(text, scale).1)
    }

    fn rasterize(&self, text: &str, pixel_size: f32) -> Result<GlyphMask> {
        let scale = self.scale(pixel_size)?;
        let (glyphs, _) = self.layout(text, scale);

        let outlined: Vec<_> = glyphs
            .into_iter()
            .filter_map(|(glyph_id, x)| {
                self.font
                    .outline_glyph(glyph_id.with_scale_and_position(scale, point(x, 0.0)))
            })
            .collect();

        if outlined.is_empty() {
            return Ok(GlyphMask::empty());
        }

        // Union of all glyph pixel bounds
        let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
        let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
        for glyph in &outlined {
            let bounds = glyph.px_bounds();
            min_x = min_x.min(bounds.min.x as i32);
            min_y = min_y.min(bounds.min.y as i32);
            max_x = max_x.max(bounds.max.x as i32);
            max_y = max_y.max(bounds.max.y as i32);
        }

        let width = (max_x - min_x).max(0) as u32;
        let height = (max_y - min_y).max(0) as u32;
        let mut coverage = vec![0.0f32; width as usize * height as usize];

        for glyph in &outlined {
            let bounds = glyph.px_bounds();
            let left = bounds.min.x as i32 - min_x;
            let top = bounds.min.y as i32 - min_y;
            glyph.draw(|px, py, c| {
                let x = left + px as i32;
                let y = top + py as i32;
                if x >= 0 && (x as u32) < width && y >= 0 && (y as u32) < height {
                    let idx = y as usize * width as usize + x as usize;
                    // Overlapping glyphs accumulate, clamped
                    coverage[idx] = (coverage[idx] + c).min(1.0);
                }
            });
        }

        Ok(GlyphMask {
            width,
            height,
            origin_x: min_x,
            origin_y: min_y,
            coverage,
        })
    }
}
