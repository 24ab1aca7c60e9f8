//! # Fonts
//!
//! The renderer never parses font files. It talks to a [`Typeface`], which
//! measures a string and rasterizes it to an anti-aliased coverage mask.
//!
//! - [`TtfFace`]: TrueType/OpenType implementation backed by `ab_glyph`
//! - [`FontLoader`]: preferred path first, then the system fallback list
//! - [`FontHandle`]: cheap shared handle stored in the watermark config

mod loader;
mod ttf;

pub use loader::{DEFAULT_SYSTEM_FONT_PATHS, FontLoader};
pub use ttf::TtfFace;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::Result;

/// A font that can measure and rasterize a single line of text.
///
/// `pixel_size` is the em size in pixels. Implementations must be usable from
/// several worker threads at once.
pub trait Typeface: Send + Sync {
    /// Horizontal advance of `text`, in pixels, including kerning.
    fn advance_width(&self, text: &str, pixel_size: f32) -> Result<f32>;

    /// Rasterize `text` with the pen starting at the origin of the baseline.
    fn rasterize(&self, text: &str, pixel_size: f32) -> Result<GlyphMask>;
}

/// Anti-aliased coverage of a rendered string.
///
/// `origin_x`/`origin_y` locate the top-left corner of the mask relative to
/// the pen start on the baseline. Glyphs sit above the baseline, so
/// `origin_y` is normally negative.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMask {
    pub width: u32,
    pub height: u32,
    pub origin_x: i32,
    pub origin_y: i32,
    /// Row-major coverage, 0.0 = untouched, 1.0 = fully covered.
    pub coverage: Vec<f32>,
}

impl GlyphMask {
    /// A mask that covers nothing.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            origin_x: 0,
            origin_y: 0,
            coverage: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coverage at (x, y) inside the mask.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.coverage[(y * self.width + x) as usize]
    }
}

/// Shared, read-only font handle.
#[derive(Clone)]
pub struct FontHandle(Arc<dyn Typeface>);

impl FontHandle {
    pub fn new(face: impl Typeface + 'static) -> Self {
        Self(Arc::new(face))
    }
}

impl Deref for FontHandle {
    type Target = dyn Typeface;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FontHandle(..)")
    }
}

/// Fixed-width block glyphs, so tests never depend on installed fonts.
#[doc(hidden)]
pub mod testing {
    use super::{GlyphMask, Typeface};
    use crate::error::Result;

    pub struct BlockFace;

    impl Typeface for BlockFace {
        fn advance_width(&self, text: &str, pixel_size: f32) -> Result<f32> {
            Ok(text.chars().count() as f32 * pixel_size * 0.6)
        }

        fn rasterize(&self, text: &str, pixel_size: f32) -> Result<GlyphMask> {
            let advance = pixel_size * 0.6;
            let width = self.advance_width(text, pixel_size)?.ceil() as u32;
            let height = (pixel_size * 0.7).ceil() as u32;
            let mut coverage = vec![0.0; (width * height) as usize];

            for (i, ch) in text.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let start = (i as f32 * advance) as u32;
                let end = ((i as f32 * advance + pixel_size * 0.5) as u32).min(width);
                for y in 0..height {
                    for x in start..end {
                        coverage[(y * width + x) as usize] = 1.0;
                    }
                }
            }

            Ok(GlyphMask {
                width,
                height,
                origin_x: 0,
                origin_y: -(height as i32),
                coverage,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::BlockFace;
    use super::*;

    #[test]
    fn test_handle_derefs_to_typeface() {
        let handle = FontHandle::new(BlockFace);
        assert_eq!(handle.advance_width("abcd", 10.0).unwrap(), 24.0);
    }

    #[test]
    fn test_block_face_mask_sits_on_baseline() {
        let mask = BlockFace.rasterize("ab", 20.0).unwrap();
        assert_eq!(mask.width, 24);
        assert_eq!(mask.height, 14);
        assert_eq!(mask.origin_y, -14);
        assert_eq!(mask.get(0, 0), 1.0);
        // gap between the two blocks
        assert_eq!(mask.get(11, 0), 0.0);
    }

    #[test]
    fn test_empty_mask() {
        assert!(GlyphMask::empty().is_empty());
    }
}
