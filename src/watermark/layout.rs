//! # Canvas Geometry and Tile Layout
//!
//! All layout math runs in length units (1/72 inch) on a bottom-up y axis;
//! pixels appear only when the canvas is sized and when a tile is stamped.
//!
//! ## Canvas
//!
//! ```text
//!   ┌──────────── diagonal ────────────┐
//!   │                                  │
//!   │       origin ┌──── w ────┐       │
//!   │              │  source   │ h     │
//!   │              └───────────┘       │
//!   │                                  │
//!   └──────────────────────────────────┘
//! ```
//!
//! The square side is the source diagonal, so straight rows of text laid out
//! across it always cover the centered crop whatever the aspect ratio.
//! The side is rounded to pixels exactly once, and the same integer origin
//! is used to paste the source and to crop the result.
//!
//! ## Tiles
//!
//! Rows start at `-2 * diagonal` and advance by `font_size + line_spacing`
//! while below `2 * diagonal`. Row `n` (1-based) starts at
//! `-n * 1.5 * text_width` and repeats every `text_width + text_spacing`
//! while left of the canvas edge. Tiles that cannot reach the canvas are
//! skipped without changing the positions of the ones that can.

use crate::error::{Result, WatermarkError};

/// Reference resolution used to turn pixels into length units.
pub const REFERENCE_DPI: f64 = 96.0;
/// Length units per inch (typographic points).
pub const UNITS_PER_INCH: f64 = 72.0;
/// Pixels per length unit at the reference resolution.
pub const PX_PER_UNIT: f64 = REFERENCE_DPI / UNITS_PER_INCH;

/// Largest canvas side accepted, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 32_768;

#[inline]
pub fn px_to_units(px: f64) -> f64 {
    px / PX_PER_UNIT
}

#[inline]
pub fn units_to_px(units: f64) -> f64 {
    units * PX_PER_UNIT
}

/// Size and placement of the square working canvas for one source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// Source size in pixels
    pub image_width: u32,
    pub image_height: u32,
    /// Source size in length units
    pub width: f64,
    pub height: f64,
    /// Diagonal of the source in length units
    pub diagonal: f64,
    /// Side of the square canvas in pixels
    pub side_px: u32,
    /// Top-left of the source inside the canvas, in pixels
    pub origin_x: u32,
    pub origin_y: u32,
}

impl CanvasGeometry {
    pub fn new(image_width: u32, image_height: u32) -> Result<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(WatermarkError::Render(format!(
                "cannot watermark an empty image ({}x{})",
                image_width, image_height
            )));
        }

        let width = px_to_units(image_width as f64);
        let height = px_to_units(image_height as f64);
        let diagonal = (width * width + height * height).sqrt();

        let side = units_to_px(diagonal).round();
        if side > MAX_CANVAS_SIDE as f64 {
            return Err(WatermarkError::Render(format!(
                "image {}x{} needs a {}px canvas (max {})",
                image_width, image_height, side, MAX_CANVAS_SIDE
            )));
        }
        let side_px = (side as u32).max(image_width).max(image_height);

        Ok(Self {
            image_width,
            image_height,
            width,
            height,
            diagonal,
            side_px,
            origin_x: (side_px - image_width) / 2,
            origin_y: (side_px - image_height) / 2,
        })
    }

    /// Convert a bottom-up y in length units to a top-down pixel row.
    #[inline]
    pub fn flip_y(&self, y: f64) -> i64 {
        self.side_px as i64 - units_to_px(y).round() as i64
    }
}

/// One placement of the watermark string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// 1-based row number
    pub row: u32,
    /// Pen start, length units
    pub x: f64,
    /// Baseline, length units, bottom-up
    pub y: f64,
}

/// Repeating row/column layout of the watermark string over the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    diagonal: f64,
    text_width: f64,
    row_stride: f64,
    col_stride: f64,
    /// How far past the canvas edge a tile may start and still show ink
    margin: f64,
}

impl TileLayout {
    pub fn new(
        diagonal: f64,
        font_size: f64,
        line_spacing: f64,
        text_width: f64,
        text_spacing: f64,
    ) -> Result<Self> {
        let row_stride = font_size + line_spacing;
        let col_stride = text_width + text_spacing;
        for (name, stride) in [("row", row_stride), ("column", col_stride)] {
            if !stride.is_finite() || stride <= 0.0 {
                return Err(WatermarkError::Render(format!(
                    "degenerate {} stride: {}",
                    name, stride
                )));
            }
        }
        if !diagonal.is_finite() || !text_width.is_finite() || text_width < 0.0 {
            return Err(WatermarkError::Render(format!(
                "degenerate layout: diagonal {}, text width {}",
                diagonal, text_width
            )));
        }

        Ok(Self {
            diagonal,
            text_width,
            row_stride,
            col_stride,
            margin: 2.0 * font_size,
        })
    }

    pub fn row_stride(&self) -> f64 {
        self.row_stride
    }

    pub fn col_stride(&self) -> f64 {
        self.col_stride
    }

    /// Number of rows enumerated from `-2d` up to (not including) `2d`.
    pub fn row_count(&self) -> u64 {
        (4.0 * self.diagonal / self.row_stride).ceil().max(0.0) as u64
    }

    /// Every tile that can put ink on the canvas, row by row, left to right.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        let start = -2.0 * self.diagonal;
        (0..self.row_count())
            .map(move |i| ((i + 1) as u32, start + i as f64 * self.row_stride))
            .filter(move |&(_, y)| y + self.margin > 0.0 && y - self.margin < self.diagonal)
            .flat_map(move |(row, y)| self.row_tiles(row, y))
    }

    fn row_tiles(&self, row: u32, y: f64) -> impl Iterator<Item = Tile> + '_ {
        let x0 = -(row as f64) * 1.5 * self.text_width;
        // first column whose ink can reach x = 0
        let first = ((-(self.text_width + self.margin) - x0) / self.col_stride)
            .ceil()
            .max(0.0) as u64;
        // columns start strictly left of the canvas edge
        let end = ((self.diagonal - x0) / self.col_stride).ceil().max(0.0) as u64;

        (first..end).map(move |k| Tile {
            row,
            x: x0 + k as f64 * self.col_stride,
            y,
        })
    }
}
