//! # Watermark Configuration
//!
//! Immutable per-run parameters shared by the renderer and every batch worker.
//!
//! | Field | Valid range | Default |
//! |-------|-------------|---------|
//! | `company_name` | non-blank | required |
//! | `font_size` | 10..=200 | 40 |
//! | `opacity` | 0..=255 (type) | 40 |
//! | `text_spacing` | 5..=200 | 30 |
//! | `line_spacing` | 5..=200 | 30 |
//! | `output_quality` | 1..=100 | 95 |
//! | `color` | any RGB | gray 150 |

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{Result, WatermarkError};
use crate::font::FontHandle;

pub const FONT_SIZE_RANGE: RangeInclusive<f32> = 10.0..=200.0;
pub const SPACING_RANGE: RangeInclusive<f32> = 5.0..=200.0;
pub const QUALITY_RANGE: RangeInclusive<u8> = 1..=100;

pub const DEFAULT_FONT_SIZE: f32 = 40.0;
pub const DEFAULT_OPACITY: u8 = 40;
pub const DEFAULT_SPACING: f32 = 30.0;
pub const DEFAULT_QUALITY: u8 = 95;

/// Watermark text color. Alpha comes from the configured opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const GRAY: Self = Self::new(150, 150, 150);
}

impl Default for Rgb {
    fn default() -> Self {
        Self::GRAY
    }
}

/// Parameters for one watermarking run.
///
/// Must pass [`validate`](Self::validate) before reaching the renderer or the
/// batch coordinator; both constructors call it.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    pub company_name: String,
    pub timestamp: DateTime<Local>,
    /// Text size in length units (1/72 inch)
    pub font_size: f32,
    /// Alpha of the watermark text
    pub opacity: u8,
    pub font: FontHandle,
    /// Horizontal gap between repeats, in length units
    pub text_spacing: f32,
    /// Vertical gap between rows, in length units
    pub line_spacing: f32,
    /// JPEG quality; ignored for PNG output
    pub output_quality: u8,
    pub color: Rgb,
}

impl WatermarkConfig {
    /// Config with default styling and the current time as timestamp.
    pub fn new(company_name: impl Into<String>, font: FontHandle) -> Self {
        Self {
            company_name: company_name.into(),
            timestamp: Local::now(),
            font_size: DEFAULT_FONT_SIZE,
            opacity: DEFAULT_OPACITY,
            font,
            text_spacing: DEFAULT_SPACING,
            line_spacing: DEFAULT_SPACING,
            output_quality: DEFAULT_QUALITY,
            color: Rgb::GRAY,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_text_spacing(mut self, spacing: f32) -> Self {
        self.text_spacing = spacing;
        self
    }

    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }

    pub fn with_output_quality(mut self, quality: u8) -> Self {
        self.output_quality = quality;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Check every range. The font is always present by construction.
    pub fn validate(&self) -> Result<()> {
        if self.company_name.trim().is_empty() {
            return Err(invalid("company name cannot be empty".to_string()));
        }
        if !FONT_SIZE_RANGE.contains(&self.font_size) {
            return Err(invalid(format!(
                "font size must be between 10 and 200, got: {:.1}",
                self.font_size
            )));
        }
        if !SPACING_RANGE.contains(&self.text_spacing) {
            return Err(invalid(format!(
                "text spacing must be between 5 and 200, got: {:.1}",
                self.text_spacing
            )));
        }
        if !SPACING_RANGE.contains(&self.line_spacing) {
            return Err(invalid(format!(
                "line spacing must be between 5 and 200, got: {:.1}",
                self.line_spacing
            )));
        }
        if !QUALITY_RANGE.contains(&self.output_quality) {
            return Err(invalid(format!(
                "quality must be between 1 and 100, got: {}",
                self.output_quality
            )));
        }
        Ok(())
    }

    /// The string tiled across the image, e.g. `ACME Corp - 2024-03-15`.
    pub fn watermark_text(&self) -> String {
        format!(
            "{} - {}",
            self.company_name,
            self.timestamp.format("%Y-%m-%d")
        )
    }
}

fn invalid(msg: String) -> WatermarkError {
    WatermarkError::ConfigValidation(msg)
}
