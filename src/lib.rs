//! # id-watermark - Diagonal Text Watermarks
//!
//! id-watermark burns a repeating `"{company} - {date}"` pattern across
//! ID-card scans and other sensitive images, one file at a time or a whole
//! directory in parallel. It provides:
//!
//! - **Renderer**: oversized square canvas, staggered text rows, centered crop
//! - **Batch processing**: fixed worker pool with per-file failure isolation
//! - **Fonts**: TTF/OTF via ab_glyph with system font fallbacks
//! - **Settings**: YAML file, `WATERMARK_*` environment and CLI overrides
//!
//! ## Quick Start
//!
//! ```no_run
//! use id_watermark::{BatchOptions, BatchProcessor, FontLoader, WatermarkConfig};
//! use std::path::Path;
//!
//! let font = FontLoader::default().load(Some(Path::new("./DejaVuSans.ttf")))?;
//! let config = WatermarkConfig::new("ACME Corp", font).with_opacity(60);
//!
//! let batch = BatchProcessor::new(config, BatchOptions::new(8, true))?;
//! let result = batch.process_directory(Path::new("./scans"), Path::new("./marked"))?;
//! println!("{} of {} watermarked", result.success_count, result.total_count);
//!
//! # Ok::<(), id_watermark::WatermarkError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`watermark`] | Config, tile layout, renderer |
//! | [`batch`] | Directory discovery and worker pool |
//! | [`pipeline`] | Read, render, write one file |
//! | [`codec`] | JPEG/PNG decode and encode |
//! | [`font`] | Typeface trait, TTF faces, font fallback |
//! | [`settings`] | Settings file and overrides |
//! | [`logging`] | Log subscriber for the CLI |
//! | [`error`] | Error types |

pub mod batch;
pub mod codec;
pub mod error;
pub mod font;
pub mod logging;
pub mod pipeline;
pub mod settings;
pub mod watermark;

// Re-exports for convenience
pub use batch::{BatchError, BatchOptions, BatchProcessor, BatchResult};
pub use error::WatermarkError;
pub use font::{FontHandle, FontLoader, TtfFace, Typeface};
pub use settings::Settings;
pub use watermark::{Renderer, Rgb, WatermarkConfig};
