//! # Watermark Rendering
//!
//! - [`config`]: validated per-run parameters
//! - [`layout`]: canvas geometry and the staggered tile grid
//! - [`render`]: paints the tiles and crops back to the source size

pub mod config;
pub mod layout;
pub mod render;

pub use config::{Rgb, WatermarkConfig};
pub use render::Renderer;
