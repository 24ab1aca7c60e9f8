//! Font discovery with system fallbacks.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::{FontHandle, TtfFace};
use crate::error::{Result, WatermarkError};

/// Fonts tried, in order, when the preferred font cannot be loaded.
pub const DEFAULT_SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Windows/Fonts/arial.ttf",
    "/Windows/Fonts/Arial.ttf",
    "/usr/share/fonts/TTF/arial.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

/// Loads the watermark font, falling back to well-known system fonts.
#[derive(Debug, Clone)]
pub struct FontLoader {
    system_font_paths: Vec<PathBuf>,
}

impl Default for FontLoader {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_FONT_PATHS.iter().map(PathBuf::from).collect())
    }
}

impl FontLoader {
    pub fn new(system_font_paths: Vec<PathBuf>) -> Self {
        Self { system_font_paths }
    }

    pub fn system_font_paths(&self) -> &[PathBuf] {
        &self.system_font_paths
    }

    /// Load `preferred` if given and usable, otherwise the first usable
    /// fallback font.
    pub fn load(&self, preferred: Option<&Path>) -> Result<FontHandle> {
        if let Some(path) = preferred {
            match TtfFace::from_file(path) {
                Ok(face) => {
                    debug!(font = %path.display(), "loaded font");
                    return Ok(FontHandle::new(face));
                }
                Err(e) => debug!(font = %path.display(), error = %e, "preferred font unusable"),
            }
        }

        for path in self.available_system_fonts() {
            match TtfFace::from_file(path) {
                Ok(face) => {
                    debug!(font = %path.display(), "loaded fallback font");
                    return Ok(FontHandle::new(face));
                }
                Err(e) => debug!(font = %path.display(), error = %e, "fallback font unusable"),
            }
        }

        let tried = preferred
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string());
        Err(WatermarkError::FontLoad(format!(
            "no suitable font found. Tried: {} and {} system font paths",
            tried,
            self.system_font_paths.len()
        )))
    }

    /// Fallback paths that exist on this machine.
    pub fn available_system_fonts(&self) -> Vec<&Path> {
        self.system_font_paths
            .iter()
            .map(PathBuf::as_path)
            .filter(|p| p.exists())
            .collect()
    }
}
