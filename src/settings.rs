//! # Application Settings
//!
//! YAML settings file plus environment and command-line overrides.
//!
//! Precedence, lowest to highest:
//!
//! 1. Built-in defaults
//! 2. Settings file (explicit `--config`, or the first existing search path)
//! 3. `WATERMARK_*` environment variables
//! 4. Command-line flags the user actually passed
//!
//! ## Example
//!
//! ```yaml
//! font_path: ./DejaVuSans.ttf
//! font_size: 45.0
//! opacity: 60
//! text_spacing: 35.0
//! line_spacing: 35.0
//! quality: 90
//! log_level: info
//! watermark_color: { r: 150, g: 150, b: 150 }
//! default_workers: 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::batch::DEFAULT_WORKERS;
use crate::error::{Result, WatermarkError};
use crate::font::{DEFAULT_SYSTEM_FONT_PATHS, FontHandle, FontLoader};
use crate::watermark::config::{DEFAULT_FONT_SIZE, DEFAULT_OPACITY, DEFAULT_QUALITY, DEFAULT_SPACING};
use crate::watermark::{Rgb, WatermarkConfig};

/// Prefix of environment overrides, e.g. `WATERMARK_FONT_SIZE`.
pub const ENV_PREFIX: &str = "WATERMARK_";

/// Settings file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "id-watermark.yaml";

/// Persisted defaults for watermarking runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub font_path: PathBuf,
    pub font_size: f32,
    pub opacity: u8,
    pub text_spacing: f32,
    pub line_spacing: f32,
    pub quality: u8,
    pub log_level: String,
    pub watermark_color: Rgb,
    pub system_font_paths: Vec<PathBuf>,
    pub default_workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("./DejaVuSans.ttf"),
            font_size: DEFAULT_FONT_SIZE,
            opacity: DEFAULT_OPACITY,
            text_spacing: DEFAULT_SPACING,
            line_spacing: DEFAULT_SPACING,
            quality: DEFAULT_QUALITY,
            log_level: "info".to_string(),
            watermark_color: Rgb::GRAY,
            system_font_paths: DEFAULT_SYSTEM_FONT_PATHS.iter().map(PathBuf::from).collect(),
            default_workers: DEFAULT_WORKERS,
        }
    }
}

/// Values supplied on the command line. `None` keeps the settings value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub font_path: Option<PathBuf>,
    pub font_size: Option<f32>,
    pub opacity: Option<u8>,
    pub text_spacing: Option<f32>,
    pub line_spacing: Option<f32>,
    pub quality: Option<u8>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Settings written by `config generate`.
    pub fn example() -> Self {
        Self {
            font_size: 45.0,
            opacity: 60,
            text_spacing: 35.0,
            line_spacing: 35.0,
            quality: 90,
            ..Self::default()
        }
    }

    /// Load settings from `explicit`, or from the first search path that
    /// exists, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match search_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            WatermarkError::ConfigFile(format!("reading {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&yaml)
            .map_err(|e| WatermarkError::ConfigFile(format!("{}: {}", path.display(), e)))
    }

    /// Parse YAML; missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| WatermarkError::ConfigFile(e.to_string()))
    }

    /// Write YAML to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                WatermarkError::ConfigFile(format!(
                    "creating config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        std::fs::write(path, self.to_yaml()?).map_err(|e| {
            WatermarkError::ConfigFile(format!("writing {}: {}", path.display(), e))
        })
    }

    /// Apply `WATERMARK_*` variables read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = var("FONT_PATH") {
            self.font_path = PathBuf::from(v);
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.log_level = v;
        }
        parse_env(&var, "FONT_SIZE", &mut self.font_size)?;
        parse_env(&var, "OPACITY", &mut self.opacity)?;
        parse_env(&var, "TEXT_SPACING", &mut self.text_spacing)?;
        parse_env(&var, "LINE_SPACING", &mut self.line_spacing)?;
        parse_env(&var, "QUALITY", &mut self.quality)?;
        parse_env(&var, "DEFAULT_WORKERS", &mut self.default_workers)?;
        parse_env(&var, "WATERMARK_COLOR_R", &mut self.watermark_color.r)?;
        parse_env(&var, "WATERMARK_COLOR_G", &mut self.watermark_color.g)?;
        parse_env(&var, "WATERMARK_COLOR_B", &mut self.watermark_color.b)?;
        Ok(())
    }

    /// Apply command-line values.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(path) = &overrides.font_path {
            self.font_path = path.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
        self.font_size = overrides.font_size.unwrap_or(self.font_size);
        self.opacity = overrides.opacity.unwrap_or(self.opacity);
        self.text_spacing = overrides.text_spacing.unwrap_or(self.text_spacing);
        self.line_spacing = overrides.line_spacing.unwrap_or(self.line_spacing);
        self.quality = overrides.quality.unwrap_or(self.quality);
    }

    pub fn font_loader(&self) -> FontLoader {
        FontLoader::new(self.system_font_paths.clone())
    }

    /// Load the configured font, falling back to system fonts.
    pub fn load_font(&self) -> Result<FontHandle> {
        self.font_loader().load(Some(&self.font_path))
    }

    /// Validated watermark parameters for `company_name`.
    pub fn watermark_config(&self, company_name: &str, font: FontHandle) -> Result<WatermarkConfig> {
        let config = WatermarkConfig::new(company_name, font)
            .with_font_size(self.font_size)
            .with_opacity(self.opacity)
            .with_text_spacing(self.text_spacing)
            .with_line_spacing(self.line_spacing)
            .with_output_quality(self.quality)
            .with_color(self.watermark_color);
        config.validate()?;
        Ok(config)
    }
}

fn parse_env<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) -> Result<()>
where
    T::Err: std::fmt::Display,
{
    if let Some(raw) = var(name) {
        *target = raw.trim().parse().map_err(|e| {
            WatermarkError::ConfigFile(format!("{}{}={:?}: {}", ENV_PREFIX, name, raw, e))
        })?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Where `config generate` writes when no file name is given.
pub fn default_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".config").join("id-watermark").join("config.yaml"),
        None => PathBuf::from(".").join(CONFIG_FILE_NAME),
    }
}

/// Candidate settings files, in lookup order.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".").join(CONFIG_FILE_NAME)];
    if let Some(home) = home_dir() {
        paths.push(home.join(".config").join("id-watermark").join("config.yaml"));
    }
    paths.push(PathBuf::from("/etc/id-watermark").join(CONFIG_FILE_NAME));
    paths
}
