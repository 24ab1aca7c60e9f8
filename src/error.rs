//! # Error Types
//!
//! This module defines the error type used throughout the id-watermark library.
//!
//! Errors fall on two sides of the file boundary:
//!
//! - **Run-level**: [`ConfigValidation`](WatermarkError::ConfigValidation),
//!   [`ConfigFile`](WatermarkError::ConfigFile), [`FontLoad`](WatermarkError::FontLoad),
//!   [`Directory`](WatermarkError::Directory) and [`WorkerPool`](WatermarkError::WorkerPool)
//!   abort before any image is touched.
//! - **Per-file**: [`Decode`](WatermarkError::Decode), [`Encode`](WatermarkError::Encode),
//!   [`Render`](WatermarkError::Render) and [`Io`](WatermarkError::Io) are recorded against
//!   a single file in batch mode and never stop the other workers.

use thiserror::Error;

/// Main error type for id-watermark operations
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// A watermark parameter is out of range or missing
    #[error("Invalid config: {0}")]
    ConfigValidation(String),

    /// Settings file could not be read, parsed or written
    #[error("Config file error: {0}")]
    ConfigFile(String),

    /// No usable font was found
    #[error("Font error: {0}")]
    FontLoad(String),

    /// Input image could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Output image could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Watermark canvas could not be built
    #[error("Render error: {0}")]
    Render(String),

    /// Input directory could not be enumerated, or output directory could not be created
    #[error("Directory error: {0}")]
    Directory(String),

    /// Worker threads could not be started
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, WatermarkError>;
