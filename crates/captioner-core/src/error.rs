//! Error types for the captioning pipeline.
//!
//! Errors are organized by stage so the HTTP layer can map each one to a
//! status code and the CLI can print an actionable message.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for captioner operations.
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Upload carried no bytes
    #[error("Empty upload: {name}")]
    EmptyUpload { name: String },

    /// Upload exceeds the size limit
    #[error("File too large: {name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Payload is not a recognized image format
    #[error("Unsupported format for {name}: {format}")]
    UnsupportedFormat { name: String, format: String },

    /// Image decoding failed
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {name} after {timeout_ms}ms")]
    Timeout {
        name: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Model artifact could not be loaded
    #[error("Model error for {path}: {message}")]
    Model { path: PathBuf, message: String },

    /// Vocabulary artifact is missing, malformed or inconsistent
    #[error("Vocabulary error: {message}")]
    Vocabulary { message: String },

    /// Feature extraction failed
    #[error("Feature extraction failed: {message}")]
    Extract { message: String },

    /// Sequence prediction failed
    #[error("Sequence prediction failed: {message}")]
    Predict { message: String },
}

/// Convenience type alias for captioner results.
pub type Result<T> = std::result::Result<T, CaptionError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
