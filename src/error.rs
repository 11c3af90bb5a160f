//! Error types for the data-markdown library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Convert error: {0}")]
    Convert(#[from] ConvertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in page configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    InvalidToml(String),

    #[error("Invalid marker attribute: {0:?}")]
    InvalidMarker(String),
}

/// Errors that occur while obtaining the converter.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Converter resource not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read converter resource {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid converter profile {path}: {message}")]
    InvalidProfile { path: String, message: String },

    #[error("Converter is still loading")]
    InProgress,

    #[error("No document available")]
    NoDocument,
}

/// Errors raised by a converter for a single piece of input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("Input of {len} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },

    #[error("Conversion failed: {0}")]
    Failed(String),
}
