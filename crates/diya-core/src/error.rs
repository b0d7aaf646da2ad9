//! Error types for Diya

use thiserror::Error;

/// The main error type for Diya operations
#[derive(Debug, Error)]
pub enum DiyaError {
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// Result type alias for Diya operations
pub type Result<T> = std::result::Result<T, DiyaError>;

impl From<toml::de::Error> for DiyaError {
    fn from(err: toml::de::Error) -> Self {
        DiyaError::TomlParseError(err.to_string())
    }
}
