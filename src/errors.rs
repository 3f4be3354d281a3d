// ABOUTME: Error types for the slideforge application
// ABOUTME: Provides structured error handling for generation, editing, storage and export

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch remote resource: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("{what} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("No presentation found in storage")]
    NoPresentation,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Failed to create presentation: {0}")]
    GenerationFailed(String),

    #[error("Headless browser error: {message}")]
    BrowserError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

/// `headless_chrome` reports failures as `anyhow::Error`.
impl From<anyhow::Error> for ForgeError {
    fn from(err: anyhow::Error) -> Self {
        ForgeError::BrowserError {
            message: format!("{:#}", err),
            source: Some(err.into()),
        }
    }
}

impl From<zip::result::ZipError> for ForgeError {
    fn from(err: zip::result::ZipError) -> Self {
        ForgeError::ExportFailed(format!("ZIP operation failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
