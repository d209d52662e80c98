//! Domain error types
//!
//! Folio separates errors that end a whole run ([`FatalRunError`]) from errors
//! that only affect one item ([`ProcessingError`], [`SerializationError`],
//! [`WriteError`]). Per-item errors are caught at the worker boundary and
//! recorded; they never surface as `Err` from the coordinator.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main Folio error type
///
/// This is the primary error type used throughout the library for operations
/// outside the per-item worker boundary.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A run could not be completed
    #[error("Export failed: {0}")]
    Fatal(#[from] FatalRunError),

    /// Library snapshot could not be loaded
    #[error("Library error: {0}")]
    Library(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors that abort an entire export run
///
/// A fatal error is returned before any output is promised to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FatalRunError {
    /// The request itself is unusable (e.g. a concurrency limit of zero)
    #[error("Invalid export request: {0}")]
    InvalidRequest(String),

    /// The filter context failed validation
    #[error("Invalid filter context: {0}")]
    InvalidFilter(String),

    /// The output directory could not be created
    #[error("Failed to create output directory {path}: {reason}")]
    OutputDirectory { path: PathBuf, reason: String },

    /// The manifest could not be written after all items settled
    #[error("Failed to write manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },
}

/// Failure raised by a content processor for a single item
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProcessingError {
    /// The item's content could not be located or read
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    /// The content exists but has nothing to export
    #[error("Content is empty")]
    EmptyContent,

    /// The processor did not finish within the per-item timeout
    #[error("Processing timed out after {0:?}")]
    Timeout(Duration),

    /// The guide scored below the configured quality threshold
    #[error("Quality score {score:.1}% is below the required {required:.1}%")]
    BelowQualityThreshold { score: f64, required: f64 },

    /// Any other processor-defined failure
    #[error("Processing failed: {0}")]
    Failed(String),
}

/// Failure converting processed content into bytes for a format
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SerializationError {
    /// The content cannot be represented in the requested format
    #[error("{format} output does not support this content: {reason}")]
    UnsupportedContent { format: String, reason: String },

    /// The encoder itself failed
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Failure writing an item's file into the output directory
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WriteError {
    /// No file name was planned for the item
    #[error("No output file planned for item {0}")]
    Unplanned(String),

    /// The file could not be written
    #[error("Failed to write {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for FolioError {
    fn from(err: std::io::Error) -> Self {
        FolioError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FolioError {
    fn from(err: toml::de::Error) -> Self {
        FolioError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folio_error_display() {
        let err = FolioError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_fatal_error_conversion() {
        let fatal = FatalRunError::InvalidFilter("bad range".to_string());
        let err: FolioError = fatal.clone().into();
        assert!(matches!(err, FolioError::Fatal(ref f) if *f == fatal));
        assert_eq!(
            err.to_string(),
            "Export failed: Invalid filter context: bad range"
        );
    }

    #[test]
    fn test_output_directory_error_mentions_path() {
        let err = FatalRunError::OutputDirectory {
            path: PathBuf::from("/nowhere/out"),
            reason: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nowhere/out"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_processing_timeout_display() {
        let err = ProcessingError::Timeout(Duration::from_secs(3));
        assert_eq!(err.to_string(), "Processing timed out after 3s");
    }

    #[test]
    fn test_quality_threshold_display() {
        let err = ProcessingError::BelowQualityThreshold {
            score: 80.0,
            required: 95.0,
        };
        assert_eq!(
            err.to_string(),
            "Quality score 80.0% is below the required 95.0%"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: FolioError = io_err.into();
        assert!(matches!(err, FolioError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: FolioError = json_err.into();
        assert!(matches!(err, FolioError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: FolioError = toml_err.into();
        assert!(matches!(err, FolioError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &FolioError::Validation("x".to_string());
        let _: &dyn std::error::Error = &ProcessingError::EmptyContent;
        let _: &dyn std::error::Error = &WriteError::Unplanned("id".to_string());
    }
}
