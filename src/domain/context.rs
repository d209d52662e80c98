//! Error context extension trait
//!
//! Provides `.context()` / `.with_context()` for `Result<T, E>` where `E`
//! converts into [`FolioError`], so library code can attach context without
//! falling back to `anyhow`.
//!
//! # Examples
//!
//! ```rust
//! use folio::domain::Result;
//! use folio::domain::context::ResultExt;
//!
//! fn read_library(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read library snapshot {path}"))
//! }
//! ```

use crate::domain::errors::FolioError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error using a closure (evaluated only on error)
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<FolioError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| {
            let base_error = e.into();
            FolioError::Other(format!("{context}: {base_error}"))
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let base_error = e.into();
            let context = f();
            FolioError::Other(format!("{context}: {base_error}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FatalRunError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_context_with_folio_error() {
        let result: Result<()> = Err(FolioError::Configuration("Invalid config".to_string()));
        let err_msg = result
            .context("Failed to load configuration")
            .unwrap_err()
            .to_string();

        assert!(err_msg.contains("Failed to load configuration"));
        assert!(err_msg.contains("Invalid config"));
    }

    #[test]
    fn test_with_context_is_lazy() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let result: Result<i32> = Ok(42);
        let with_context = result.with_context(|| {
            called_clone.store(true, Ordering::SeqCst);
            "Expensive context"
        });

        assert!(with_context.is_ok());
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_context_with_fatal_error() {
        let result: std::result::Result<(), FatalRunError> =
            Err(FatalRunError::InvalidRequest("concurrency must be >= 1".to_string()));
        let err_msg = result
            .context("Starting export run")
            .unwrap_err()
            .to_string();

        assert!(err_msg.starts_with("Starting export run: "));
        assert!(err_msg.contains("concurrency must be >= 1"));
    }

    #[test]
    fn test_context_chaining() {
        let result: Result<()> = Err(FolioError::Library("no items array".to_string()));
        let err_msg = result
            .context("Parsing library.json")
            .context("Loading library snapshot")
            .unwrap_err()
            .to_string();

        assert!(err_msg.contains("Loading library snapshot"));
        assert!(err_msg.contains("Parsing library.json"));
        assert!(err_msg.contains("no items array"));
    }

    #[test]
    fn test_io_error_with_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let result: std::result::Result<(), std::io::Error> = Err(io_error);
        let err_msg = result
            .context("Failed to read configuration file 'folio.toml'")
            .unwrap_err()
            .to_string();

        assert!(err_msg.contains("Failed to read configuration file"));
        assert!(err_msg.contains("File not found"));
    }
}
