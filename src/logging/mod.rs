//! Logging and observability
//!
//! This module provides structured logging with:
//! - Human-readable console output on stderr
//! - JSON-formatted local log files with rotation
//! - `RUST_LOG` overrides through `EnvFilter`
//!
//! The macros below give export runs a uniform event shape.
//!
//! # Example
//!
//! ```no_run
//! use folio::logging::init_logging;
//! use folio::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export run
///
/// # Example
///
/// ```no_run
/// use folio::log_export_start;
/// use folio::domain::RunId;
///
/// let run_id = RunId::generate();
/// log_export_start!(&run_id, 12, "markdown");
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($run_id:expr, $total:expr, $format:expr) => {
        tracing::info!(
            run_id = %$run_id,
            total = $total,
            format = %$format,
            "Starting export"
        );
    };
}

/// Log the completion of an export run
///
/// # Example
///
/// ```no_run
/// use folio::log_export_complete;
/// use folio::domain::RunId;
/// use std::time::Duration;
///
/// let run_id = RunId::generate();
/// log_export_complete!(&run_id, 10, 2, 0, Duration::from_secs(4));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($run_id:expr, $succeeded:expr, $failed:expr, $skipped:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            succeeded = $succeeded,
            failed = $failed,
            skipped = $skipped,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log a per-item failure
///
/// # Example
///
/// ```no_run
/// use folio::log_item_failure;
///
/// log_item_failure!("guide-7", "serialization", "pdf output does not support this content");
/// ```
#[macro_export]
macro_rules! log_item_failure {
    ($item_id:expr, $stage:expr, $reason:expr) => {
        tracing::warn!(
            item_id = %$item_id,
            stage = %$stage,
            reason = %$reason,
            "Item export failed"
        );
    };
}
