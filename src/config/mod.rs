//! Configuration management for Folio.
//!
//! # Overview
//!
//! Folio uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FOLIO_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every section on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use folio::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("folio.toml")?;
//!
//! println!("Library: {}", config.library.path.display());
//! println!("Format: {}", config.export.format);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`LibraryConfig`] - Library snapshot and content root
//! - [`ExportConfig`] - Output directory, format, concurrency, timeouts
//! - `[filter]` - Default [`BulkExportFilterContext`](crate::domain::BulkExportFilterContext)
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [library]
//! path = "${HOME}/guides/library.json"
//!
//! [export]
//! output_dir = "exports"
//! format = "markdown"
//! concurrency = 3
//!
//! [filter]
//! tags_any = ["philosophy"]
//! sort = "title"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfig, FolioConfig, LibraryConfig, LoggingConfig, MAX_CONCURRENCY,
};
