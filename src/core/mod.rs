//! Core business logic for Folio.
//!
//! This module contains the export pipeline and everything it is built from.
//!
//! # Modules
//!
//! - [`export`] - Run coordination, progress, output assembly and results
//! - [`filter`] - Deterministic item selection
//! - [`format`] - Guide parsing and the per-format serializers
//! - [`processor`] - Content processor gateway
//! - [`quality`] - Guide quality audit
//! - [`verification`] - Checksum verification of written files
//!
//! # Export Workflow
//!
//! 1. **Select**: Filter and order the library snapshot
//! 2. **Prepare**: Create the run directory and plan every file name
//! 3. **Export**: Process, audit, serialize and write each item on a bounded worker pool
//! 4. **Verify** (optional): Re-read written files and compare checksums
//! 5. **Report**: Write `manifest.json` and return the run result
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::config::load_config;
//! use folio::core::export::{ExportCoordinator, ExportRequest, ExportSettings};
//! use folio::core::processor::SourceTextProcessor;
//! use folio::domain::Library;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("folio.toml")?;
//! let library = Library::from_json_file(&config.library.path)?;
//!
//! // Flip to true to cancel the run
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExportCoordinator::new(
//!     SourceTextProcessor::new(config.library.resolved_content_root()),
//!     ExportSettings::from_config(&config.export),
//! );
//!
//! let request = ExportRequest::new(library.items, config.export.format)
//!     .with_filter(config.filter.clone())
//!     .with_shutdown(shutdown_rx);
//! let result = coordinator.execute_export(request).await?;
//!
//! println!("Exported: {}", result.succeeded_count);
//! println!("Failed: {}", result.failed_count);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod filter;
pub mod format;
pub mod processor;
pub mod quality;
pub mod verification;
