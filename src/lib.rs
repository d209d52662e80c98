// Folio - Bulk library export
// Copyright (c) 2025 Folio Contributors
// Licensed under the MIT License

//! # Folio - Bulk library export
//!
//! Folio exports a personal library of study guides into a fresh directory
//! of per-item files plus a `manifest.json`, with live progress reporting,
//! cancellation and per-item fault tolerance.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Selecting** items from a library snapshot with a filter context
//! - **Processing** each item through a pluggable [`core::processor::ContentProcessor`]
//! - **Serializing** guides as text, Markdown, JSON, HTML or PDF
//! - **Assembling** a collision-free output directory and manifest
//! - **Verifying** written files against their SHA-256 checksums
//!
//! ## Architecture
//!
//! Folio follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (export, filter, format, quality, verification)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folio::core::export::{ExportCoordinator, ExportRequest, ExportSettings};
//! use folio::core::format::ExportFormat;
//! use folio::core::processor::SourceTextProcessor;
//! use folio::domain::Library;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let library = Library::from_json_file("library.json")?;
//!
//!     let coordinator = ExportCoordinator::new(
//!         SourceTextProcessor::new("."),
//!         ExportSettings::new("exports"),
//!     );
//!
//!     let result = coordinator
//!         .execute_export(ExportRequest::new(library.items, ExportFormat::Html))
//!         .await?;
//!
//!     println!("Exported {} guides to {}", result.succeeded_count, result.output_dir.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Progress and Cancellation
//!
//! A run publishes [`core::export::BulkExportProgress`] snapshots over a
//! `tokio::sync::watch` channel and stops starting new items once its
//! cancellation receiver observes `true`:
//!
//! ```rust,no_run
//! use folio::core::export::{BulkExportProgress, ExportRequest};
//! use folio::core::format::ExportFormat;
//! use tokio::sync::watch;
//!
//! let (progress_tx, mut progress_rx) = watch::channel(BulkExportProgress::default());
//! let (cancel_tx, cancel_rx) = watch::channel(false);
//!
//! let request = ExportRequest::new(Vec::new(), ExportFormat::Markdown)
//!     .with_progress(progress_tx)
//!     .with_shutdown(cancel_rx);
//!
//! // Later, from anywhere:
//! let _ = cancel_tx.send(true);
//! ```
//!
//! ## Error Handling
//!
//! Folio uses the [`domain::FolioError`] type for run-level errors. Failures
//! of individual items never abort a run; they are reported per item in the
//! [`core::export::BulkExportResult`] and the manifest.
//!
//! ```rust,no_run
//! use folio::domain::FolioError;
//!
//! fn example() -> Result<(), FolioError> {
//!     let config = folio::config::load_config("folio.toml")?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
