//! Export orchestration
//!
//! This module provides the export pipeline for Folio, including:
//! - Run coordination over a bounded worker pool
//! - Progress aggregation over a `watch` channel
//! - Output directory assembly and the run manifest
//! - Results and reporting

pub mod assembler;
pub mod coordinator;
pub mod manifest;
pub mod progress;
pub mod request;
pub mod summary;

pub use assembler::FilePlan;
pub use coordinator::ExportCoordinator;
pub use manifest::{ItemStatus, Manifest, ManifestEntry};
pub use progress::{BulkExportProgress, ProgressTracker, RunState};
pub use request::{CancelPolicy, ExportRequest, ExportSettings};
pub use summary::{BulkExportResult, ExportError, ExportStage, ExportedFile};
