//! Integration tests for run cancellation
//!
//! These tests verify that:
//! - No item starts once cancellation is observed
//! - In-flight items finish or are abandoned per the cancel policy
//! - Cancelled runs still leave a complete manifest behind

mod common;

use common::{file_names, item, library, ScriptedProcessor, CANCEL, CANCEL_AND_HANG};
use folio::core::export::{
    BulkExportProgress, CancelPolicy, ExportCoordinator, ExportRequest, ExportSettings,
    ItemStatus, Manifest, RunState,
};
use folio::core::format::ExportFormat;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

#[tokio::test]
async fn test_cancel_before_start_skips_everything() {
    let dir = TempDir::new().unwrap();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    cancel_tx.send(true).unwrap();

    let coordinator =
        ExportCoordinator::new(ScriptedProcessor::new(), ExportSettings::new(dir.path()));
    let request = ExportRequest::new(library(3), ExportFormat::Markdown).with_shutdown(cancel_rx);

    let result = coordinator.execute_export(request).await.unwrap();

    assert_eq!(result.state, RunState::Cancelled);
    assert!(result.cancelled);
    assert_eq!(result.succeeded_count, 0);
    assert_eq!(result.skipped_count, 3);
    assert_eq!(file_names(&result.output_dir), vec!["manifest.json"]);
}

#[tokio::test]
async fn test_cancel_finishes_in_flight_item() {
    let dir = TempDir::new().unwrap();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let (progress_tx, progress_rx) = watch::channel(BulkExportProgress::default());

    let mut items = library(5);
    items[0] = item("guide-1", "Letter 1", CANCEL);

    let coordinator = ExportCoordinator::new(
        ScriptedProcessor::cancelling(cancel_tx),
        ExportSettings::new(dir.path()).with_cancel_policy(CancelPolicy::FinishInFlight),
    );
    let request = ExportRequest::new(items, ExportFormat::Markdown)
        .with_concurrency(1)
        .with_shutdown(cancel_rx)
        .with_progress(progress_tx);

    let result = coordinator.execute_export(request).await.unwrap();

    assert_eq!(result.state, RunState::Cancelled);
    assert_eq!(result.succeeded_count, 1);
    assert_eq!(result.failed_count, 0);
    assert_eq!(result.skipped_count, 4);
    assert_eq!(
        file_names(&result.output_dir),
        vec!["Letter-1.md", "manifest.json"]
    );

    let manifest = Manifest::read_from_dir(&result.output_dir).unwrap();
    assert_eq!(manifest.state, RunState::Cancelled);
    assert!(manifest.cancelled);
    assert_eq!(manifest.entries[0].status, ItemStatus::Succeeded);
    assert!(manifest.entries[1..]
        .iter()
        .all(|e| e.status == ItemStatus::Skipped));

    let progress = progress_rx.borrow().clone();
    assert!(progress.is_cancelled);
    assert_eq!(progress.state, RunState::Cancelled);
    assert_eq!(progress.completed_count, 1);
    assert_eq!(progress.total_count, 5);
}

#[tokio::test]
async fn test_abandon_policy_discards_in_flight_item() {
    let dir = TempDir::new().unwrap();
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let mut items = library(3);
    items[0] = item("guide-1", "Letter 1", CANCEL_AND_HANG);

    let coordinator = ExportCoordinator::new(
        ScriptedProcessor::cancelling(cancel_tx),
        ExportSettings::new(dir.path()).with_cancel_policy(CancelPolicy::AbandonInFlight),
    );
    let request = ExportRequest::new(items, ExportFormat::Html)
        .with_concurrency(1)
        .with_shutdown(cancel_rx);

    let result = tokio::time::timeout(Duration::from_secs(10), coordinator.execute_export(request))
        .await
        .expect("abandoned worker should not be awaited")
        .unwrap();

    assert_eq!(result.state, RunState::Cancelled);
    assert_eq!(result.succeeded_count, 0);
    assert_eq!(result.failed_count, 0);
    assert_eq!(result.skipped_count, 3);
    assert_eq!(file_names(&result.output_dir), vec!["manifest.json"]);

    let manifest = Manifest::read_from_dir(&result.output_dir).unwrap();
    assert_eq!(
        manifest.entries[0].reason.as_deref(),
        Some("abandoned on cancellation")
    );
    assert_eq!(
        manifest.entries[1].reason.as_deref(),
        Some("cancelled before start")
    );
}

#[tokio::test]
async fn test_dropped_cancel_sender_never_cancels() {
    let dir = TempDir::new().unwrap();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    drop(cancel_tx);

    let coordinator =
        ExportCoordinator::new(ScriptedProcessor::new(), ExportSettings::new(dir.path()));
    let request = ExportRequest::new(library(4), ExportFormat::PlainText)
        .with_concurrency(2)
        .with_shutdown(cancel_rx);

    let result = coordinator.execute_export(request).await.unwrap();

    assert_eq!(result.state, RunState::Completed);
    assert_eq!(result.succeeded_count, 4);
}
