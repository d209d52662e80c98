//! Export coordinator
//!
//! Runs one export from request to terminal state. The coordinating task
//! selects items, dispatches them in filter order to a bounded pool of
//! worker tasks and, once every worker has settled, writes the manifest.
//! Each worker carries one item end to end: process, audit, serialize,
//! write. Per-item failures are recorded and never stop sibling items.

use crate::config::MAX_CONCURRENCY;
use crate::core::export::assembler::{self, FilePlan};
use crate::core::export::manifest::{Manifest, ManifestEntry};
use crate::core::export::progress::{ProgressTracker, RunState};
use crate::core::export::request::{CancelPolicy, ExportRequest, ExportSettings};
use crate::core::export::summary::{BulkExportResult, ExportError, ExportStage, ExportedFile};
use crate::core::filter::select;
use crate::core::format::guide::Guide;
use crate::core::format::{serialize, ExportFormat};
use crate::core::processor::ContentProcessor;
use crate::core::quality::audit_guide;
use crate::core::verification::Verifier;
use crate::domain::errors::{FatalRunError, FolioError, ProcessingError};
use crate::domain::ids::RunId;
use crate::domain::item::LibraryItem;
use crate::domain::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};

const SKIPPED_BEFORE_START: &str = "cancelled before start";
const SKIPPED_ABANDONED: &str = "abandoned on cancellation";

/// Result of one worker
enum ItemOutcome {
    Exported(ExportedFile),
    Failed {
        error: ExportError,
        quality_score: Option<f64>,
    },
}

/// Where an item stands during dispatch
enum Slot {
    NotStarted,
    InFlight,
    Settled(ItemOutcome),
}

/// Per-run parameters shared by all workers
#[derive(Clone)]
struct ItemJob {
    format: ExportFormat,
    timeout: Option<Duration>,
    min_quality_score: Option<f64>,
    plan: Arc<FilePlan>,
}

/// Coordinates bulk export runs over a content processor
///
/// # Examples
///
/// ```no_run
/// use folio::core::export::{ExportCoordinator, ExportRequest, ExportSettings};
/// use folio::core::format::ExportFormat;
/// use folio::core::processor::SourceTextProcessor;
/// use folio::domain::Library;
///
/// # async fn example() -> folio::domain::Result<()> {
/// let library = Library::from_json_file("library.json")?;
/// let coordinator = ExportCoordinator::new(
///     SourceTextProcessor::new("."),
///     ExportSettings::new("exports"),
/// );
///
/// let result = coordinator
///     .execute_export(ExportRequest::new(library.items, ExportFormat::Markdown))
///     .await?;
/// println!("{}", result.format_summary());
/// # Ok(())
/// # }
/// ```
pub struct ExportCoordinator<P> {
    processor: Arc<P>,
    settings: ExportSettings,
}

impl<P> ExportCoordinator<P>
where
    P: ContentProcessor + 'static,
{
    pub fn new(processor: P, settings: ExportSettings) -> Self {
        Self::from_shared(Arc::new(processor), settings)
    }

    /// Creates a coordinator over a processor shared with other owners
    pub fn from_shared(processor: Arc<P>, settings: ExportSettings) -> Self {
        Self {
            processor,
            settings,
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Runs one export to its terminal state
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Fatal`] for an invalid request or filter, or
    /// when the output directory or the manifest cannot be written. Item
    /// failures are reported in the returned [`BulkExportResult`].
    pub async fn execute_export(&self, request: ExportRequest) -> Result<BulkExportResult> {
        let start = Instant::now();
        let run_id = RunId::generate();
        let ExportRequest {
            items,
            filter,
            format,
            concurrency,
            mut shutdown,
            progress,
        } = request;

        let tracker = match progress {
            Some(sender) => ProgressTracker::with_sender(sender),
            None => ProgressTracker::new(),
        };

        let concurrency = concurrency.unwrap_or(self.settings.concurrency);
        if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(fail_run(
                &tracker,
                &run_id,
                FatalRunError::InvalidRequest(format!(
                    "concurrency must be between 1 and {MAX_CONCURRENCY}, got {concurrency}"
                )),
            ));
        }
        if let Err(reason) = filter.validate() {
            return Err(fail_run(
                &tracker,
                &run_id,
                FatalRunError::InvalidFilter(reason),
            ));
        }

        let selected = select(&items, &filter);
        tracker.start(selected.len());
        crate::log_export_start!(run_id, selected.len(), format);

        let output_dir = match assembler::create_output_directory(
            &self.settings.output_dir,
            &self.settings.directory_prefix,
            &run_id,
            Utc::now(),
        )
        .await
        {
            Ok(dir) => dir,
            Err(e) => return Err(fail_run(&tracker, &run_id, e)),
        };

        let plan = Arc::new(assembler::plan(
            &output_dir,
            &selected,
            format,
            self.settings.max_title_length,
        ));
        let job = ItemJob {
            format,
            timeout: self.settings.item_timeout,
            min_quality_score: self.settings.min_quality_score,
            plan: Arc::clone(&plan),
        };

        let (slots, cancelled) = self
            .dispatch(&selected, &job, concurrency, &tracker, &mut shutdown)
            .await;
        let abandoned = cancelled && self.settings.cancel_policy == CancelPolicy::AbandonInFlight;

        let mut entries = Vec::with_capacity(selected.len());
        let mut errors = Vec::new();
        let mut files = Vec::new();

        for (item, slot) in selected.iter().zip(slots) {
            match slot {
                Slot::Settled(ItemOutcome::Exported(file)) => {
                    entries.push(ManifestEntry::succeeded(
                        item.id.clone(),
                        item.title.clone(),
                        file.file_name.clone(),
                        file.bytes,
                        file.checksum.clone(),
                        file.quality_score,
                    ));
                    files.push(file);
                }
                Slot::Settled(ItemOutcome::Failed {
                    error,
                    quality_score,
                }) => {
                    entries.push(ManifestEntry::failed(
                        item.id.clone(),
                        item.title.clone(),
                        error.stage,
                        error.message.clone(),
                        quality_score,
                    ));
                    errors.push(error);
                }
                Slot::InFlight if abandoned => {
                    assembler::discard_item(&plan, &item.id).await;
                    entries.push(ManifestEntry::skipped(
                        item.id.clone(),
                        item.title.clone(),
                        SKIPPED_ABANDONED,
                    ));
                }
                Slot::InFlight => {
                    // The worker died without reporting
                    let error = ExportError::new(
                        item.id.clone(),
                        item.title.clone(),
                        ExportStage::Processing,
                        "export worker terminated unexpectedly",
                    );
                    crate::log_item_failure!(error.item_id, error.stage, error.message);
                    tracker.record_failure(&error.item_id, &error.message);
                    entries.push(ManifestEntry::failed(
                        item.id.clone(),
                        item.title.clone(),
                        error.stage,
                        error.message.clone(),
                        None,
                    ));
                    errors.push(error);
                }
                Slot::NotStarted => {
                    entries.push(ManifestEntry::skipped(
                        item.id.clone(),
                        item.title.clone(),
                        SKIPPED_BEFORE_START,
                    ));
                }
            }
        }

        let verification = if self.settings.verify_output {
            Some(Verifier::new().verify_output(&output_dir, &entries).await)
        } else {
            None
        };

        let state = if cancelled {
            RunState::Cancelled
        } else {
            RunState::Completed
        };
        let manifest = Manifest::new(run_id, format, state, filter, entries)
            .with_verification(verification.clone());
        let manifest_path = match assembler::finalize(&output_dir, &manifest).await {
            Ok(path) => path,
            Err(e) => return Err(fail_run(&tracker, &run_id, e)),
        };

        tracker.finish(state);

        let result = BulkExportResult {
            run_id,
            format,
            output_dir,
            manifest_path,
            state,
            cancelled,
            succeeded_count: manifest.succeeded_count,
            failed_count: manifest.failed_count,
            skipped_count: manifest.skipped_count,
            errors,
            files,
            elapsed: start.elapsed(),
            verification,
        };
        result.log_summary();

        Ok(result)
    }

    /// Dispatches items in order and waits for every worker to settle
    ///
    /// Returns one slot per item and whether cancellation was observed.
    async fn dispatch(
        &self,
        selected: &[LibraryItem],
        job: &ItemJob,
        concurrency: usize,
        tracker: &ProgressTracker,
        shutdown: &mut Option<watch::Receiver<bool>>,
    ) -> (Vec<Slot>, bool) {
        let abandon = self.settings.cancel_policy == CancelPolicy::AbandonInFlight;
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut workers: JoinSet<(usize, ItemOutcome)> = JoinSet::new();
        let mut slots: Vec<Slot> = selected.iter().map(|_| Slot::NotStarted).collect();
        let mut cancelled = false;

        'dispatch: for (index, item) in selected.iter().enumerate() {
            let permit = loop {
                if is_cancelled(shutdown) {
                    cancelled = true;
                    break 'dispatch;
                }
                tokio::select! {
                    biased;
                    _ = cancellation(shutdown) => {
                        cancelled = true;
                        break 'dispatch;
                    }
                    Some(joined) = workers.join_next() => {
                        settle(joined, &mut slots, tracker);
                    }
                    permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                        Ok(permit) => break permit,
                        Err(_) => break 'dispatch,
                    },
                }
            };

            // A permit may have been granted in the same instant as the signal
            if is_cancelled(shutdown) {
                cancelled = true;
                break;
            }

            tracker.record_started(&item.title);
            slots[index] = Slot::InFlight;

            let processor = Arc::clone(&self.processor);
            let job = job.clone();
            let item = item.clone();
            workers.spawn(async move {
                let _permit = permit;
                let outcome = export_item(processor.as_ref(), &item, &job).await;
                (index, outcome)
            });
        }

        if cancelled {
            self.on_cancelled(tracker, &mut workers);
        }

        loop {
            tokio::select! {
                biased;
                _ = cancellation(shutdown), if abandon && !cancelled => {
                    cancelled = true;
                    self.on_cancelled(tracker, &mut workers);
                }
                joined = workers.join_next() => match joined {
                    Some(joined) => settle(joined, &mut slots, tracker),
                    None => break,
                },
            }
        }

        (slots, cancelled)
    }

    fn on_cancelled(&self, tracker: &ProgressTracker, workers: &mut JoinSet<(usize, ItemOutcome)>) {
        tracker.mark_cancelled();
        tracing::warn!(
            in_flight = workers.len(),
            policy = %self.settings.cancel_policy,
            "Export cancelled, no further items will start"
        );
        if self.settings.cancel_policy == CancelPolicy::AbandonInFlight {
            workers.abort_all();
        }
    }
}

/// Records a finished worker's outcome
fn settle(
    joined: std::result::Result<(usize, ItemOutcome), JoinError>,
    slots: &mut [Slot],
    tracker: &ProgressTracker,
) {
    let (index, outcome) = match joined {
        Ok(settled) => settled,
        Err(e) if e.is_cancelled() => return,
        Err(e) => {
            tracing::error!(error = %e, "Export worker panicked");
            return;
        }
    };

    match &outcome {
        ItemOutcome::Exported(file) => {
            tracker.record_success(&file.item_id);
        }
        ItemOutcome::Failed { error, .. } => {
            crate::log_item_failure!(error.item_id, error.stage, error.message);
            tracker.record_failure(&error.item_id, &error.message);
        }
    }
    slots[index] = Slot::Settled(outcome);
}

fn fail_run(tracker: &ProgressTracker, run_id: &RunId, error: FatalRunError) -> FolioError {
    tracing::error!(run_id = %run_id, error = %error, "Export run failed");
    tracker.finish(RunState::Failed);
    FolioError::Fatal(error)
}

fn is_cancelled(shutdown: &Option<watch::Receiver<bool>>) -> bool {
    shutdown.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Resolves once cancellation is requested; never if the sender is gone
async fn cancellation(shutdown: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = shutdown {
        if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}

/// Carries one item through process, audit, serialize and write
async fn export_item<P>(processor: &P, item: &LibraryItem, job: &ItemJob) -> ItemOutcome
where
    P: ContentProcessor + ?Sized,
{
    let failed = |stage: ExportStage, message: String, quality_score: Option<f64>| {
        ItemOutcome::Failed {
            error: ExportError::new(item.id.clone(), item.title.clone(), stage, message),
            quality_score,
        }
    };

    let processed = match job.timeout {
        Some(limit) => tokio::time::timeout(limit, processor.process(item))
            .await
            .unwrap_or(Err(ProcessingError::Timeout(limit))),
        None => processor.process(item).await,
    };
    let content = match processed {
        Ok(content) => content,
        Err(e) => return failed(ExportStage::Processing, e.to_string(), None),
    };

    let report = audit_guide(&Guide::parse(&content.body));
    if let Some(required) = job.min_quality_score {
        if report.score < required {
            let error = ProcessingError::BelowQualityThreshold {
                score: report.score,
                required,
            };
            return failed(ExportStage::Processing, error.to_string(), Some(report.score));
        }
    }

    let bytes = match serialize(&content, job.format) {
        Ok(bytes) => bytes,
        Err(e) => return failed(ExportStage::Serialization, e.to_string(), Some(report.score)),
    };

    match assembler::write_item(&job.plan, &item.id, &bytes).await {
        Ok(file) => ItemOutcome::Exported(ExportedFile {
            quality_score: Some(report.score),
            ..file
        }),
        Err(e) => failed(ExportStage::Write, e.to_string(), Some(report.score)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::processor::ProcessedContent;
    use crate::domain::filter::BulkExportFilterContext;
    use crate::domain::item::ContentRef;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    struct EchoProcessor;

    #[async_trait]
    impl ContentProcessor for EchoProcessor {
        async fn process(
            &self,
            item: &LibraryItem,
        ) -> std::result::Result<ProcessedContent, ProcessingError> {
            match &item.content {
                ContentRef::Inline { text } if text == "slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(ProcessedContent::for_item(item, text.clone()))
                }
                ContentRef::Inline { text } => Ok(ProcessedContent::for_item(item, text.clone())),
                ContentRef::File { .. } => Err(ProcessingError::ContentUnavailable(
                    "file content not supported".to_string(),
                )),
            }
        }
    }

    fn item(id: &str, title: &str, body: &str) -> LibraryItem {
        LibraryItem::builder()
            .id(id)
            .unwrap()
            .title(title)
            .author("Anon")
            .created_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .content(ContentRef::Inline {
                text: body.to_string(),
            })
            .build()
            .unwrap()
    }

    fn coordinator(dir: &TempDir) -> ExportCoordinator<EchoProcessor> {
        ExportCoordinator::new(EchoProcessor, ExportSettings::new(dir.path()))
    }

    #[tokio::test]
    async fn test_invalid_concurrency_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = watch::channel(Default::default());
        let request = ExportRequest::new(vec![item("a", "A", "text")], ExportFormat::Markdown)
            .with_concurrency(0)
            .with_progress(tx);

        let err = coordinator(&dir).execute_export(request).await.unwrap_err();
        assert!(matches!(
            err,
            FolioError::Fatal(FatalRunError::InvalidRequest(_))
        ));
        assert_eq!(rx.borrow().state, RunState::Failed);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_filter_is_fatal() {
        let dir = TempDir::new().unwrap();
        let filter = BulkExportFilterContext {
            created_after: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            created_before: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let request = ExportRequest::new(Vec::new(), ExportFormat::Markdown).with_filter(filter);

        let err = coordinator(&dir).execute_export(request).await.unwrap_err();
        assert!(matches!(
            err,
            FolioError::Fatal(FatalRunError::InvalidFilter(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_processing_failure() {
        let dir = TempDir::new().unwrap();
        let settings =
            ExportSettings::new(dir.path()).with_item_timeout(Some(Duration::from_millis(20)));
        let coordinator = ExportCoordinator::new(EchoProcessor, settings);
        let request = ExportRequest::new(
            vec![item("a", "Fast", "quick"), item("b", "Slow", "slow")],
            ExportFormat::PlainText,
        );

        let result = coordinator.execute_export(request).await.unwrap();
        assert_eq!(result.succeeded_count, 1);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.errors[0].stage, ExportStage::Processing);
        assert!(result.errors[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_quality_threshold_rejects_incomplete_guides() {
        let dir = TempDir::new().unwrap();
        let settings = ExportSettings::new(dir.path()).with_min_quality_score(Some(95.0));
        let coordinator = ExportCoordinator::new(EchoProcessor, settings);
        let request = ExportRequest::new(vec![item("a", "Thin", "Too short.")], ExportFormat::Markdown);

        let result = coordinator.execute_export(request).await.unwrap();
        assert_eq!(result.failed_count, 1);
        assert!(result.errors[0].message.contains("below the required 95.0%"));

        let manifest = Manifest::read_from_dir(&result.output_dir).unwrap();
        assert_eq!(manifest.entries[0].quality_score, Some(20.0));
    }

    #[tokio::test]
    async fn test_scores_and_verification_recorded() {
        let dir = TempDir::new().unwrap();
        let settings = ExportSettings::new(dir.path()).with_verify_output(true);
        let coordinator = ExportCoordinator::new(EchoProcessor, settings);
        let request = ExportRequest::new(
            vec![item("a", "One", "# One\n\nBody."), item("b", "Two", "Body.")],
            ExportFormat::Html,
        );

        let result = coordinator.execute_export(request).await.unwrap();
        assert_eq!(result.state, RunState::Completed);
        assert!(result.files.iter().all(|f| f.quality_score.is_some()));

        let verification = result.verification.as_ref().unwrap();
        assert_eq!(verification.passed, 2);
        assert!(result.is_successful());

        let manifest = Manifest::read_from_dir(&result.output_dir).unwrap();
        assert!(manifest.verification.is_some());
    }
}
