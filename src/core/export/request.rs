//! Export requests and run settings

use crate::config::ExportConfig;
use crate::core::export::progress::BulkExportProgress;
use crate::core::format::ExportFormat;
use crate::domain::filter::BulkExportFilterContext;
use crate::domain::item::LibraryItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::watch;

/// What happens to items already running when a run is cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// In-flight items run to completion and are recorded normally
    #[default]
    FinishInFlight,
    /// In-flight items are aborted and their files removed
    AbandonInFlight,
}

impl CancelPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FinishInFlight => "finish_in_flight",
            Self::AbandonInFlight => "abandon_in_flight",
        }
    }
}

impl fmt::Display for CancelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CancelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "finish_in_flight" | "finish" => Ok(Self::FinishInFlight),
            "abandon_in_flight" | "abandon" => Ok(Self::AbandonInFlight),
            _ => Err(format!(
                "Invalid cancel policy '{s}'. Must be 'finish_in_flight' or 'abandon_in_flight'"
            )),
        }
    }
}

/// One export run's input
///
/// # Examples
///
/// ```
/// use folio::core::export::ExportRequest;
/// use folio::core::format::ExportFormat;
/// use folio::domain::BulkExportFilterContext;
///
/// let request = ExportRequest::new(Vec::new(), ExportFormat::Html)
///     .with_filter(BulkExportFilterContext::all().with_tag("philosophy"))
///     .with_concurrency(4);
/// assert_eq!(request.concurrency, Some(4));
/// ```
#[derive(Debug)]
pub struct ExportRequest {
    pub items: Vec<LibraryItem>,
    pub filter: BulkExportFilterContext,
    pub format: ExportFormat,
    /// Overrides the configured concurrency for this run
    pub concurrency: Option<usize>,
    pub(crate) shutdown: Option<watch::Receiver<bool>>,
    pub(crate) progress: Option<watch::Sender<BulkExportProgress>>,
}

impl ExportRequest {
    /// Creates a request exporting every item in `format`
    pub fn new(items: Vec<LibraryItem>, format: ExportFormat) -> Self {
        Self {
            items,
            filter: BulkExportFilterContext::default(),
            format,
            concurrency: None,
            shutdown: None,
            progress: None,
        }
    }

    pub fn with_filter(mut self, filter: BulkExportFilterContext) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Cancels the run once the receiver observes `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Publishes progress through `sender`; the channel closes when the run ends
    pub fn with_progress(mut self, sender: watch::Sender<BulkExportProgress>) -> Self {
        self.progress = Some(sender);
        self
    }
}

/// Coordinator settings shared by every run
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Base directory under which each run creates its own directory
    pub output_dir: PathBuf,
    pub concurrency: usize,
    /// `None` disables the per-item timeout
    pub item_timeout: Option<Duration>,
    pub cancel_policy: CancelPolicy,
    pub directory_prefix: String,
    pub verify_output: bool,
    pub max_title_length: usize,
    pub min_quality_score: Option<f64>,
}

impl ExportSettings {
    /// Creates settings from the `[export]` configuration section
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            concurrency: config.concurrency,
            item_timeout: (config.item_timeout_secs > 0)
                .then(|| Duration::from_secs(config.item_timeout_secs)),
            cancel_policy: config.cancel_policy,
            directory_prefix: config.directory_prefix.clone(),
            verify_output: config.verify_output,
            max_title_length: config.max_title_length,
            min_quality_score: config.min_quality_score,
        }
    }

    /// Default settings writing under `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::from_config(&ExportConfig::default())
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_item_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.item_timeout = timeout;
        self
    }

    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    pub fn with_verify_output(mut self, verify: bool) -> Self {
        self.verify_output = verify;
        self
    }

    pub fn with_min_quality_score(mut self, score: Option<f64>) -> Self {
        self.min_quality_score = score;
        self
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}
