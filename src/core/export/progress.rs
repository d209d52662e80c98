//! Progress aggregation for export runs
//!
//! The coordinator owns one [`ProgressTracker`] per run. Observers subscribe
//! to a `watch` channel and see coalesced snapshots; the last snapshot a
//! subscriber sees before the channel closes carries the terminal state.

use crate::domain::ids::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Lifecycle of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    /// Returns true for `Completed`, `Cancelled` and `Failed`
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of a run's progress
///
/// `completed_count + failed_count <= total_count` always holds, and both
/// counts only grow within a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkExportProgress {
    pub total_count: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    /// Title of the most recently started item
    pub current_item_title: Option<String>,
    pub is_cancelled: bool,
    pub state: RunState,
}

impl BulkExportProgress {
    /// Items whose outcome is known
    pub fn settled_count(&self) -> usize {
        self.completed_count + self.failed_count
    }

    /// Fraction of items settled, in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total_count == 0 {
            return 1.0;
        }
        self.settled_count() as f64 / self.total_count as f64
    }
}

/// Serialized writer of [`BulkExportProgress`]
pub struct ProgressTracker {
    tx: watch::Sender<BulkExportProgress>,
}

impl ProgressTracker {
    /// Creates a tracker with its own channel
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BulkExportProgress::default());
        Self { tx }
    }

    /// Creates a tracker publishing through a caller-provided sender
    ///
    /// The sender's current value is reset to an idle snapshot.
    pub fn with_sender(tx: watch::Sender<BulkExportProgress>) -> Self {
        tx.send_replace(BulkExportProgress::default());
        Self { tx }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> BulkExportProgress {
        self.tx.borrow().clone()
    }

    /// Subscribes to snapshots
    pub fn subscribe(&self) -> watch::Receiver<BulkExportProgress> {
        self.tx.subscribe()
    }

    /// Moves an idle run to `Running` with `total` items
    pub fn start(&self, total: usize) -> bool {
        self.apply("start", |p| {
            if p.state != RunState::Idle {
                return Err(format!("run is already {}", p.state));
            }
            p.state = RunState::Running;
            p.total_count = total;
            Ok(())
        })
    }

    /// Records that work on an item has begun
    pub fn record_started(&self, title: &str) -> bool {
        self.apply("record_started", |p| {
            ensure_running(p)?;
            p.current_item_title = Some(title.to_string());
            Ok(())
        })
    }

    /// Records a successfully exported item
    pub fn record_success(&self, item_id: &ItemId) -> bool {
        let accepted = self.apply("record_success", |p| {
            ensure_running(p)?;
            ensure_capacity(p)?;
            p.completed_count += 1;
            Ok(())
        });
        if accepted {
            tracing::trace!(item_id = %item_id, "Recorded item success");
        }
        accepted
    }

    /// Records a failed item
    pub fn record_failure(&self, item_id: &ItemId, reason: &str) -> bool {
        let accepted = self.apply("record_failure", |p| {
            ensure_running(p)?;
            ensure_capacity(p)?;
            p.failed_count += 1;
            Ok(())
        });
        if accepted {
            tracing::trace!(item_id = %item_id, reason, "Recorded item failure");
        }
        accepted
    }

    /// Flags the run as cancelled; counts are untouched
    pub fn mark_cancelled(&self) -> bool {
        self.apply("mark_cancelled", |p| {
            if p.state.is_terminal() {
                return Err(format!("run is already {}", p.state));
            }
            if p.is_cancelled {
                return Err("run is already cancelled".to_string());
            }
            p.is_cancelled = true;
            Ok(())
        })
    }

    /// Publishes the terminal state
    pub fn finish(&self, state: RunState) -> bool {
        self.apply("finish", |p| {
            if !state.is_terminal() {
                return Err(format!("{state} is not a terminal state"));
            }
            if p.state.is_terminal() {
                return Err(format!("run is already {}", p.state));
            }
            p.state = state;
            p.current_item_title = None;
            Ok(())
        })
    }

    /// The single mutation point; rejected mutations leave the snapshot untouched
    fn apply<F>(&self, operation: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut BulkExportProgress) -> Result<(), String>,
    {
        let mut rejection = None;
        self.tx.send_if_modified(|progress| {
            let mut next = progress.clone();
            match mutate(&mut next) {
                Ok(()) if next != *progress => {
                    *progress = next;
                    true
                }
                Ok(()) => false,
                Err(reason) => {
                    rejection = Some(reason);
                    false
                }
            }
        });

        match rejection {
            Some(reason) => {
                tracing::warn!(operation, reason = %reason, "Rejected progress update");
                false
            }
            None => true,
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_running(p: &BulkExportProgress) -> Result<(), String> {
    if p.state == RunState::Running {
        Ok(())
    } else {
        Err(format!("run is {}", p.state))
    }
}

fn ensure_capacity(p: &BulkExportProgress) -> Result<(), String> {
    if p.settled_count() < p.total_count {
        Ok(())
    } else {
        Err(format!(
            "all {} items have already settled",
            p.total_count
        ))
    }
}
