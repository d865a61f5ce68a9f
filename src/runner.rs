// src/runner.rs
//! Trigger layer: one load → aggregate → merge → save cycle, plus the
//! single-run mutual exclusion shared by the on-demand and scheduled
//! triggers.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, gauge};
use tokio::sync::Mutex;

use crate::merge;
use crate::scrape;
use crate::scrape::types::{ProjectSource, SourceFailure};
use crate::store::SnapshotStore;

/// What one completed run reports back to the caller/log.
#[derive(Debug, serde::Serialize)]
pub struct RunReport {
    pub added: usize,
    pub total: usize,
    pub source_errors: Vec<SourceFailure>,
}

#[derive(Debug)]
pub enum RunError {
    /// A run is already in progress; the caller should retry later.
    Busy,
    /// Snapshot unreadable or corrupt. Aborted before any source ran.
    StoreRead(anyhow::Error),
    /// Persist failed after a successful merge. The prior snapshot
    /// stays authoritative; this run's new entries are still new
    /// relative to it and will be re-merged next run.
    StoreWrite(anyhow::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Busy => write!(f, "a scrape run is already in progress"),
            RunError::StoreRead(e) => write!(f, "loading snapshot: {e:#}"),
            RunError::StoreWrite(e) => write!(f, "persisting snapshot: {e:#}"),
        }
    }
}

impl std::error::Error for RunError {}

pub struct Runner {
    store: SnapshotStore,
    sources: Vec<Box<dyn ProjectSource>>,
    per_source_timeout: Duration,
    busy: Mutex<()>,
}

impl Runner {
    pub fn new(
        store: SnapshotStore,
        sources: Vec<Box<dyn ProjectSource>>,
        per_source_timeout: Duration,
    ) -> Self {
        Self {
            store,
            sources,
            per_source_timeout,
            busy: Mutex::new(()),
        }
    }

    /// Run one ingestion cycle, or reject if one is already running.
    /// The guard spans load through save, so no two cycles interleave
    /// a `load`/`save` pair.
    pub async fn try_run(&self) -> Result<RunReport, RunError> {
        scrape::ensure_metrics_described();

        let Ok(_guard) = self.busy.try_lock() else {
            counter!("scrape_rejected_total").increment(1);
            return Err(RunError::Busy);
        };

        let existing = self.store.load().map_err(RunError::StoreRead)?;

        let agg = scrape::run_all(&self.sources, self.per_source_timeout).await;
        let merged = merge::merge(agg.records, existing, Utc::now());

        self.store
            .save(&merged.snapshot)
            .map_err(RunError::StoreWrite)?;

        counter!("scrape_runs_total").increment(1);
        counter!("scrape_added_total").increment(merged.added as u64);
        gauge!("scrape_last_run_ts").set(Utc::now().timestamp() as f64);

        tracing::info!(
            added = merged.added,
            total = merged.snapshot.len(),
            source_errors = agg.errors.len(),
            "scrape run finished"
        );

        Ok(RunReport {
            added: merged.added,
            total: merged.snapshot.len(),
            source_errors: agg.errors,
        })
    }
}
