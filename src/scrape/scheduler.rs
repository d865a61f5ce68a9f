// src/scrape/scheduler.rs
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use tokio::task::JoinHandle;

use crate::runner::{RunError, Runner};

/// Next wall-clock firing of a daily schedule, strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// Daily trigger. Uses the same run procedure as the on-demand path;
/// a failed or rejected run is logged and the loop keeps going.
pub fn spawn_daily(runner: Arc<Runner>, at: NaiveTime) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = next_run_after(now, at);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!(next = %next, "scheduler sleeping");
            tokio::time::sleep(wait).await;

            match runner.try_run().await {
                Ok(report) => tracing::info!(
                    target: "scheduler",
                    added = report.added,
                    total = report.total,
                    source_errors = report.source_errors.len(),
                    "scheduled scrape finished"
                ),
                Err(RunError::Busy) => tracing::warn!(
                    target: "scheduler",
                    "scheduled scrape skipped, a run is already in progress"
                ),
                Err(e) => tracing::error!(
                    target: "scheduler",
                    error = %e,
                    "scheduled scrape failed"
                ),
            }
        }
    })
}
