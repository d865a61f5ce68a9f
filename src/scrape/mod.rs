// src/scrape/mod.rs
pub mod config;
pub mod scheduler;
pub mod sources;
pub mod types;

use std::time::Duration;

use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tokio::time::timeout;
use url::Url;

use crate::scrape::types::{Project, ProjectSource, SourceFailure};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scrape_runs_total", "Completed ingestion runs.");
        describe_counter!("scrape_added_total", "Projects added to the snapshot.");
        describe_counter!("scrape_records_total", "Raw records produced by sources.");
        describe_counter!(
            "scrape_invalid_total",
            "Records dropped at the validation boundary."
        );
        describe_counter!(
            "scrape_source_errors_total",
            "Source fetch/parse/timeout errors."
        );
        describe_counter!(
            "scrape_rejected_total",
            "Triggers rejected while a run was in progress."
        );
        describe_histogram!("scrape_fetch_ms", "Per-source fetch time in milliseconds.");
        describe_gauge!("scrape_last_run_ts", "Unix ts when the last run finished.");
    });
}

/// Normalize a scraped title: decode HTML entities, collapse
/// whitespace, trim.
pub fn normalize_title(s: &str) -> String {
    let out = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Everything one fan-out produced: surviving records in
/// source-registration order, plus failures recorded per source name.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub records: Vec<Project>,
    pub errors: Vec<SourceFailure>,
}

/// Poll every registered source concurrently. A source's error or
/// timeout is recorded against its name and never aborts the batch;
/// a source returning zero records is a valid outcome.
pub async fn run_all(sources: &[Box<dyn ProjectSource>], per_source: Duration) -> Aggregate {
    ensure_metrics_described();

    let fetches = sources.iter().map(|s| async move {
        let t0 = std::time::Instant::now();
        let res = timeout(per_source, s.fetch()).await;
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("scrape_fetch_ms").record(ms);
        (s.name(), res)
    });

    // join_all keeps registration order regardless of completion order.
    let mut agg = Aggregate::default();
    for (name, res) in join_all(fetches).await {
        match res {
            Ok(Ok(batch)) => {
                counter!("scrape_records_total").increment(batch.len() as u64);
                agg.records.extend(validate(name, batch));
            }
            Ok(Err(e)) => {
                tracing::warn!(source = name, error = ?e, "source fetch failed");
                counter!("scrape_source_errors_total").increment(1);
                agg.errors.push(SourceFailure {
                    source: name.to_string(),
                    message: format!("{e:#}"),
                });
            }
            Err(_) => {
                tracing::warn!(
                    source = name,
                    timeout_secs = per_source.as_secs(),
                    "source timed out"
                );
                counter!("scrape_source_errors_total").increment(1);
                agg.errors.push(SourceFailure {
                    source: name.to_string(),
                    message: format!("timed out after {:?}", per_source),
                });
            }
        }
    }
    agg
}

fn is_project_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Boundary validation: only records with an absolute http(s) URL may
/// enter the merge engine. Titles are normalized here so the merge
/// engine stays pure.
fn validate(source: &str, batch: Vec<Project>) -> Vec<Project> {
    let mut out = Vec::with_capacity(batch.len());
    for mut p in batch {
        if !is_project_url(&p.url) {
            tracing::debug!(source, url = %p.url, "dropping record without absolute url");
            counter!("scrape_invalid_total").increment(1);
            continue;
        }
        p.title = normalize_title(&p.title);
        out.push(p);
    }
    out
}
