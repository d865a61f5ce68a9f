// tests/runner_exclusive.rs
//
// Trigger-layer contract: one run at a time, load before sources
// before save, fatal store errors surfaced with the right phase.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agency_radar::runner::{RunError, Runner};
use agency_radar::scrape::types::{Project, ProjectSource};
use agency_radar::store::SnapshotStore;
use anyhow::Result;
use async_trait::async_trait;

fn project(url: &str) -> Project {
    Project {
        title: format!("project {url}"),
        url: url.into(),
        thumbnail: None,
        video: None,
        agency: "stub".into(),
        tags: vec![],
        scraped_at: None,
    }
}

struct Fixed {
    records: Vec<Project>,
}

#[async_trait]
impl ProjectSource for Fixed {
    async fn fetch(&self) -> Result<Vec<Project>> {
        Ok(self.records.clone())
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Sleeps long enough for a second trigger to arrive mid-run.
struct Slow {
    records: Vec<Project>,
}

#[async_trait]
impl ProjectSource for Slow {
    async fn fetch(&self) -> Result<Vec<Project>> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(self.records.clone())
    }
    fn name(&self) -> &'static str {
        "slow"
    }
}

/// Records whether the aggregator ever polled it.
struct Tracking {
    polled: Arc<AtomicBool>,
}

#[async_trait]
impl ProjectSource for Tracking {
    async fn fetch(&self) -> Result<Vec<Project>> {
        self.polled.store(true, Ordering::SeqCst);
        Ok(vec![])
    }
    fn name(&self) -> &'static str {
        "tracking"
    }
}

#[tokio::test]
async fn second_trigger_is_rejected_while_a_run_is_in_progress() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("projects.json"));
    let runner = Arc::new(Runner::new(
        store,
        vec![Box::new(Slow {
            records: vec![project("https://x/a")],
        })],
        Duration::from_secs(5),
    ));

    let first = tokio::spawn({
        let runner = runner.clone();
        async move { runner.try_run().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = runner.try_run().await;
    assert!(matches!(second, Err(RunError::Busy)));

    let report = first.await.unwrap().expect("first run succeeds");
    assert_eq!(report.added, 1);
}

#[tokio::test]
async fn back_to_back_runs_add_then_add_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("projects.json"));
    let runner = Runner::new(
        store.clone(),
        vec![Box::new(Fixed {
            records: vec![project("https://x/a"), project("https://x/b")],
        })],
        Duration::from_secs(5),
    );

    let first = runner.try_run().await.expect("first run");
    assert_eq!(first.added, 2);
    assert_eq!(first.total, 2);

    let second = runner.try_run().await.expect("second run");
    assert_eq!(second.added, 0);
    assert_eq!(second.total, 2);

    assert_eq!(store.load().unwrap().len(), 2);
}

#[tokio::test]
async fn new_records_are_prepended_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("projects.json"));

    let runner = Runner::new(
        store.clone(),
        vec![Box::new(Fixed {
            records: vec![project("https://x/a")],
        })],
        Duration::from_secs(5),
    );
    runner.try_run().await.expect("seed run");

    let runner = Runner::new(
        store.clone(),
        vec![Box::new(Fixed {
            records: vec![project("https://x/a"), project("https://x/b")],
        })],
        Duration::from_secs(5),
    );
    let report = runner.try_run().await.expect("second run");
    assert_eq!(report.added, 1);

    let urls: Vec<_> = store
        .load()
        .unwrap()
        .into_iter()
        .map(|p| p.url)
        .collect();
    assert_eq!(urls, vec!["https://x/b".to_string(), "https://x/a".to_string()]);
}

#[tokio::test]
async fn corrupt_snapshot_aborts_before_any_source_is_polled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.json");
    std::fs::write(&path, "definitely not json").unwrap();

    let polled = Arc::new(AtomicBool::new(false));
    let runner = Runner::new(
        SnapshotStore::new(&path),
        vec![Box::new(Tracking {
            polled: polled.clone(),
        })],
        Duration::from_secs(5),
    );

    let err = runner.try_run().await.expect_err("read must fail");
    assert!(matches!(err, RunError::StoreRead(_)));
    assert!(!polled.load(Ordering::SeqCst), "no source may run against unknown state");
}

#[tokio::test]
async fn failed_persist_is_reported_and_prior_snapshot_stays_authoritative() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.json");
    // Occupy the temp sibling with a directory so the persist step fails.
    std::fs::create_dir(dir.path().join("projects.json.tmp")).unwrap();

    let runner = Runner::new(
        SnapshotStore::new(&path),
        vec![Box::new(Fixed {
            records: vec![project("https://x/a")],
        })],
        Duration::from_secs(5),
    );

    let err = runner.try_run().await.expect_err("write must fail");
    assert!(matches!(err, RunError::StoreWrite(_)));
    assert!(!path.exists(), "no partial snapshot appears");
}
