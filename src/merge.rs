// src/merge.rs
//! Pure merge engine: the set difference of fresh records against the
//! existing snapshot, keyed by `url`. No I/O; deterministic given its
//! inputs and the clock reading passed in by the caller.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::scrape::types::Project;

#[derive(Debug)]
pub struct Merged {
    pub snapshot: Vec<Project>,
    pub added: usize,
}

/// New entries are the fresh records whose url does not appear in the
/// existing snapshot; url duplicates inside the batch keep the first
/// occurrence only. New entries are stamped with `now` and prepended,
/// newest batch first; the existing snapshot rides along unmodified.
pub fn merge(fresh: Vec<Project>, existing: Vec<Project>, now: DateTime<Utc>) -> Merged {
    let mut seen: HashSet<String> = existing.iter().map(|p| p.url.clone()).collect();

    let mut snapshot = Vec::with_capacity(fresh.len() + existing.len());
    for mut p in fresh {
        if !seen.insert(p.url.clone()) {
            continue;
        }
        p.scraped_at = Some(now);
        snapshot.push(p);
    }
    let added = snapshot.len();
    snapshot.extend(existing);

    Merged { snapshot, added }
}
