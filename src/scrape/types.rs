// src/scrape/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One scraped portfolio entry. `url` is the identity key used for
/// deduplication; every other field is payload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Project {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub agency: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Stamped by the merge engine at ingestion time, never by a source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
}

/// A site-specific extractor. Registered once at startup; registration
/// order is the concatenation order of every batch.
#[async_trait::async_trait]
pub trait ProjectSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Project>>;
    fn name(&self) -> &'static str;
}

/// A source that failed this batch. The rest of the batch proceeds.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}
