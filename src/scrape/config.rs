// src/scrape/config.rs
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveTime;

const ENV_DATA_PATH: &str = "SCRAPE_DATA_PATH";
const ENV_DAILY_AT: &str = "SCRAPE_DAILY_AT";
const ENV_SOURCE_TIMEOUT: &str = "SCRAPE_SOURCE_TIMEOUT_SECS";
const ENV_BIND_ADDR: &str = "SCRAPE_BIND_ADDR";

const DEFAULT_CONFIG_PATH: &str = "config/scrape.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeConfig {
    pub data_path: PathBuf,
    /// Wall-clock UTC time of the daily scheduled run.
    pub daily_at: NaiveTime,
    pub per_source_timeout_secs: u64,
    pub bind_addr: SocketAddr,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/projects.json"),
            daily_at: NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
            per_source_timeout_secs: 30,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct FileCfg {
    data_path: Option<PathBuf>,
    daily_at: Option<String>,
    per_source_timeout_secs: Option<u64>,
    bind_addr: Option<String>,
}

impl ScrapeConfig {
    /// Env vars take precedence over `config/scrape.toml`, which takes
    /// precedence over built-in defaults. Read once at startup.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let file: FileCfg = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        } else {
            FileCfg::default()
        };

        let mut cfg = ScrapeConfig::default();
        if let Some(p) = file.data_path {
            cfg.data_path = p;
        }
        if let Some(t) = file.daily_at.as_deref() {
            cfg.daily_at = parse_daily_at(t)?;
        }
        if let Some(s) = file.per_source_timeout_secs {
            cfg.per_source_timeout_secs = s;
        }
        if let Some(a) = file.bind_addr.as_deref() {
            cfg.bind_addr = a.parse().context("bind_addr in config file")?;
        }

        if let Ok(p) = std::env::var(ENV_DATA_PATH) {
            cfg.data_path = PathBuf::from(p);
        }
        if let Ok(t) = std::env::var(ENV_DAILY_AT) {
            cfg.daily_at = parse_daily_at(&t)?;
        }
        if let Ok(s) = std::env::var(ENV_SOURCE_TIMEOUT) {
            cfg.per_source_timeout_secs = s
                .parse()
                .context("SCRAPE_SOURCE_TIMEOUT_SECS must be an integer")?;
        }
        if let Ok(a) = std::env::var(ENV_BIND_ADDR) {
            cfg.bind_addr = a.parse().context("SCRAPE_BIND_ADDR must be host:port")?;
        }

        Ok(cfg)
    }
}

/// Accepts "HH:MM" or "HH:MM:SS".
fn parse_daily_at(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("invalid daily_at '{s}', expected HH:MM"))
}
