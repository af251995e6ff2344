// src/config.rs
//! Static run configuration: feed list, relevance terms, window and caps.
//!
//! Resolution order: `DIGEST_CONFIG_PATH` (hard error if unreadable) →
//! `config/digest.toml` if present → compiled-in defaults. Everything is
//! fixed for the lifetime of one run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";

pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const ENV_WINDOW_HOURS: &str = "DIGEST_WINDOW_HOURS";

#[derive(Debug, Clone, Deserialize)]
pub struct DigestConfig {
    #[serde(default)]
    pub digest: DigestSection,
    #[serde(default)]
    pub relevance: RelevanceSection,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DigestSection {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Balanced-selection stage: per-feed cap applied before the global
    /// merge. Absent = stage disabled. The shipped config enables it at 3.
    #[serde(default)]
    pub per_source_cap: Option<usize>,
    #[serde(default = "default_window_hours")]
    pub window_hours: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceSection {
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: u32,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,
}

fn default_title() -> String {
    "QA Summary".to_string()
}
fn default_max_items() -> usize {
    9
}
fn default_window_hours() -> u64 {
    24
}
fn default_fetch_timeout_secs() -> u64 {
    12
}
fn default_send_timeout_secs() -> u64 {
    10
}
fn default_keyword_weight() -> u32 {
    5
}

fn default_keywords() -> Vec<String> {
    [
        "qa",
        "testing",
        "automation",
        "quality",
        "bug",
        "regression",
        "selenium",
        "playwright",
        "cypress",
        "devops",
    ]
    .map(String::from)
    .to_vec()
}

fn default_blacklist() -> Vec<String> {
    ["/jobs/", "career", "hiring", "vacancy", "sponsored"]
        .map(String::from)
        .to_vec()
}

fn default_feeds() -> Vec<String> {
    [
        "https://www.ministryoftesting.com/contents/rss",
        "https://feed.infoq.com/Testing/",
        "https://sdtimes.com/category/software-quality/feed/",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for DigestSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            max_items: default_max_items(),
            per_source_cap: None,
            window_hours: default_window_hours(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

impl Default for RelevanceSection {
    fn default() -> Self {
        Self {
            keyword_weight: default_keyword_weight(),
            keywords: default_keywords(),
            blacklist: default_blacklist(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            digest: DigestSection::default(),
            relevance: RelevanceSection::default(),
            feeds: default_feeds(),
        }
    }
}

impl DigestConfig {
    /// Load configuration for this run, then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                // An explicitly configured path must work.
                Self::from_path(Path::new(&p))?
            }
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_path(&default_path)?
                } else {
                    tracing::info!("no config file found; using built-in defaults");
                    Self::default()
                }
            }
        };

        if let Some(hours) = parse_window_env(std::env::var(ENV_WINDOW_HOURS).ok()) {
            cfg.digest.window_hours = hours;
        }

        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading digest config at {}", path.display()))?;
        let cfg = Self::from_toml_str(&content)
            .with_context(|| format!("parsing digest config at {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded digest config");
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: DigestConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.digest.window_hours * 3600)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.digest.fetch_timeout_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.digest.send_timeout_secs)
    }
}

// parse optional hours env and clamp to 1..=168 (one hour to one week)
fn parse_window_env(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .map(|v| v.clamp(1, 168))
}
