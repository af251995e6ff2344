// src/ingest/types.rs
use anyhow::Result;

/// An item as salvaged from one feed body. `published_at` is unix seconds
/// (UTC); `None` when the entry carried neither a published nor an updated
/// time.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub published_at: Option<u64>,
}

/// Result of a best-effort feed parse: whatever entries could be read, plus
/// a soft-failure flag when the document broke mid-stream. Hard errors are
/// reserved for transport failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedParse {
    pub entries: Vec<RawEntry>,
    pub truncated: bool,
}

/// A normalized, filtered, scored entry. Immutable once created; lives only
/// for the duration of one run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub link: String,
    pub published_at: u64, // unix seconds
    pub relevance_score: u32,
    pub source: String, // feed URL the entry came from
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<FeedParse>;
    fn name(&self) -> &str;
}
