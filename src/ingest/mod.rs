// src/ingest/mod.rs
pub mod providers;
pub mod types;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use crate::ingest::types::{Candidate, RawEntry, SourceProvider};
use crate::relevance::RelevanceRules;

/// "Now" captured exactly once per run, timezone-aware UTC, so the recency
/// window cannot drift while sources are fetched.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn now() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }

    /// Fixed-instant constructor for tests and replays.
    pub fn at(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    pub fn unix(&self) -> u64 {
        self.started_at.timestamp().max(0) as u64
    }
}

/// Ranking knobs for one run. `window_secs` bounds entry age relative to the
/// run start; `per_source_cap` is the optional balanced-selection stage.
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    pub window_secs: u64,
    pub per_source_cap: Option<usize>,
    pub max_items: usize,
}

/// Per-run counters, logged once at the end of `run_once`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub entries_seen: usize,
    pub rejected_empty: usize,
    pub rejected_blacklist: usize,
    pub rejected_undated: usize,
    pub rejected_stale: usize,
    pub kept: usize,
}

/// Normalize a feed-supplied title: decode HTML entities, strip markup,
/// collapse whitespace, cap the length.
pub fn normalize_title(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // Length cap: 300 chars is plenty for a digest line
    if out.chars().count() > 300 {
        out = out.chars().take(300).collect();
    }

    out
}

/// Normalize, filter, and score one source's raw entries against the run
/// window and the relevance rules. Updates `stats` with per-reason rejects.
pub fn filter_and_score(
    ctx: &RunContext,
    source: &str,
    entries: Vec<RawEntry>,
    rules: &RelevanceRules,
    window_secs: u64,
    stats: &mut RunStats,
) -> Vec<Candidate> {
    let cutoff = ctx.unix().saturating_sub(window_secs);

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        stats.entries_seen += 1;
        let title = normalize_title(&entry.title);

        if title.is_empty() {
            stats.rejected_empty += 1;
            continue;
        }
        if rules.is_blacklisted(&title, &entry.link) {
            stats.rejected_blacklist += 1;
            continue;
        }
        let Some(published_at) = entry.published_at else {
            stats.rejected_undated += 1;
            continue;
        };
        if published_at < cutoff {
            stats.rejected_stale += 1;
            continue;
        }

        let relevance_score = rules.score(&title);
        out.push(Candidate {
            title,
            link: entry.link,
            published_at,
            relevance_score,
            source: source.to_string(),
        });
    }
    out
}

fn sort_ranked(candidates: &mut [Candidate]) {
    // Stable sort keeps encounter order for ties.
    candidates.sort_by(|a, b| {
        (b.relevance_score, b.published_at).cmp(&(a.relevance_score, a.published_at))
    });
}

/// Merge per-source candidate lists into the final ranked digest: optionally
/// truncate each source to `per_source_cap` first (so one prolific feed
/// cannot dominate), then rank globally and truncate to `max_items`.
pub fn rank(per_source: Vec<Vec<Candidate>>, opts: &AggregateOptions) -> Vec<Candidate> {
    let mut merged = Vec::new();
    for mut candidates in per_source {
        if let Some(cap) = opts.per_source_cap {
            sort_ranked(&mut candidates);
            candidates.truncate(cap);
        }
        merged.extend(candidates);
    }
    sort_ranked(&mut merged);
    merged.truncate(opts.max_items);
    merged
}

/// Run the aggregation once: fetch every source sequentially, tolerate
/// per-source failures, filter and score what arrived, rank and cap.
pub async fn run_once(
    ctx: &RunContext,
    providers: &[Box<dyn SourceProvider>],
    rules: &RelevanceRules,
    opts: &AggregateOptions,
) -> (Vec<Candidate>, RunStats) {
    let mut stats = RunStats::default();
    let mut per_source = Vec::with_capacity(providers.len());

    for p in providers {
        match p.fetch_latest().await {
            Ok(parsed) => {
                stats.sources_ok += 1;
                if parsed.truncated {
                    tracing::warn!(
                        source = p.name(),
                        salvaged = parsed.entries.len(),
                        "feed body malformed; kept what parsed"
                    );
                }
                let candidates = filter_and_score(
                    ctx,
                    p.name(),
                    parsed.entries,
                    rules,
                    opts.window_secs,
                    &mut stats,
                );
                per_source.push(candidates);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = p.name(), "source fetch failed");
                stats.sources_failed += 1;
            }
        }
    }

    let ranked = rank(per_source, opts);
    stats.kept = ranked.len();

    tracing::info!(
        sources_ok = stats.sources_ok,
        sources_failed = stats.sources_failed,
        entries = stats.entries_seen,
        empty = stats.rejected_empty,
        blacklisted = stats.rejected_blacklist,
        undated = stats.rejected_undated,
        stale = stats.rejected_stale,
        kept = stats.kept,
        "aggregation finished"
    );

    (ranked, stats)
}
