// tests/digest_scenarios.rs
// End-to-end runs over mock sources: aggregate, then render what a real run
// would hand to the notifier.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use qa_news_digest::ingest::types::{FeedParse, RawEntry, SourceProvider};
use qa_news_digest::ingest::{self, AggregateOptions, RunContext};
use qa_news_digest::notify;
use qa_news_digest::relevance::RelevanceRules;

fn ctx() -> RunContext {
    RunContext::at(Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap())
}

fn opts() -> AggregateOptions {
    AggregateOptions {
        window_secs: 24 * 3600,
        per_source_cap: None,
        max_items: 9,
    }
}

fn rules() -> RelevanceRules {
    RelevanceRules::new(
        5,
        &["qa".into(), "testing".into(), "automation".into()],
        &["/jobs/".into(), "hiring".into()],
    )
}

struct OneEntryFeed {
    url: &'static str,
    title: &'static str,
    link: &'static str,
    age_secs: u64,
}

#[async_trait]
impl SourceProvider for OneEntryFeed {
    async fn fetch_latest(&self) -> Result<FeedParse> {
        Ok(FeedParse {
            entries: vec![RawEntry {
                title: self.title.to_string(),
                link: self.link.to_string(),
                published_at: Some(ctx().unix() - self.age_secs),
            }],
            truncated: false,
        })
    }
    fn name(&self) -> &str {
        self.url
    }
}

struct TimedOutFeed;

#[async_trait]
impl SourceProvider for TimedOutFeed {
    async fn fetch_latest(&self) -> Result<FeedParse> {
        Err(anyhow!("operation timed out after 12s"))
    }
    fn name(&self) -> &str {
        "https://slow.test/rss"
    }
}

// Scenario: three sources, titles with 0, 1 and 2 keyword matches. Highest
// score first, all three present, three numbered lines in the message.
#[tokio::test]
async fn three_sources_rank_by_match_count() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(OneEntryFeed {
            url: "https://a.test/rss",
            title: "Release calendar",
            link: "https://a.test/calendar",
            age_secs: 300,
        }),
        Box::new(OneEntryFeed {
            url: "https://b.test/rss",
            title: "Testing roundup",
            link: "https://b.test/roundup",
            age_secs: 300,
        }),
        Box::new(OneEntryFeed {
            url: "https://c.test/rss",
            title: "QA testing digest",
            link: "https://c.test/digest",
            age_secs: 300,
        }),
    ];

    let (candidates, _) = ingest::run_once(&ctx(), &providers, &rules(), &opts()).await;

    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].link, "https://c.test/digest"); // 2 matches
    assert_eq!(candidates[1].link, "https://b.test/roundup"); // 1 match
    assert_eq!(candidates[2].link, "https://a.test/calendar"); // 0 matches

    let text = notify::render_digest("QA Summary", ctx().started_at, &candidates);
    assert!(text.contains("1. <b>QA testing digest</b>"));
    assert!(text.contains("2. <b>Testing roundup</b>"));
    assert!(text.contains("3. <b>Release calendar</b>"));
}

// Scenario: one source times out; the run completes on the remaining ones.
#[tokio::test]
async fn timed_out_source_is_isolated() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(TimedOutFeed),
        Box::new(OneEntryFeed {
            url: "https://b.test/rss",
            title: "Testing roundup",
            link: "https://b.test/roundup",
            age_secs: 300,
        }),
    ];

    let (candidates, stats) = ingest::run_once(&ctx(), &providers, &rules(), &opts()).await;

    assert_eq!(stats.sources_failed, 1);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].link, "https://b.test/roundup");
}

// Scenario: everything is older than the window; output is empty, so a real
// run would log a warning and skip delivery entirely.
#[tokio::test]
async fn all_entries_stale_yields_empty_output() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(OneEntryFeed {
            url: "https://a.test/rss",
            title: "QA testing archive",
            link: "https://a.test/archive",
            age_secs: 48 * 3600,
        }),
        Box::new(OneEntryFeed {
            url: "https://b.test/rss",
            title: "Testing retrospective",
            link: "https://b.test/retro",
            age_secs: 30 * 3600,
        }),
    ];

    let (candidates, stats) = ingest::run_once(&ctx(), &providers, &rules(), &opts()).await;

    assert!(candidates.is_empty());
    assert_eq!(stats.rejected_stale, 2);
}

// Scenario: a job posting is excluded no matter how fresh or keyword-rich.
#[tokio::test]
async fn job_postings_are_excluded() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(OneEntryFeed {
        url: "https://a.test/rss",
        title: "Senior QA Engineer - hiring now",
        link: "https://a.test/jobs/123",
        age_secs: 60,
    })];

    let (candidates, stats) = ingest::run_once(&ctx(), &providers, &rules(), &opts()).await;

    assert!(candidates.is_empty());
    assert_eq!(stats.rejected_blacklist, 1);
}
