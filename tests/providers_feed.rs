// tests/providers_feed.rs
use qa_news_digest::ingest::providers::FeedProvider;
use qa_news_digest::ingest::types::SourceProvider;

// 'static fixtures via include_str! cover the from_fixture path.
const MOT_RSS: &str = include_str!("fixtures/mot_rss.xml");
const INFOQ_ATOM: &str = include_str!("fixtures/infoq_atom.xml");
const BROKEN_RSS: &str = include_str!("fixtures/broken_rss.xml");

#[tokio::test]
async fn rss_fixture_parses_all_items() {
    let provider = FeedProvider::from_fixture("https://example-mot.test/rss", MOT_RSS);

    let parsed = provider.fetch_latest().await.expect("rss parse ok");
    assert!(!parsed.truncated);
    assert_eq!(parsed.entries.len(), 4);

    // CDATA title with an ampersand comes through verbatim
    assert_eq!(
        parsed.entries[0].title,
        "Exploratory Testing Heuristics & When to Use Them"
    );
    assert!(parsed.entries[0].published_at.is_some());

    // GMT zone name is still a resolvable timestamp
    assert!(parsed.entries[1].published_at.is_some());

    // missing pubDate resolves to None, the entry itself is kept
    assert_eq!(parsed.entries[3].title, "Undated testing note");
    assert_eq!(parsed.entries[3].published_at, None);
}

#[tokio::test]
async fn atom_fixture_resolves_links_and_timestamps() {
    let provider = FeedProvider::from_fixture("https://example-queue.test/atom", INFOQ_ATOM);

    let parsed = provider.fetch_latest().await.expect("atom parse ok");
    assert!(!parsed.truncated);
    assert_eq!(parsed.entries.len(), 2);

    // rel="alternate" wins over rel="self"
    assert_eq!(
        parsed.entries[0].link,
        "https://example-queue.test/news/playwright-automation"
    );

    // published (08:30Z) is preferred over updated (08:45Z)
    assert_eq!(parsed.entries[0].published_at, Some(1_785_918_600));
    assert!(parsed.entries[1].published_at.is_some());
}

#[tokio::test]
async fn malformed_feed_salvages_leading_items() {
    let provider = FeedProvider::from_fixture("https://half.test/rss", BROKEN_RSS);

    let parsed = provider.fetch_latest().await.expect("salvage never hard-fails");
    assert!(parsed.truncated);
    assert_eq!(parsed.entries.len(), 2);
    assert_eq!(parsed.entries[0].title, "Regression suite timing");
    assert_eq!(parsed.entries[1].title, "Bug triage rituals");
}
