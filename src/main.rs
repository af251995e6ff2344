//! QA News Digest — Binary Entrypoint
//! One invocation performs one aggregate-and-publish cycle, then exits.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qa_news_digest::config::DigestConfig;
use qa_news_digest::ingest::providers::FeedProvider;
use qa_news_digest::ingest::types::SourceProvider;
use qa_news_digest::ingest::{self, AggregateOptions, RunContext};
use qa_news_digest::notify::{self, TelegramNotifier};
use qa_news_digest::relevance::RelevanceRules;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = DigestConfig::load()?;
    let rules = RelevanceRules::from_config(&cfg.relevance);
    let opts = AggregateOptions {
        window_secs: cfg.window().as_secs(),
        per_source_cap: cfg.digest.per_source_cap,
        max_items: cfg.digest.max_items,
    };

    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::with_capacity(cfg.feeds.len());
    for url in &cfg.feeds {
        providers.push(Box::new(FeedProvider::from_url(url.as_str(), cfg.fetch_timeout())?));
    }

    tracing::info!(feeds = providers.len(), "collecting news");
    let ctx = RunContext::now();
    let (candidates, _stats) = ingest::run_once(&ctx, &providers, &rules, &opts).await;

    if candidates.is_empty() {
        tracing::warn!("no fresh articles found; nothing to send");
        return Ok(());
    }

    let text = notify::render_digest(&cfg.digest.title, ctx.started_at, &candidates);
    let notifier = TelegramNotifier::from_env().with_timeout(cfg.send_timeout());
    if let Err(e) = notifier.send_digest(&text).await {
        tracing::error!(error = ?e, "digest delivery failed");
    }

    Ok(())
}
