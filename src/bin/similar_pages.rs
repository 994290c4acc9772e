//! Similar Pages - ranks pages liked by the recent likers of a seed page
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin similar_pages -- -q "rust programming" -t $TOKEN -l 500 -o similar.json
//! cargo run --release --bin similar_pages -- -p 204 -i $APP_ID -s $APP_SECRET --backend sqlite
//! ```
//!
//! ## Environment Variables
//!
//! - GRAPH_API_BASE / GRAPH_API_VERSION - API endpoint (default: https://graph.facebook.com, v2.10)
//! - HTTP_TIMEOUT_SECS - Per-request timeout (default: 30)
//! - FANOUT_CONCURRENCY - Concurrent likes fetches (default: 4)
//! - RECENCY_DAYS - Recent posts window (default: 30)
//! - LIKERS_PAGE_FLOOR / LIKES_PER_USER - Paging sizes (default: 50, 100)
//! - PAGESCOUT_DB_PATH - SQLite database path (default: data/pagescout.db) - used when --backend sqlite
//! - RUST_LOG - Logging level (optional, default: info)

use clap::Parser;
use pagescout::cli::{build_client, init_logging, SimilarPagesCli};
use pagescout::discovery::Report;
use pagescout::output::ResultWriter;
use pagescout::{ScoutConfig, ScoutError, SimilarityResolver};

async fn run(cli: SimilarPagesCli) -> Result<(), ScoutError> {
    let mut config = ScoutConfig::from_env();
    if let Some(days) = cli.days {
        config.recency_days = days;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    let seed = cli.seed.seed()?;
    let client = build_client(&config, &cli.credentials, cli.retries)?;

    log::info!("🚀 Starting similar pages discovery");
    log::info!("   Seed: {:?}", seed);
    log::info!("   Budget: {} likers", cli.limit);
    log::info!("   Window: {} days", config.recency_days);
    log::info!("   Concurrency: {}", config.concurrency);

    let resolver = SimilarityResolver::new(client, config.discovery_settings());
    let report = resolver.resolve(&seed, cli.limit).await?;

    for failure in report.failures() {
        log::warn!("⚠️  Skipped {} {}: {}", failure.stage, failure.id, failure.message);
    }

    let mut writer = ResultWriter::new(cli.sink.backend, cli.sink.output.clone(), config.db_path.clone())?;
    log::info!("📊 Backend: {}", writer.backend_type());
    writer.write_report(&report).await?;
    writer.flush().await?;

    log::info!(
        "✅ {} related pages from {} likers of {} recent posts",
        report.pages.len(),
        report.likers,
        report.recent_posts
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logging();

    let cli = SimilarPagesCli::parse();
    if let Err(e) = run(cli).await {
        log::error!("❌ {}", e);
        return Err(e.into());
    }
    Ok(())
}
