//! Audience Stats - who likes a page, what else they like, in which categories,
//! plus the page's latest posts and weekly insights
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin audience_stats -- -p 204 -t $TOKEN -l 100 -o audience.json
//! ```
//!
//! ## Environment Variables
//!
//! - GRAPH_API_BASE / GRAPH_API_VERSION - API endpoint (default: https://graph.facebook.com, v2.10)
//! - HTTP_TIMEOUT_SECS - Per-request timeout (default: 30)
//! - FANOUT_CONCURRENCY - Concurrent likes fetches (default: 4)
//! - PAGESCOUT_DB_PATH - SQLite database path (default: data/pagescout.db) - used when --backend sqlite
//! - RUST_LOG - Logging level (optional, default: info)

use clap::Parser;
use pagescout::cli::{build_client, init_logging, AudienceStatsCli};
use pagescout::discovery::Report;
use pagescout::output::ResultWriter;
use pagescout::{AudienceProfiler, ScoutConfig, ScoutError};

async fn run(cli: AudienceStatsCli) -> Result<(), ScoutError> {
    let mut config = ScoutConfig::from_env();
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    let seed = cli.seed.seed()?;
    let client = build_client(&config, &cli.credentials, cli.retries)?;

    log::info!("🚀 Starting audience profile");
    log::info!("   Seed: {:?}", seed);
    log::info!("   Limit: {} per stream", cli.limit);

    let report = AudienceProfiler::new(client, config.concurrency)
        .profile(&seed, cli.limit)
        .await?;

    for failure in report.failures() {
        log::warn!("⚠️  Skipped {} {}: {}", failure.stage, failure.id, failure.message);
    }

    let mut writer = ResultWriter::new(cli.sink.backend, cli.sink.output.clone(), config.db_path.clone())?;
    log::info!("📊 Backend: {}", writer.backend_type());
    writer.write_report(&report).await?;
    writer.flush().await?;

    if let Some(top) = report.categories.first() {
        log::info!("🏷️  Top category: {} ({})", top.category, top.count);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logging();

    let cli = AudienceStatsCli::parse();
    if let Err(e) = run(cli).await {
        log::error!("❌ {}", e);
        return Err(e.into());
    }
    Ok(())
}
