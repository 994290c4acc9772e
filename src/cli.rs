//! Command-line surface shared by the binaries

use crate::config::ScoutConfig;
use crate::discovery::{ScoutError, Seed};
use crate::graph::{Credential, ExponentialBackoff, GraphClient, HttpTransport, RetryingTransport, Transport};
use crate::output::BackendType;
use clap::{Args, Parser};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct SeedArgs {
    /// Seed page id
    #[arg(short = 'p', long = "page_id")]
    pub page_id: Option<String>,

    /// Search query; the first matching page becomes the seed
    #[arg(short = 'q', long = "query")]
    pub query: Option<String>,
}

impl SeedArgs {
    pub fn seed(&self) -> Result<Seed, ScoutError> {
        Seed::from_options(self.page_id.clone(), self.query.clone())
            .ok_or_else(|| ScoutError::Config("either --page_id or --query must be non-empty".to_string()))
    }
}

#[derive(Debug, Clone, Args)]
pub struct CredentialArgs {
    /// Session access token
    #[arg(short = 't', long = "access_token", env = "GRAPH_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// App id, used with --app_secret when no token is given
    #[arg(short = 'i', long = "app_id", env = "GRAPH_APP_ID")]
    pub app_id: Option<String>,

    #[arg(short = 's', long = "app_secret", env = "GRAPH_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,
}

impl CredentialArgs {
    pub fn credential(&self) -> Result<Credential, ScoutError> {
        Credential::resolve(self.access_token.clone(), self.app_id.clone(), self.app_secret.clone()).ok_or_else(|| {
            ScoutError::Config("an --access_token or both --app_id and --app_secret are required".to_string())
        })
    }
}

/// Upper bound for `--days`, about a thousand years
const MAX_RECENCY_DAYS: i64 = 365_000;

#[derive(Debug, Clone, Args)]
pub struct SinkArgs {
    /// Output file (JSON) or database (SQLite); JSON goes to stdout when omitted
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Result sink: json or sqlite
    #[arg(long, default_value = "json", value_parser = BackendType::from_str)]
    pub backend: BackendType,
}

#[derive(Debug, Parser)]
#[command(name = "similar_pages")]
#[command(about = "Rank pages liked by the people who recently liked a seed page's posts")]
pub struct SimilarPagesCli {
    #[command(flatten)]
    pub seed: SeedArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Budget of first-hop likers
    #[arg(short = 'l', long = "limit", default_value_t = 1000)]
    pub limit: usize,

    /// Recency window in days (overrides RECENCY_DAYS)
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=MAX_RECENCY_DAYS))]
    pub days: Option<i64>,

    /// Fan-out concurrency cap (overrides FANOUT_CONCURRENCY)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Transport retries for throttling and network errors
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    #[command(flatten)]
    pub sink: SinkArgs,
}

#[derive(Debug, Parser)]
#[command(name = "audience_stats")]
#[command(about = "Profile a page's likers, the pages they like and their categories")]
pub struct AudienceStatsCli {
    #[command(flatten)]
    pub seed: SeedArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Cap on the seed's likers and on each liker's likes
    #[arg(short = 'l', long = "limit", default_value_t = 100)]
    pub limit: usize,

    /// Fan-out concurrency cap (overrides FANOUT_CONCURRENCY)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Transport retries for throttling and network errors
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    #[command(flatten)]
    pub sink: SinkArgs,
}

/// Logs go to stderr so stdout stays clean for the JSON document.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
}

/// HTTP transport, wrapped in retries when `retries > 0`.
pub fn build_transport(config: &ScoutConfig, retries: u32) -> Result<Arc<dyn Transport>, ScoutError> {
    let http = HttpTransport::new(config.http_timeout)?;
    if retries == 0 {
        return Ok(Arc::new(http));
    }

    log::info!("🔁 Retrying transient errors up to {} times", retries);
    let backoff = ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(30), retries);
    Ok(Arc::new(RetryingTransport::new(http, backoff)))
}

pub fn build_client(config: &ScoutConfig, credentials: &CredentialArgs, retries: u32) -> Result<GraphClient, ScoutError> {
    let credential = credentials.credential()?;
    let transport = build_transport(config, retries)?;
    Ok(GraphClient::new(transport, &config.api_base, &config.api_version, credential))
}
