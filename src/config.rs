use crate::discovery::fanout::DEFAULT_CONCURRENCY;
use crate::discovery::DiscoverySettings;
use crate::graph::client::{DEFAULT_API_BASE, DEFAULT_API_VERSION};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration loaded from environment variables
///
/// CLI flags override these values in the binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutConfig {
    pub api_base: String,
    pub api_version: String,
    pub http_timeout: Duration,
    pub concurrency: usize,
    pub recency_days: i64,
    pub posts_page_size: usize,
    pub likers_page_floor: usize,
    pub likes_per_user: usize,
    /// SQLite result store used when `--backend sqlite` has no `--output`
    pub db_path: PathBuf,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ScoutConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `GRAPH_API_BASE` (default: https://graph.facebook.com)
    /// - `GRAPH_API_VERSION` (default: v2.10)
    /// - `HTTP_TIMEOUT_SECS` (default: 30)
    /// - `FANOUT_CONCURRENCY` (default: 4)
    /// - `RECENCY_DAYS` (default: 30, also used for negative values)
    /// - `POSTS_PAGE_SIZE` (default: 100)
    /// - `LIKERS_PAGE_FLOOR` (default: 50)
    /// - `LIKES_PER_USER` (default: 100)
    /// - `PAGESCOUT_DB_PATH` (default: data/pagescout.db)
    pub fn from_env() -> Self {
        Self {
            api_base: env::var("GRAPH_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            api_version: env::var("GRAPH_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 30)),
            concurrency: parse_var("FANOUT_CONCURRENCY", DEFAULT_CONCURRENCY),
            recency_days: Some(parse_var("RECENCY_DAYS", 30)).filter(|days| *days >= 0).unwrap_or(30),
            posts_page_size: parse_var("POSTS_PAGE_SIZE", 100),
            likers_page_floor: parse_var("LIKERS_PAGE_FLOOR", 50),
            likes_per_user: parse_var("LIKES_PER_USER", 100),
            db_path: env::var("PAGESCOUT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/pagescout.db")),
        }
    }

    pub fn discovery_settings(&self) -> DiscoverySettings {
        DiscoverySettings {
            recency_days: self.recency_days,
            concurrency: self.concurrency,
            posts_page_size: self.posts_page_size,
            likers_page_floor: self.likers_page_floor,
            likes_per_user: self.likes_per_user,
        }
    }
}
