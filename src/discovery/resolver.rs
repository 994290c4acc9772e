//! Similarity resolver: seed → recent posts → likers → their likes → ranking
//!
//! Seed resolution and the recent-posts walk are fail-fast. Per-post liker
//! streams and per-user likes fetches are isolated: a failure drops that unit
//! and is recorded in the report.

use super::aggregator::rank_pages;
use super::budget::Budget;
use super::error::ScoutError;
use super::fanout::{FanOut, DEFAULT_CONCURRENCY};
use super::multiplexer::multiplex;
use super::recency::{cutoff_days_before, RecencyWindow};
use super::report::{FailureNote, SimilarityReport};
use super::source::Filtered;
use crate::graph::{EdgeRecord, GraphClient, PageRecord};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Where a run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    PageId(String),
    /// Resolved to the first page search hit
    Query(String),
}

impl Seed {
    /// Builds a seed from CLI-style options; a page id wins over a query.
    pub fn from_options(page_id: Option<String>, query: Option<String>) -> Option<Self> {
        match (page_id, query) {
            (Some(id), _) if !id.is_empty() => Some(Seed::PageId(id)),
            (_, Some(q)) if !q.is_empty() => Some(Seed::Query(q)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverySettings {
    pub recency_days: i64,
    pub concurrency: usize,
    pub posts_page_size: usize,
    /// Lower bound for the per-post likers page size
    pub likers_page_floor: usize,
    /// Cap on each liker's `likes` stream
    pub likes_per_user: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            recency_days: 30,
            concurrency: DEFAULT_CONCURRENCY,
            posts_page_size: 100,
            likers_page_floor: 50,
            likes_per_user: 100,
        }
    }
}

/// Page id for a seed. Searches make a single request for one hit.
pub async fn resolve_seed(client: &GraphClient, seed: &Seed) -> Result<PageRecord, ScoutError> {
    match seed {
        Seed::PageId(id) => Ok(PageRecord::from_id(id.as_str())),
        Seed::Query(query) => {
            let mut hits = client.search_pages(query, 1).await?;
            if hits.is_empty() {
                return Err(ScoutError::NotFound { query: query.clone() });
            }
            let page = hits.swap_remove(0);
            log::info!("🔎 Query `{}` resolved to page {} ({})", query, page.id, page.name().unwrap_or("unnamed"));
            Ok(page)
        }
    }
}

/// Ids in first-seen order, duplicates dropped.
pub(crate) fn unique_ids<I: IntoIterator<Item = String>>(ids: I) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

pub struct SimilarityResolver {
    client: GraphClient,
    settings: DiscoverySettings,
}

impl SimilarityResolver {
    pub fn new(client: GraphClient, settings: DiscoverySettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    pub async fn resolve(&self, seed: &Seed, limit: usize) -> Result<SimilarityReport, ScoutError> {
        self.resolve_at(seed, limit, Utc::now()).await
    }

    /// Same as [`resolve`](Self::resolve) with an explicit clock for the recency window.
    pub async fn resolve_at(&self, seed: &Seed, limit: usize, now: DateTime<Utc>) -> Result<SimilarityReport, ScoutError> {
        let seed = resolve_seed(&self.client, seed).await?;

        let cutoff = cutoff_days_before(now, self.settings.recency_days).ok_or_else(|| {
            ScoutError::Config(format!(
                "recency window of {} days is out of range",
                self.settings.recency_days
            ))
        })?;
        let posts_feed = self.client.page_posts(&seed.id, self.settings.posts_page_size)?;
        let posts = RecencyWindow::new(posts_feed, cutoff).collect().await?;

        if posts.is_empty() {
            return Err(ScoutError::NoRecentActivity {
                page_id: seed.id,
                days: self.settings.recency_days,
            });
        }
        log::info!("📰 {} posts since {} on page {}", posts.len(), cutoff.format("%Y-%m-%d"), seed.id);

        let page_size = (limit / posts.len()).max(self.settings.likers_page_floor);
        let mut sources = Vec::with_capacity(posts.len());
        for post in &posts {
            let likers = self
                .client
                .post_likers(&post.id, page_size)?
                .with_source_id(post.id.clone());
            sources.push(Filtered::new(likers, |edge: &EdgeRecord| edge.is_user()));
        }

        let mut budget = Budget::new(limit);
        let likers_outcome = multiplex(sources, &mut budget).await;
        let mut failures: Vec<FailureNote> = likers_outcome
            .failures
            .into_iter()
            .map(|f| FailureNote {
                stage: "likers",
                id: f.source_id,
                message: f.error.to_string(),
            })
            .collect();

        let likers = unique_ids(likers_outcome.records.into_iter().map(|edge| edge.id));
        log::info!(
            "👥 {} unique likers from {} pages over {} rounds",
            likers.len(),
            likers_outcome.pages,
            likers_outcome.rounds
        );

        let client = &self.client;
        let per_user = self.settings.likes_per_user;
        let likes_outcome = FanOut::new(self.settings.concurrency)
            .run(likers.clone(), move |user_id: String| async move {
                match client.user_likes(&user_id, per_user, per_user) {
                    Ok(pager) => pager.collect_all().await,
                    Err(e) => Err(e),
                }
            })
            .await;

        failures.extend(likes_outcome.failures.into_iter().map(|f| FailureNote {
            stage: "likes",
            id: f.id,
            message: f.error.to_string(),
        }));

        let pages = rank_pages(likes_outcome.records);
        log::info!("🏁 {} candidate pages ranked for {}", pages.len(), seed.id);

        Ok(SimilarityReport {
            seed,
            recent_posts: posts.len(),
            likers: likers.len(),
            failures,
            pages,
        })
    }
}
