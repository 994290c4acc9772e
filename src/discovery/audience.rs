//! Audience profiler: a page's likers, what they like, and the category mix
//!
//! Seed resolution and the first likers walk are fail-fast. Everything after
//! that is isolated: a failed second-hop fetch, interest search, posts walk or
//! insights group is recorded in the report and the run carries on.

use super::aggregator::{rank_categories, rank_pages, CategoryCount};
use super::error::ScoutError;
use super::fanout::FanOut;
use super::paginator::Paginator;
use super::report::{AudienceReport, FailureNote};
use super::resolver::{resolve_seed, unique_ids, Seed};
use crate::graph::{GraphClient, GraphError, PostRecord};
use serde_json::Value;

const TOP_CATEGORIES: usize = 10;
const MAX_PAGE_SIZE: usize = 100;
const INSIGHTS_PERIOD: &str = "week";

/// Insight metrics fetched together, one paginated walk per group.
pub const INSIGHT_METRICS: &[&[&str]] = &[
    &[
        "page_stories",
        "page_storytellers",
        "page_stories_by_story_type",
        "page_storytellers_by_age_gender",
        "page_storytellers_by_country",
    ],
    &[
        "page_impressions",
        "page_impressions_unique",
        "page_impressions_paid",
        "page_impressions_organic",
        "page_impressions_viral",
        "page_impressions_by_country_unique",
        "page_impressions_by_age_gender_unique",
    ],
    &[
        "page_engaged_users",
        "page_post_engagements",
        "page_consumptions",
        "page_negative_feedback",
        "page_positive_feedback_by_type",
        "page_fans_online_per_day",
    ],
    &[
        "page_actions_post_reactions_like_total",
        "page_actions_post_reactions_love_total",
        "page_actions_post_reactions_wow_total",
        "page_actions_post_reactions_haha_total",
        "page_actions_post_reactions_sorry_total",
        "page_actions_post_reactions_anger_total",
    ],
    &["page_total_actions", "page_cta_clicks_logged_in_total", "page_website_clicks_logged_in_unique"],
    &[
        "page_fans",
        "page_fans_country",
        "page_fans_gender_age",
        "page_fan_adds",
        "page_fan_removes",
    ],
];

async fn drain<T: serde::de::DeserializeOwned>(pager: Result<Paginator<T>, GraphError>) -> Result<Vec<T>, GraphError> {
    pager?.collect_all().await
}

fn metric_name(record: &Value) -> &str {
    record.get("name").and_then(Value::as_str).unwrap_or_default()
}

pub struct AudienceProfiler {
    client: GraphClient,
    concurrency: usize,
}

impl AudienceProfiler {
    pub fn new(client: GraphClient, concurrency: usize) -> Self {
        Self { client, concurrency }
    }

    /// `limit` caps the seed's likers stream, each liker's likes stream, the
    /// seed's posts and each insights group.
    pub async fn profile(&self, seed: &Seed, limit: usize) -> Result<AudienceReport, ScoutError> {
        let page = resolve_seed(&self.client, seed).await?;
        let page_size = limit.clamp(1, MAX_PAGE_SIZE);

        let likers = self.client.page_likers(&page.id, page_size, limit)?.collect_all().await?;
        log::info!("👥 {} likers of page {}", likers.len(), page.id);

        let ids = unique_ids(likers.iter().map(|p| p.id.clone()));
        let client = &self.client;
        let outcome = FanOut::new(self.concurrency)
            .run(ids, move |id: String| async move { drain(client.page_likers(&id, page_size, limit)).await })
            .await;

        let mut failures: Vec<FailureNote> = outcome
            .failures
            .into_iter()
            .map(|f| FailureNote {
                stage: "likes",
                id: f.id,
                message: f.error.to_string(),
            })
            .collect();

        // Categories count every occurrence, before duplicates collapse
        let categories = rank_categories(likers.iter().chain(outcome.records.iter()), TOP_CATEGORIES);
        let likers = rank_pages(likers);
        let likers_of_likers = rank_pages(outcome.records);

        let top_interests = self.top_interests(&categories, &mut failures).await;
        let posts = self.posts(&page.id, page_size, limit, &mut failures).await;
        let metrics = self.metrics(&page.id, limit, &mut failures).await;

        log::info!(
            "🏁 {} likers, {} likers of likers, {} categories, {} interests, {} posts, {} metrics for {}",
            likers.len(),
            likers_of_likers.len(),
            categories.len(),
            top_interests.len(),
            posts.len(),
            metrics.len(),
            page.id
        );

        Ok(AudienceReport {
            page,
            likers,
            likers_of_likers,
            categories,
            top_interests,
            posts,
            metrics,
            failures,
        })
    }

    /// First ad interest hit for every `/`-separated segment of the top
    /// categories. Each distinct segment is searched once.
    async fn top_interests(&self, categories: &[CategoryCount], failures: &mut Vec<FailureNote>) -> Vec<Value> {
        let queries = unique_ids(
            categories
                .iter()
                .flat_map(|c| c.category.split('/'))
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        );

        let mut interests = Vec::new();
        for query in queries {
            match self.client.search_interests(&query).await {
                Ok(mut hits) if !hits.is_empty() => interests.push(hits.swap_remove(0)),
                Ok(_) => log::debug!("no ad interest matches `{}`", query),
                Err(e) => failures.push(FailureNote {
                    stage: "interests",
                    id: query,
                    message: e.to_string(),
                }),
            }
        }
        interests
    }

    async fn posts(
        &self,
        page_id: &str,
        page_size: usize,
        limit: usize,
        failures: &mut Vec<FailureNote>,
    ) -> Vec<PostRecord> {
        match drain(self.client.page_posts_capped(page_id, page_size, limit)).await {
            Ok(posts) => posts,
            Err(e) => {
                failures.push(FailureNote {
                    stage: "posts",
                    id: page_id.to_string(),
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Weekly insights for every metric group, sorted by metric name.
    async fn metrics(&self, page_id: &str, limit: usize, failures: &mut Vec<FailureNote>) -> Vec<Value> {
        let mut metrics = Vec::new();
        for group in INSIGHT_METRICS {
            match drain(self.client.page_insights(page_id, group, INSIGHTS_PERIOD, limit)).await {
                Ok(records) => metrics.extend(records),
                Err(e) => {
                    failures.push(FailureNote {
                        stage: "metrics",
                        id: group.join(","),
                        message: e.to_string(),
                    });
                }
            }
        }
        metrics.sort_by(|a, b| metric_name(a).cmp(metric_name(b)));
        metrics
    }
}
