//! Finished run reports, as handed to result sinks

use super::aggregator::CategoryCount;
use crate::graph::{PageRecord, PostRecord};
use serde::Serialize;
use serde_json::{json, Value};

/// A per-unit failure that was isolated instead of ending the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureNote {
    /// Pipeline step the failure happened in (`likers`, `likes`, `interests`, `posts`, `metrics`)
    pub stage: &'static str,
    /// Post, user or page id, interest query or metric group that was dropped
    pub id: String,
    pub message: String,
}

pub trait Report: Send + Sync {
    fn seed_id(&self) -> &str;

    /// The `{"result": [...]}` document.
    fn document(&self) -> Value;

    /// Ranked page lists keyed by section name, for row-oriented sinks.
    fn ranked_sections(&self) -> Vec<(&'static str, &[PageRecord])>;

    fn failures(&self) -> &[FailureNote];
}

/// Pages related to a seed, ranked by how many of its likers like them.
#[derive(Debug, Clone)]
pub struct SimilarityReport {
    pub seed: PageRecord,
    pub recent_posts: usize,
    /// Unique first-hop likers that were fanned out over
    pub likers: usize,
    pub failures: Vec<FailureNote>,
    pub pages: Vec<PageRecord>,
}

impl Report for SimilarityReport {
    fn seed_id(&self) -> &str {
        &self.seed.id
    }

    fn document(&self) -> Value {
        json!({ "result": self.pages })
    }

    fn ranked_sections(&self) -> Vec<(&'static str, &[PageRecord])> {
        vec![("similar", self.pages.as_slice())]
    }

    fn failures(&self) -> &[FailureNote] {
        &self.failures
    }
}

/// Who likes a page, what else they like, the category mix, and the page's
/// own posts and insights.
#[derive(Debug, Clone)]
pub struct AudienceReport {
    pub page: PageRecord,
    pub likers: Vec<PageRecord>,
    pub likers_of_likers: Vec<PageRecord>,
    pub categories: Vec<CategoryCount>,
    /// First ad interest hit per top category segment
    pub top_interests: Vec<Value>,
    pub posts: Vec<PostRecord>,
    /// Insight records sorted by metric name
    pub metrics: Vec<Value>,
    pub failures: Vec<FailureNote>,
}

impl Report for AudienceReport {
    fn seed_id(&self) -> &str {
        &self.page.id
    }

    fn document(&self) -> Value {
        json!({
            "result": [
                {"page": self.page},
                {"likers": self.likers},
                {"likers_of_likers": self.likers_of_likers},
                {"categories": self.categories},
                {"top_interests": self.top_interests},
                {"posts": self.posts},
                {"metrics": self.metrics},
            ]
        })
    }

    fn ranked_sections(&self) -> Vec<(&'static str, &[PageRecord])> {
        vec![
            ("likers", self.likers.as_slice()),
            ("likers_of_likers", self.likers_of_likers.as_slice()),
        ]
    }

    fn failures(&self) -> &[FailureNote] {
        &self.failures
    }
}
