//! Graph API client: URL construction plus one paginator per collection edge

use super::envelope::{decode_records, parse_envelope};
use super::error::GraphError;
use super::request::{Credential, RequestDescriptor};
use super::transport::Transport;
use super::types::{EdgeRecord, PageRecord, PostRecord};
use crate::discovery::budget::Budget;
use crate::discovery::paginator::Paginator;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v2.10";

/// Fields requested for every page on a `likes` edge. The edge returns only
/// `id` and `name` unless asked.
pub const PAGE_FIELDS: &str = "id,name,category,link,fan_count";

#[derive(Clone)]
pub struct GraphClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    credential: Credential,
}

impl GraphClient {
    pub fn new(transport: Arc<dyn Transport>, api_base: &str, api_version: &str, credential: Credential) -> Self {
        Self {
            transport,
            base_url: format!("{}/{}", api_base.trim_end_matches('/'), api_version.trim_matches('/')),
            credential,
        }
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Absolute URL for a descriptor, with the credential appended.
    pub fn build_url(&self, request: &RequestDescriptor) -> Result<String, GraphError> {
        let mut params = request.params.clone();
        params.push(("access_token".to_string(), self.credential.as_param()));

        let raw = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));
        Url::parse_with_params(&raw, &params)
            .map(String::from)
            .map_err(|e| GraphError::Transport {
                request: request.to_string(),
                message: format!("invalid URL: {}", e),
            })
    }

    /// Paginator over any collection edge.
    pub fn paginate<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
        budget: Option<Budget>,
    ) -> Result<Paginator<T>, GraphError> {
        let url = self.build_url(&request)?;
        Ok(Paginator::new(self.transport.clone(), url, request.to_string(), budget))
    }

    /// First page of a page search. Only one request is made.
    pub async fn search_pages(&self, query: &str, limit: usize) -> Result<Vec<PageRecord>, GraphError> {
        let request = RequestDescriptor::new("search")
            .param("q", query)
            .param("type", "page")
            .param("limit", limit);
        let context = request.to_string();
        let body = self.transport.get(&self.build_url(&request)?).await?;
        let envelope = parse_envelope(body, &context)?;
        decode_records(envelope.data, &context)
    }

    /// A page's feed, newest first.
    pub fn page_posts(&self, page_id: &str, page_size: usize) -> Result<Paginator<PostRecord>, GraphError> {
        let request = RequestDescriptor::new(format!("{}/posts", page_id)).param("limit", page_size);
        self.paginate(request, None)
    }

    /// A page's feed, capped at `limit` records.
    pub fn page_posts_capped(
        &self,
        page_id: &str,
        page_size: usize,
        limit: usize,
    ) -> Result<Paginator<PostRecord>, GraphError> {
        let request = RequestDescriptor::new(format!("{}/posts", page_id)).param("limit", page_size);
        self.paginate(request, Some(Budget::new(limit)))
    }

    /// Ad interests matching `query`, first page only.
    pub async fn search_interests(&self, query: &str) -> Result<Vec<Value>, GraphError> {
        let request = RequestDescriptor::new("search").param("q", query).param("type", "adinterest");
        let context = request.to_string();
        let body = self.transport.get(&self.build_url(&request)?).await?;
        Ok(parse_envelope(body, &context)?.data)
    }

    /// Insights for a group of metrics over `period` (`day`, `week`, ...).
    ///
    /// The insights cursor steps through time rather than running dry, so
    /// the walk is capped at `limit` metric records.
    pub fn page_insights(
        &self,
        page_id: &str,
        metrics: &[&str],
        period: &str,
        limit: usize,
    ) -> Result<Paginator<Value>, GraphError> {
        let request = RequestDescriptor::new(format!("{}/insights", page_id))
            .param("metric", metrics.join(","))
            .param("period", period);
        self.paginate(request, Some(Budget::new(limit)))
    }

    /// Profiles that liked a post, with their profile type.
    pub fn post_likers(&self, post_id: &str, page_size: usize) -> Result<Paginator<EdgeRecord>, GraphError> {
        let request = RequestDescriptor::new(format!("{}/likes", post_id))
            .param("limit", page_size)
            .param("fields", "profile_type");
        self.paginate(request, None)
    }

    /// A page's `likes` edge, capped at `limit` records.
    pub fn page_likers(&self, page_id: &str, page_size: usize, limit: usize) -> Result<Paginator<PageRecord>, GraphError> {
        let request = RequestDescriptor::new(format!("{}/likes", page_id))
            .param("limit", page_size)
            .param("fields", PAGE_FIELDS);
        self.paginate(request, Some(Budget::new(limit)))
    }

    /// Pages a user likes, capped at `limit` records.
    pub fn user_likes(&self, user_id: &str, page_size: usize, limit: usize) -> Result<Paginator<PageRecord>, GraphError> {
        let request = RequestDescriptor::new(format!("{}/likes", user_id))
            .param("limit", page_size)
            .param("fields", PAGE_FIELDS);
        self.paginate(request, Some(Budget::new(limit)))
    }
}
