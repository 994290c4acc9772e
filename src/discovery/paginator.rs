//! Cursor paginator over one collection endpoint
//!
//! Explicit state machine: every `next_page()` call costs exactly one request
//! until the stream is exhausted. Exhaustion happens when:
//! - the response has no `paging.next` link
//! - a fetched page is empty
//! - the item budget is reached (checked after the page, never mid-page)
//! - a request fails (the stream cannot be resumed)

use super::budget::Budget;
use super::source::PageSource;
use crate::graph::envelope::{decode_records, parse_envelope};
use crate::graph::{GraphError, Transport};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct Paginator<T> {
    transport: Arc<dyn Transport>,
    next_url: Option<String>,
    context: String,
    source_id: String,
    budget: Option<Budget>,
    pages_fetched: usize,
    _records: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Paginator<T> {
    /// `context` is the credential-free request description used in errors.
    pub fn new(transport: Arc<dyn Transport>, start_url: String, context: String, budget: Option<Budget>) -> Self {
        // A zero budget means fetch nothing
        let next_url = match budget {
            Some(b) if b.is_exhausted() => None,
            _ => Some(start_url),
        };

        Self {
            transport,
            next_url,
            source_id: context.clone(),
            context,
            budget,
            pages_fetched: 0,
            _records: PhantomData,
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_url.is_none()
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>, GraphError> {
        // Taking the cursor first leaves the paginator exhausted on any error below
        let url = match self.next_url.take() {
            Some(url) => url,
            None => return Ok(None),
        };

        self.pages_fetched += 1;
        let body = self.transport.get(&url).await?;
        let envelope = parse_envelope(body, &self.context)?;

        if envelope.data.is_empty() {
            log::debug!("{}: empty page {}, stream exhausted", self.source_id, self.pages_fetched);
            return Ok(None);
        }

        let records: Vec<T> = decode_records(envelope.data, &self.context)?;

        let budget_reached = match self.budget.as_mut() {
            Some(budget) => {
                budget.charge(records.len());
                budget.is_exhausted()
            }
            None => false,
        };

        if !budget_reached {
            self.next_url = envelope.next;
        }

        Ok(Some(records))
    }

    /// Drain every remaining page into one vector.
    pub async fn collect_all(mut self) -> Result<Vec<T>, GraphError> {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await? {
            records.extend(page);
        }
        Ok(records)
    }
}

#[async_trait]
impl<T> PageSource for Paginator<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn next_page(&mut self) -> Result<Option<Vec<T>>, GraphError> {
        Paginator::next_page(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::PageRecord;
    use crate::graph::ScriptedTransport;
    use serde_json::json;

    const START: &str = "https://graph.test/v2.10/9/likes?limit=2";

    fn ids(n: std::ops::Range<usize>) -> Vec<serde_json::Value> {
        n.map(|i| json!({"id": format!("p{}", i)})).collect()
    }

    fn paginator(transport: &Arc<ScriptedTransport>, budget: Option<Budget>) -> Paginator<PageRecord> {
        Paginator::new(transport.clone(), START.to_string(), "9/likes?limit=2".to_string(), budget)
    }

    #[tokio::test]
    async fn test_walks_until_no_next_link() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.pages("9/likes", vec![ids(0..2), ids(2..4), ids(4..5)]);

        let mut pager = paginator(&transport, None);
        let mut sizes = Vec::new();
        while let Some(page) = pager.next_page().await.unwrap() {
            sizes.push(page.len());
        }

        assert_eq!(sizes, vec![2, 2, 1]);
        assert!(pager.is_exhausted());
        assert_eq!(pager.pages_fetched(), 3);
        assert_eq!(transport.calls_to("9/likes"), 3);
    }

    #[tokio::test]
    async fn test_empty_page_ends_stream() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.pages("9/likes", vec![ids(0..2), vec![], ids(2..4)]);

        let records = paginator(&transport, None).collect_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(transport.calls_to("9/likes"), 2);
    }

    #[tokio::test]
    async fn test_budget_checked_after_whole_page() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.pages("9/likes", vec![ids(0..2), ids(2..4), ids(4..6)]);

        let records = paginator(&transport, Some(Budget::new(3))).collect_all().await.unwrap();

        // Second page crosses the budget but is kept whole
        assert_eq!(records.len(), 4);
        assert_eq!(transport.calls_to("9/likes"), 2);
    }

    #[tokio::test]
    async fn test_zero_budget_fetches_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.pages("9/likes", vec![ids(0..2)]);

        let mut pager = paginator(&transport, Some(Budget::new(0)));
        assert!(pager.is_exhausted());
        assert_eq!(pager.next_page().await.unwrap(), None);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_error_payload_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(
            "9/likes",
            json!({"data": ids(0..2), "paging": {"next": "https://scripted.local/v0/9/likes?after=x"}}),
        );
        transport.fail("9/likes", "(#100) Tried accessing nonexisting field");

        let mut pager = paginator(&transport, None);
        assert_eq!(pager.next_page().await.unwrap().map(|p| p.len()), Some(2));

        let err = pager.next_page().await.unwrap_err();
        match err {
            GraphError::RemoteApi { request, message, .. } => {
                assert_eq!(request, "9/likes?limit=2");
                assert!(message.contains("nonexisting field"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // Not restartable after a failure
        assert!(pager.is_exhausted());
        assert_eq!(pager.next_page().await.unwrap(), None);
        assert_eq!(transport.calls_to("9/likes"), 2);
    }

    #[tokio::test]
    async fn test_undecodable_record_is_malformed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push("9/likes", json!({"data": [{"name": "no id"}]}));

        let err = paginator(&transport, None).collect_all().await.unwrap_err();
        assert!(matches!(err, GraphError::MalformedResponse { .. }));
    }
}
