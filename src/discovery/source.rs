//! Page source seam shared by paginators, recency windows and filters

use crate::graph::GraphError;
use async_trait::async_trait;

/// A forward-only stream of record pages.
///
/// `Ok(None)` means the source is exhausted and must not be polled again.
/// `Ok(Some(records))` may carry an empty vector when every record of a
/// fetched page was filtered out; the source is still live in that case.
#[async_trait]
pub trait PageSource: Send {
    type Item: Send;

    /// Identifier used in logs and failure reports.
    fn source_id(&self) -> &str;

    async fn next_page(&mut self) -> Result<Option<Vec<Self::Item>>, GraphError>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for Box<S> {
    type Item = S::Item;

    fn source_id(&self) -> &str {
        (**self).source_id()
    }

    async fn next_page(&mut self) -> Result<Option<Vec<Self::Item>>, GraphError> {
        (**self).next_page().await
    }
}

/// Keeps only the records matching a predicate.
pub struct Filtered<S, F> {
    inner: S,
    keep: F,
}

impl<S, F> Filtered<S, F>
where
    S: PageSource,
    F: Fn(&S::Item) -> bool + Send,
{
    pub fn new(inner: S, keep: F) -> Self {
        Self { inner, keep }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S, F> PageSource for Filtered<S, F>
where
    S: PageSource,
    F: Fn(&S::Item) -> bool + Send,
{
    type Item = S::Item;

    fn source_id(&self) -> &str {
        self.inner.source_id()
    }

    async fn next_page(&mut self) -> Result<Option<Vec<Self::Item>>, GraphError> {
        let page = self.inner.next_page().await?;
        Ok(page.map(|records| records.into_iter().filter(|r| (self.keep)(r)).collect()))
    }
}
