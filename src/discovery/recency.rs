//! Recency window over a newest-first collection
//!
//! The remote feed is returned in descending `created_time` order, so the
//! first record older than the cutoff ends the walk: no later page can hold
//! anything newer. The ordering is trusted, not verified; an out-of-order
//! record is logged so an incomplete window does not go unnoticed.

use super::source::PageSource;
use crate::graph::{GraphError, PostRecord};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for PostRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.created_time
    }
}

/// Cutoff `days` before `now`, or `None` when `days` is negative or the
/// result falls outside the representable date range.
pub fn cutoff_days_before(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    if days < 0 {
        return None;
    }
    Duration::try_days(days).and_then(|span| now.checked_sub_signed(span))
}

/// Keeps records at or after the cutoff and stops fetching once an older one
/// appears.
///
/// The cut is per record, not a strict prefix: on the page where the first
/// older record shows up, a newer record that follows it is still kept. No
/// further page is requested after that.
pub struct RecencyWindow<S> {
    inner: S,
    cutoff: DateTime<Utc>,
    done: bool,
    last_seen: Option<DateTime<Utc>>,
    discarded: usize,
}

impl<S> RecencyWindow<S>
where
    S: PageSource,
    S::Item: Timestamped,
{
    pub fn new(inner: S, cutoff: DateTime<Utc>) -> Self {
        Self {
            inner,
            cutoff,
            done: false,
            last_seen: None,
            discarded: 0,
        }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// Records dropped for being older than the cutoff.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    fn note_order(&mut self, source_id: &str, ts: DateTime<Utc>) {
        if let Some(prev) = self.last_seen {
            if ts > prev {
                log::warn!(
                    "⚠️  {}: record at {} is newer than previous {}; feed is not newest-first, window may be incomplete",
                    source_id,
                    ts,
                    prev
                );
            }
        }
        self.last_seen = Some(ts);
    }

    pub async fn next_page(&mut self) -> Result<Option<Vec<S::Item>>, GraphError> {
        if self.done {
            return Ok(None);
        }

        let records = match self.inner.next_page().await {
            Ok(Some(records)) => records,
            Ok(None) => {
                self.done = true;
                return Ok(None);
            }
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        let source_id = self.inner.source_id().to_string();
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            let ts = record.timestamp();
            self.note_order(&source_id, ts);
            if ts >= self.cutoff {
                kept.push(record);
            } else {
                self.discarded += 1;
                // Anything past this point in the feed is older still
                self.done = true;
            }
        }

        if self.done {
            log::debug!("{}: reached cutoff {}, stopping", source_id, self.cutoff);
        }

        Ok(Some(kept))
    }

    /// Every in-window record, in feed order.
    pub async fn collect(mut self) -> Result<Vec<S::Item>, GraphError> {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await? {
            records.extend(page);
        }
        Ok(records)
    }
}

#[async_trait]
impl<S> PageSource for RecencyWindow<S>
where
    S: PageSource,
    S::Item: Timestamped,
{
    type Item = S::Item;

    fn source_id(&self) -> &str {
        self.inner.source_id()
    }

    async fn next_page(&mut self) -> Result<Option<Vec<S::Item>>, GraphError> {
        RecencyWindow::next_page(self).await
    }
}
