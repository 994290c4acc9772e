//! Bounded-concurrency fan-out over independent ids
//!
//! Workers never share a collection: each returns its own records and the
//! single coordinator loop below merges them as they complete. A failed id is
//! logged and reported, its siblings keep running.

use crate::graph::GraphError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::future::Future;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug)]
pub struct FanOutFailure<I> {
    pub id: I,
    pub error: GraphError,
}

#[derive(Debug)]
pub struct FanOutOutcome<I, T> {
    pub records: Vec<T>,
    pub failures: Vec<FanOutFailure<I>>,
    /// Ids whose fetch finished successfully
    pub completed: usize,
    /// Ids never dispatched because the record ceiling was reached
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct FanOut {
    concurrency: usize,
    record_ceiling: Option<usize>,
}

impl Default for FanOut {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl FanOut {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            record_ceiling: None,
        }
    }

    /// Stop dispatching new ids once this many records are merged.
    /// In-flight fetches still complete.
    pub fn with_record_ceiling(mut self, ceiling: usize) -> Self {
        self.record_ceiling = Some(ceiling);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn ceiling_reached(&self, merged: usize) -> bool {
        self.record_ceiling.map_or(false, |c| merged >= c)
    }

    pub async fn run<I, T, F, Fut>(&self, ids: Vec<I>, fetch: F) -> FanOutOutcome<I, T>
    where
        I: Clone + Display,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<Vec<T>, GraphError>>,
    {
        let total = ids.len();
        let mut pending = ids.into_iter();
        let mut in_flight = FuturesUnordered::new();
        let mut outcome = FanOutOutcome {
            records: Vec::new(),
            failures: Vec::new(),
            completed: 0,
            skipped: 0,
        };

        loop {
            // The cap is only enforced here, when dispatching
            while in_flight.len() < self.concurrency && !self.ceiling_reached(outcome.records.len()) {
                let id = match pending.next() {
                    Some(id) => id,
                    None => break,
                };
                let work = fetch(id.clone());
                in_flight.push(async move { (id, work.await) });
            }

            let (id, result) = match in_flight.next().await {
                Some(done) => done,
                None => break,
            };

            match result {
                Ok(records) => {
                    log::debug!("{}: {} records", id, records.len());
                    outcome.completed += 1;
                    outcome.records.extend(records);
                }
                Err(error) => {
                    log::warn!("⚠️  Fetch for {} failed: {}", id, error);
                    outcome.failures.push(FanOutFailure { id, error });
                }
            }
        }

        outcome.skipped = pending.count();
        log::info!(
            "📥 Fan-out done: {}/{} ids ok, {} failed, {} skipped, {} records",
            outcome.completed,
            total,
            outcome.failures.len(),
            outcome.skipped,
            outcome.records.len()
        );

        outcome
    }
}
