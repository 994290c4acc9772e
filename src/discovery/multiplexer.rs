//! Round-robin multiplexer over independent page sources
//!
//! Every live source gives at most one page per round, so a single deep
//! source cannot spend the whole budget before the others are sampled. The
//! budget is checked after each page: the round may end early, a page never
//! gets split.

use super::budget::Budget;
use super::source::PageSource;
use crate::graph::GraphError;

/// A source that was dropped after an error.
#[derive(Debug)]
pub struct SourceFailure {
    pub source_id: String,
    pub error: GraphError,
}

#[derive(Debug)]
pub struct MultiplexOutcome<T> {
    pub records: Vec<T>,
    pub failures: Vec<SourceFailure>,
    /// Rounds started, including a final partial one
    pub rounds: usize,
    /// Non-empty pages drawn across all sources
    pub pages: usize,
    /// Pages drawn per source, in input order
    pub contributions: Vec<(String, usize)>,
}

impl<T> MultiplexOutcome<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
            rounds: 0,
            pages: 0,
            contributions: Vec::new(),
        }
    }
}

pub async fn multiplex<S: PageSource>(sources: Vec<S>, budget: &mut Budget) -> MultiplexOutcome<S::Item> {
    let mut outcome = MultiplexOutcome::new();
    outcome.contributions = sources.iter().map(|s| (s.source_id().to_string(), 0)).collect();

    let mut active: Vec<(usize, S)> = sources.into_iter().enumerate().collect();

    if budget.is_exhausted() {
        log::debug!("Budget exhausted before any draw, skipping {} sources", active.len());
        return outcome;
    }

    while !active.is_empty() {
        outcome.rounds += 1;
        let mut still_active = Vec::with_capacity(active.len());

        for (idx, mut source) in active {
            match source.next_page().await {
                Ok(Some(records)) => {
                    budget.charge(records.len());
                    outcome.pages += 1;
                    outcome.contributions[idx].1 += 1;
                    outcome.records.extend(records);

                    if budget.is_exhausted() {
                        log::debug!(
                            "Budget reached ({}/{}) in round {} after {}",
                            budget.consumed(),
                            budget.limit(),
                            outcome.rounds,
                            source.source_id()
                        );
                        return outcome;
                    }
                    still_active.push((idx, source));
                }
                Ok(None) => {
                    log::debug!("{} exhausted after {} pages", source.source_id(), outcome.contributions[idx].1);
                }
                Err(error) => {
                    log::warn!("⚠️  Dropping source {}: {}", source.source_id(), error);
                    outcome.failures.push(SourceFailure {
                        source_id: source.source_id().to_string(),
                        error,
                    });
                }
            }
        }

        active = still_active;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::source::testing::{Step, VecSource};
    use crate::discovery::source::Filtered;

    fn source(id: &str, pages: Vec<Vec<&'static str>>) -> VecSource<&'static str> {
        VecSource::new(id, pages)
    }

    #[tokio::test]
    async fn test_budget_stops_after_page_not_mid_page() {
        let sources = vec![
            source("A", vec![vec!["u1", "u2"], vec!["u3"]]),
            source("B", vec![vec!["u4"], vec!["u5", "u6"]]),
        ];
        let mut budget = Budget::new(3);

        let outcome = multiplex(sources, &mut budget).await;

        assert_eq!(outcome.records, vec!["u1", "u2", "u4"]);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(budget.consumed(), 3);
    }

    #[tokio::test]
    async fn test_round_robin_fairness() {
        let sources = vec![
            source("A", vec![vec!["a1"], vec!["a2"], vec!["a3"], vec!["a4"]]),
            source("B", vec![vec!["b1"], vec!["b2"], vec!["b3"]]),
            source("C", vec![vec!["c1", "c1b"], vec!["c2"], vec!["c3"], vec!["c4"], vec!["c5"]]),
        ];
        let mut budget = Budget::unlimited();

        let outcome = multiplex(sources, &mut budget).await;

        // Round k draws page k from every source that still has one
        assert_eq!(
            outcome.records,
            vec!["a1", "b1", "c1", "c1b", "a2", "b2", "c2", "a3", "b3", "c3", "a4", "c4", "c5"]
        );
        assert_eq!(
            outcome.contributions,
            vec![("A".to_string(), 4), ("B".to_string(), 3), ("C".to_string(), 5)]
        );
    }

    #[tokio::test]
    async fn test_fair_after_k_rounds_with_budget() {
        let pages = |p: &'static str| vec![vec![p]; 10];
        let sources = vec![source("A", pages("a")), source("B", pages("b")), source("C", pages("c"))];
        // Exactly three full rounds fit
        let mut budget = Budget::new(9);

        let outcome = multiplex(sources, &mut budget).await;

        assert_eq!(outcome.records.len(), 9);
        for (_, pages) in &outcome.contributions {
            assert_eq!(*pages, 3);
        }
    }

    #[tokio::test]
    async fn test_output_bounded_by_budget_plus_page() {
        for limit in 0..15 {
            let sources = vec![
                source("A", vec![vec!["x"; 4], vec!["x"; 4]]),
                source("B", vec![vec!["y"; 3], vec!["y"; 1]]),
            ];
            let mut budget = Budget::new(limit);
            let outcome = multiplex(sources, &mut budget).await;

            let total_available = 12;
            let max_page = 4;
            assert!(outcome.records.len() <= limit + max_page - 1, "limit {}", limit);
            if total_available < limit {
                assert_eq!(outcome.records.len(), total_available);
            }
        }
    }

    #[tokio::test]
    async fn test_zero_budget_draws_nothing() {
        let sources = vec![source("A", vec![vec!["a"]])];
        let mut budget = Budget::new(0);

        let outcome = multiplex(sources, &mut budget).await;
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.rounds, 0);
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let sources = vec![
            VecSource::with_steps("A", vec![Step::Page(vec!["a1"]), Step::Page(vec!["a2"])]),
            VecSource::with_steps("bad", vec![Step::Page(vec!["z1"]), Step::Fail("(#100) Object does not exist")]),
            VecSource::with_steps("C", vec![Step::Page(vec!["c1"]), Step::Page(vec!["c2"]), Step::Page(vec!["c3"])]),
        ];
        let mut budget = Budget::unlimited();

        let outcome = multiplex(sources, &mut budget).await;

        assert_eq!(outcome.records, vec!["a1", "z1", "c1", "a2", "c2", "c3"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source_id, "bad");
        assert!(outcome.failures[0].error.to_string().contains("Object does not exist"));
    }

    #[tokio::test]
    async fn test_filtered_empty_page_keeps_source_live() {
        // An all-filtered page is still a contributed page, not exhaustion
        let pages_only = Filtered::new(
            source("A", vec![vec!["page:1"], vec!["page:2", "a1"]]),
            |id: &&'static str| !id.starts_with("page:"),
        );
        let sources: Vec<Box<dyn PageSource<Item = &'static str>>> = vec![
            Box::new(pages_only),
            Box::new(source("B", vec![vec!["b1"], vec!["b2"]])),
        ];
        let mut budget = Budget::unlimited();

        let outcome = multiplex(sources, &mut budget).await;

        assert_eq!(outcome.records, vec!["b1", "a1", "b2"]);
        assert_eq!(outcome.contributions[0].1, 2);
    }
}
