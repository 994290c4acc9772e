//! Frequency aggregation and ranking
//!
//! One linear pass, O(distinct keys) memory. The first record seen for a key
//! is the one kept; ties in the final ranking keep first-occurrence order.

use crate::graph::{Identified, PageRecord};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub record: T,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Key → (first record, occurrences), in first-occurrence order.
#[derive(Debug)]
pub struct FrequencyTable<T> {
    index: HashMap<String, usize>,
    entries: Vec<Ranked<T>>,
    total: usize,
}

impl<T> Default for FrequencyTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrequencyTable<T> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
            total: 0,
        }
    }

    pub fn observe(&mut self, key: &str, record: T) {
        self.total += 1;
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].count += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(Ranked { record, count: 1 });
            }
        }
    }

    pub fn count(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&slot| self.entries[slot].count)
    }

    /// Records observed so far; always the sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count descending; `sort_by` is stable so ties stay in first-seen order.
    pub fn into_ranked(self) -> Vec<Ranked<T>> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }
}

impl<T: Identified> FrequencyTable<T> {
    pub fn observe_record(&mut self, record: T) {
        let key = record.id().to_string();
        self.observe(&key, record);
    }
}

pub fn rank<T: Identified>(records: impl IntoIterator<Item = T>) -> Vec<Ranked<T>> {
    let mut table = FrequencyTable::new();
    for record in records {
        table.observe_record(record);
    }
    table.into_ranked()
}

/// Rank pages and store each count in `PageRecord::counter`.
pub fn rank_pages(pages: impl IntoIterator<Item = PageRecord>) -> Vec<PageRecord> {
    rank(pages)
        .into_iter()
        .map(|ranked| {
            let mut page = ranked.record;
            page.counter = ranked.count as u64;
            page
        })
        .collect()
}

/// Most frequent `category` values; pages without one are skipped.
pub fn rank_categories<'a>(pages: impl IntoIterator<Item = &'a PageRecord>, top: usize) -> Vec<CategoryCount> {
    let mut table = FrequencyTable::new();
    for page in pages {
        if let Some(category) = page.category().filter(|c| !c.is_empty()) {
            table.observe(category, ());
        }
    }

    // Keys are not kept on entries, so rebuild them from the index
    let mut names = vec![String::new(); table.len()];
    for (name, &slot) in &table.index {
        names[slot] = name.clone();
    }
    let counts: Vec<usize> = table.entries.iter().map(|e| e.count).collect();

    let mut ranked: Vec<CategoryCount> = names
        .into_iter()
        .zip(counts)
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top);
    ranked
}
