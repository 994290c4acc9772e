//! Bounded fan-out pagination and frequency aggregation
//!
//! ```text
//! SimilarityResolver
//!   ├─ RecencyWindow<Paginator<PostRecord>>        recent posts of the seed
//!   ├─ multiplex(Filtered<Paginator<EdgeRecord>>)  likers, round-robin under a Budget
//!   ├─ FanOut::run(user_likes)                     second hop, concurrency-capped
//!   └─ rank_pages                                  stable frequency ranking
//! ```

pub mod aggregator;
pub mod audience;
pub mod budget;
pub mod error;
pub mod fanout;
pub mod multiplexer;
pub mod paginator;
pub mod recency;
pub mod report;
pub mod resolver;
pub mod source;

pub use aggregator::{rank, rank_categories, rank_pages, CategoryCount, FrequencyTable, Ranked};
pub use audience::AudienceProfiler;
pub use budget::Budget;
pub use error::ScoutError;
pub use fanout::{FanOut, FanOutFailure, FanOutOutcome};
pub use multiplexer::{multiplex, MultiplexOutcome, SourceFailure};
pub use paginator::Paginator;
pub use recency::{cutoff_days_before, RecencyWindow, Timestamped};
pub use report::{AudienceReport, FailureNote, Report, SimilarityReport};
pub use resolver::{resolve_seed, DiscoverySettings, Seed, SimilarityResolver};
pub use source::{Filtered, PageSource};
