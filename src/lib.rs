//! pagescout: discovers pages related to a seed page through a cursor-paginated
//! social graph API, under explicit request budgets.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod graph;
pub mod output;

pub use config::ScoutConfig;
pub use discovery::{AudienceProfiler, ScoutError, Seed, SimilarityResolver};
pub use graph::{GraphClient, GraphError};
