use crate::graph::GraphError;
use crate::output::SinkError;
use thiserror::Error;

/// Errors that end a discovery run.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("no page matches query `{query}`")]
    NotFound { query: String },

    #[error("page {page_id} has no posts in the last {days} days")]
    NoRecentActivity { page_id: String, days: i64 },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ScoutError {
    /// True when the seed itself is unusable, as opposed to a transport or sink fault.
    pub fn is_unusable_seed(&self) -> bool {
        matches!(self, ScoutError::NotFound { .. } | ScoutError::NoRecentActivity { .. })
    }
}
