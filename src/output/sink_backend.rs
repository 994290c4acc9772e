//! Result sink trait
//!
//! A sink receives one finished report per run. JSON and SQLite backends
//! implement it; `ResultWriter` picks one at startup.

use crate::discovery::Report;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for SinkError {
    fn from(err: rusqlite::Error) -> Self {
        SinkError::Database(err.to_string())
    }
}

/// Backend trait for writing finished reports
#[async_trait]
pub trait ResultSinkBackend: Send {
    /// Write one report
    async fn write_report(&mut self, report: &dyn Report) -> Result<(), SinkError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), SinkError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
