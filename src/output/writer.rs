//! Unified result writer
//!
//! Routes reports to either the JSON or the SQLite backend based on configuration.

use super::json_writer::JsonReportWriter;
use super::sink_backend::{ResultSinkBackend, SinkError};
use super::sqlite_writer::SqliteReportWriter;
use crate::discovery::Report;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    #[default]
    Json,
    Sqlite,
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(BackendType::Json),
            "sqlite" => Ok(BackendType::Sqlite),
            _ => Err(format!("unknown backend `{}` (expected json or sqlite)", s)),
        }
    }
}

/// Unified writer that routes to either JSON or SQLite backend
pub enum ResultWriter {
    Json(JsonReportWriter),
    Sqlite(SqliteReportWriter),
}

impl ResultWriter {
    /// `output` is the JSON file (stdout when `None`) or the database path.
    /// SQLite falls back to `default_db_path` when no output is given.
    pub fn new(backend: BackendType, output: Option<PathBuf>, default_db_path: PathBuf) -> Result<Self, SinkError> {
        match backend {
            BackendType::Json => Ok(ResultWriter::Json(JsonReportWriter::new(output)?)),
            BackendType::Sqlite => {
                let path = output.unwrap_or(default_db_path);
                Ok(ResultWriter::Sqlite(SqliteReportWriter::new(path)?))
            }
        }
    }

    fn backend(&mut self) -> &mut dyn ResultSinkBackend {
        match self {
            ResultWriter::Json(w) => w,
            ResultWriter::Sqlite(w) => w,
        }
    }

    pub async fn write_report(&mut self, report: &dyn Report) -> Result<(), SinkError> {
        self.backend().write_report(report).await
    }

    pub async fn flush(&mut self) -> Result<(), SinkError> {
        self.backend().flush().await
    }

    /// Get backend type for logging
    pub fn backend_type(&self) -> &'static str {
        match self {
            ResultWriter::Json(w) => w.backend_type(),
            ResultWriter::Sqlite(w) => w.backend_type(),
        }
    }
}
