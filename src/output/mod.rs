//! Result sinks

pub mod json_writer;
pub mod sink_backend;
pub mod sqlite_writer;
pub mod writer;

pub use json_writer::JsonReportWriter;
pub use sink_backend::{ResultSinkBackend, SinkError};
pub use sqlite_writer::SqliteReportWriter;
pub use writer::{BackendType, ResultWriter};
