//! JSON document writer: `{"result": [...]}` to a file or stdout

use super::sink_backend::{ResultSinkBackend, SinkError};
use crate::discovery::Report;
use async_trait::async_trait;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonReportWriter {
    path: Option<PathBuf>,
    out: BufWriter<Box<dyn Write + Send>>,
}

impl JsonReportWriter {
    /// `None` writes to stdout. An existing file is truncated.
    pub fn new(path: Option<PathBuf>) -> Result<Self, SinkError> {
        let sink: Box<dyn Write + Send> = match &path {
            Some(p) => {
                if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                Box::new(File::create(p)?)
            }
            None => Box::new(io::stdout()),
        };

        match &path {
            Some(p) => log::info!("📝 Writing results to: {}", p.display()),
            None => log::debug!("📝 Writing results to stdout"),
        }

        Ok(Self {
            path,
            out: BufWriter::new(sink),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[async_trait]
impl ResultSinkBackend for JsonReportWriter {
    async fn write_report(&mut self, report: &dyn Report) -> Result<(), SinkError> {
        serde_json::to_writer_pretty(&mut self.out, &report.document())?;
        writeln!(self.out)?;
        log::debug!("✅ Report for {} written", report.seed_id());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSON"
    }
}
