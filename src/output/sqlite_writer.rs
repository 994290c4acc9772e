//! SQLite sink: one row per ranked page, one transaction per report

use super::sink_backend::{ResultSinkBackend, SinkError};
use crate::discovery::Report;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteReportWriter {
    conn: Connection,
    rows_written: usize,
}

impl SqliteReportWriter {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, SinkError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.as_ref().parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SinkError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create database directory {}: {}", parent.display(), e),
                ))
            })?;
        }

        let conn = Connection::open(db_path.as_ref())?;
        // journal_mode answers with the resulting mode
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS ranked_pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL,
                seed_id TEXT NOT NULL,
                section TEXT NOT NULL,
                page_id TEXT NOT NULL,
                counter INTEGER NOT NULL,
                attributes TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_seed_counter ON ranked_pages(seed_id, counter DESC)",
            [],
        )?;

        log::info!("✅ SQLite result store ready at {}", db_path.as_ref().display());

        Ok(Self { conn, rows_written: 0 })
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

#[async_trait]
impl ResultSinkBackend for SqliteReportWriter {
    async fn write_report(&mut self, report: &dyn Report) -> Result<(), SinkError> {
        let created_at = chrono::Utc::now().timestamp();
        let run_id = format!("{}_{}", report.seed_id(), created_at);

        let tx = self.conn.transaction()?;
        let mut rows = 0;
        for (section, pages) in report.ranked_sections() {
            for page in pages {
                let attributes = serde_json::to_string(&page.attributes)?;
                tx.execute(
                    "INSERT INTO ranked_pages
                     (run_id, seed_id, section, page_id, counter, attributes, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![run_id, report.seed_id(), section, page.id, page.counter as i64, attributes, created_at],
                )?;
                rows += 1;
            }
        }
        tx.commit()?;

        self.rows_written += rows;
        log::info!("✅ Run {}: {} ranked pages stored", run_id, rows);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        // Every report commits its own transaction
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}
