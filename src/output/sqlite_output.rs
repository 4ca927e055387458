//! SQLite report database
//!
//! Each run appends one row to `runs` plus its result pages and resolved link edges,
//! so the history of several runs can be queried and compared later.

use crate::output::stats::ReportStatistics;
use crate::output::traits::ReportSink;
use crate::resolver::CrawlReport;
use crate::OutputResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// SQL schema for the report database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawl run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    generated_at TEXT NOT NULL,
    base_url TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    pages_crawled INTEGER NOT NULL,
    links_checked INTEGER NOT NULL,
    broken_links INTEGER NOT NULL,
    uncrawled_links INTEGER NOT NULL,
    redirects INTEGER NOT NULL
);

-- Observed pages in the reachable graph
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    title TEXT,
    http_status INTEGER,
    error TEXT,
    depth INTEGER NOT NULL,
    is_base INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);

-- Resolved link edges
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    source TEXT NOT NULL,
    target TEXT NOT NULL,
    url TEXT NOT NULL,
    text TEXT NOT NULL,
    link_type TEXT NOT NULL,
    is_image INTEGER NOT NULL,
    http_status INTEGER,
    error TEXT,
    fragment TEXT,
    fragment_valid INTEGER NOT NULL,
    crawled INTEGER NOT NULL,
    status TEXT NOT NULL,
    issue_type TEXT,
    severity TEXT,
    is_broken INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_links_run ON links(run_id);
CREATE INDEX IF NOT EXISTS idx_links_broken ON links(run_id, is_broken);
"#;

/// Initializes the report database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

fn open(path: &Path) -> OutputResult<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// Appends each report to a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
    config_hash: String,
    only_broken: bool,
}

impl SqliteSink {
    /// Creates a new SQLite sink
    ///
    /// # Arguments
    ///
    /// * `path` - Database file, created on first write
    /// * `config_hash` - Hash of the configuration the run used
    /// * `only_broken` - Store only broken edges instead of every edge
    pub fn new(path: impl Into<PathBuf>, config_hash: impl Into<String>, only_broken: bool) -> Self {
        Self {
            path: path.into(),
            config_hash: config_hash.into(),
            only_broken,
        }
    }

    /// Writes the report in a single transaction and returns the new run id
    pub fn record(&self, report: &CrawlReport) -> OutputResult<i64> {
        let mut conn = open(&self.path)?;
        let tx = conn.transaction()?;
        let stats = &report.stats;

        tx.execute(
            "INSERT INTO runs (generated_at, base_url, config_hash, pages_crawled, links_checked,
                               broken_links, uncrawled_links, redirects)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                report.generated_at.to_rfc3339(),
                report.base_url,
                self.config_hash,
                stats.pages_crawled as i64,
                stats.links_checked as i64,
                stats.broken_links as i64,
                stats.uncrawled_links as i64,
                stats.redirects as i64,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut insert_page = tx.prepare(
                "INSERT INTO pages (run_id, url, title, http_status, error, depth, is_base)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            let mut insert_link = tx.prepare(
                "INSERT INTO links (run_id, source, target, url, text, link_type, is_image,
                                    http_status, error, fragment, fragment_valid, crawled,
                                    status, issue_type, severity, is_broken)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            )?;

            for page in &report.pages {
                if !self.only_broken {
                    insert_page.execute(params![
                        run_id,
                        page.url.as_str(),
                        page.title,
                        page.http_status,
                        page.error,
                        page.depth,
                        page.is_base,
                    ])?;
                }

                for edge in page
                    .links
                    .iter()
                    .filter(|edge| !self.only_broken || edge.is_broken)
                {
                    insert_link.execute(params![
                        run_id,
                        edge.source.as_str(),
                        edge.target.as_str(),
                        edge.url,
                        edge.text,
                        edge.link_type.as_str(),
                        edge.is_image,
                        edge.http_status,
                        edge.error,
                        edge.fragment,
                        edge.fragment_valid,
                        edge.crawled,
                        edge.status.as_str(),
                        edge.issue_type.map(|issue| issue.as_str()),
                        edge.severity.map(|severity| severity.as_str()),
                        edge.is_broken,
                    ])?;
                }
            }
        }

        tx.commit()?;
        Ok(run_id)
    }
}

impl ReportSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write(&self, report: &CrawlReport) -> OutputResult<()> {
        let run_id = self.record(report)?;
        tracing::info!("Run {} recorded in {}", run_id, self.path.display());
        Ok(())
    }
}

/// Loads the statistics of the most recent run from a report database
///
/// # Returns
///
/// * `Ok(None)` - The database does not exist or holds no runs
pub fn load_run_statistics(path: &Path) -> OutputResult<Option<ReportStatistics>> {
    if !path.exists() {
        return Ok(None);
    }
    let conn = open(path)?;

    let latest = conn
        .query_row(
            "SELECT id, pages_crawled, links_checked, broken_links, uncrawled_links, redirects
             FROM runs ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    ReportStatistics {
                        pages_crawled: row.get::<_, i64>(1)? as u64,
                        links_checked: row.get::<_, i64>(2)? as u64,
                        broken_links: row.get::<_, i64>(3)? as u64,
                        uncrawled_links: row.get::<_, i64>(4)? as u64,
                        redirects: row.get::<_, i64>(5)? as u64,
                        ..ReportStatistics::default()
                    },
                ))
            },
        )
        .optional()?;

    let Some((run_id, mut stats)) = latest else {
        return Ok(None);
    };

    for (column, counts) in [
        ("severity", &mut stats.broken_by_severity),
        ("issue_type", &mut stats.broken_by_issue),
    ] {
        let mut stmt = conn.prepare(&format!(
            "SELECT {column}, COUNT(*) FROM links
             WHERE run_id = ?1 AND is_broken = 1 AND {column} IS NOT NULL
             GROUP BY {column}"
        ))?;
        let rows = stmt.query_map([run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (key, count) = row?;
            counts.insert(key, count as u64);
        }
    }

    Ok(Some(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_report;
    use tempfile::TempDir;

    fn count(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());

        for table in ["runs", "pages", "links"] {
            let n = count(
                &conn,
                &format!(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{}'",
                    table
                ),
            );
            assert_eq!(n, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_record_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linkrot.db");
        let sink = SqliteSink::new(&path, "abc123", false);

        let first = sink.record(&sample_report()).unwrap();
        let second = sink.record(&sample_report()).unwrap();
        assert!(second > first);

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM runs"), 2);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM pages"), 2);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM links"), 4);

        let status: String = conn
            .query_row(
                "SELECT status FROM links WHERE is_broken = 1 LIMIT 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(status, "Not Found");
    }

    #[test]
    fn test_only_broken() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linkrot.db");
        SqliteSink::new(&path, "abc123", true)
            .write(&sample_report())
            .unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM pages"), 0);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM links"), 1);
    }

    #[test]
    fn test_load_run_statistics() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linkrot.db");
        assert!(load_run_statistics(&path).unwrap().is_none());

        let report = sample_report();
        SqliteSink::new(&path, "abc123", true).write(&report).unwrap();

        let stats = load_run_statistics(&path).unwrap().unwrap();
        assert_eq!(stats, report.stats);
    }
}
