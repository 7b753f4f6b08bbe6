use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// Open (creating if needed) the SQLite file at `path` and make sure the
/// schema exists.
pub fn ensure_schema(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    migrate(&conn)?;
    info!(path = %path.display(), "timetable store ready");
    Ok(conn)
}

/// Throwaway store used by tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    migrate(&conn)?;
    Ok(conn)
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS timetable_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            program_of_study TEXT NOT NULL,
            year_of_study TEXT NOT NULL,
            course_code TEXT NOT NULL,
            course_name TEXT NOT NULL,
            venue TEXT NOT NULL,
            day TEXT NOT NULL,
            time TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create timetable_entries table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_timetable_filter
            ON timetable_entries (program_of_study, year_of_study)",
        [],
    )
    .context("failed to create filter index")?;

    debug!("schema migrated");
    Ok(())
}
