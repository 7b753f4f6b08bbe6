use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::models::{NewEntry, TimetableEntry};

const SELECT_COLUMNS: &str = "SELECT id, created_at, program_of_study, year_of_study,
        course_code, course_name, venue, day, time
    FROM timetable_entries";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<TimetableEntry> {
    Ok(TimetableEntry {
        id: row.get(0)?,
        created_at: row.get(1)?,
        program_of_study: row.get(2)?,
        year_of_study: row.get(3)?,
        course_code: row.get(4)?,
        course_name: row.get(5)?,
        venue: row.get(6)?,
        day: row.get(7)?,
        time: row.get(8)?,
    })
}

/// Retrieve every entry ordered by day (calendar order) then time. Callers
/// should not lean on this ordering; the projection re-sorts anyway.
pub fn fetch_entries(conn: &Connection) -> Result<Vec<TimetableEntry>> {
    let sql = format!(
        "{SELECT_COLUMNS}
         ORDER BY CASE day
             WHEN 'Monday' THEN 0 WHEN 'Tuesday' THEN 1 WHEN 'Wednesday' THEN 2
             WHEN 'Thursday' THEN 3 WHEN 'Friday' THEN 4 WHEN 'Saturday' THEN 5
             ELSE 6 END,
         time, id"
    );
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare timetable query")?;

    let entries = stmt
        .query_map([], entry_from_row)
        .context("failed to load timetable entries")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect timetable entries")?;

    debug!(count = entries.len(), "fetched timetable entries");
    Ok(entries)
}

/// Look up a single entry by id.
pub fn fetch_entry(conn: &Connection, id: i64) -> Result<TimetableEntry> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, params![id], entry_from_row)
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => anyhow!("Entry not found"),
            other => other.into(),
        })
        .context("failed to load timetable entry")
}

/// Insert a new entry. The store stamps `id` and `created_at`, and the
/// hydrated struct is echoed back so the caller can push it straight into
/// the in-memory list.
pub fn create_entry(conn: &Connection, entry: &NewEntry) -> Result<TimetableEntry> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO timetable_entries
            (created_at, program_of_study, year_of_study, course_code,
             course_name, venue, day, time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            created_at,
            entry.program_of_study,
            entry.year_of_study,
            entry.course_code,
            entry.course_name,
            entry.venue,
            entry.day,
            entry.time,
        ],
    )
    .context("failed to insert timetable entry")?;

    let id = conn.last_insert_rowid();
    info!(id, course = %entry.course_code, "created timetable entry");
    fetch_entry(conn, id)
}

/// Replace every editable field of an entry. `id` and `created_at` stay as
/// they were. Missing ids are an error so the UI can say so instead of
/// silently continuing.
pub fn update_entry(conn: &Connection, id: i64, entry: &NewEntry) -> Result<TimetableEntry> {
    let updated = conn
        .execute(
            "UPDATE timetable_entries
             SET program_of_study = ?1, year_of_study = ?2, course_code = ?3,
                 course_name = ?4, venue = ?5, day = ?6, time = ?7
             WHERE id = ?8",
            params![
                entry.program_of_study,
                entry.year_of_study,
                entry.course_code,
                entry.course_name,
                entry.venue,
                entry.day,
                entry.time,
                id,
            ],
        )
        .context("failed to update timetable entry")?;

    if updated == 0 {
        return Err(anyhow!("Entry not found"));
    }
    info!(id, "updated timetable entry");
    fetch_entry(conn, id)
}

pub fn delete_entry(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM timetable_entries WHERE id = ?1", params![id])
        .context("failed to delete timetable entry")?;

    if deleted == 0 {
        Err(anyhow!("Entry not found"))
    } else {
        info!(id, "deleted timetable entry");
        Ok(())
    }
}
