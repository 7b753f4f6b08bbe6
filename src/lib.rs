//! Core library surface for the timetable manager.
//!
//! `projection` and `document` are the pure core: they turn a snapshot of
//! entries into the filtered, day-grouped view and into a printable page.
//! `db` is the SQLite entry store, `ui` the Ratatui shell, and `cli`/`config`
//! resolve how the binary starts up.
pub mod cli;
pub mod config;
pub mod db;
pub mod document;
pub mod models;
pub mod projection;
pub mod ui;

/// Persistence entry points used by `main.rs`.
pub use db::{ensure_schema, fetch_entries};

/// The domain types every other layer manipulates.
pub use models::{DayOfWeek, NewEntry, TimetableEntry, YearOfStudy};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
