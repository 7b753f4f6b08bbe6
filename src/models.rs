//! Domain models that mirror the `timetable_entries` table and get passed
//! throughout the TUI. These types stay light-weight data holders so the
//! projection, document and persistence layers can each focus on their own
//! logic. The two closed enums carry an explicit `ALL` list because their
//! declaration order is the canonical sort/display order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use thiserror::Error;

/// Failures raised while turning raw user input into a [`NewEntry`] or while
/// reading a closed-enum label back from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("Time \"{0}\" must look like HH:MM (24-hour).")]
    InvalidTime(String),

    #[error("Unknown year of study \"{0}\".")]
    UnknownYear(String),

    #[error("Unknown day \"{0}\".")]
    UnknownDay(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Year of study. Ordering follows [`YearOfStudy::ALL`], never the labels.
pub enum YearOfStudy {
    First,
    Second,
    Third,
    Fourth,
    Masters,
    Phd,
}

impl YearOfStudy {
    /// Every year in canonical order. Filters and forms iterate this list.
    pub const ALL: [YearOfStudy; 6] = [
        YearOfStudy::First,
        YearOfStudy::Second,
        YearOfStudy::Third,
        YearOfStudy::Fourth,
        YearOfStudy::Masters,
        YearOfStudy::Phd,
    ];

    pub fn label(self) -> &'static str {
        match self {
            YearOfStudy::First => "First Year",
            YearOfStudy::Second => "Second Year",
            YearOfStudy::Third => "Third Year",
            YearOfStudy::Fourth => "Fourth Year",
            YearOfStudy::Masters => "Masters",
            YearOfStudy::Phd => "PhD",
        }
    }

    /// Position inside [`YearOfStudy::ALL`], used as the sort key.
    pub fn rank(self) -> usize {
        Self::ALL
            .iter()
            .position(|year| *year == self)
            .unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for YearOfStudy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for YearOfStudy {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|year| year.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EntryError::UnknownYear(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Day of the week, Monday first.
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// The seven days in calendar order. Grouped views are iterated through
    /// this list so their order never depends on insertion order.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayOfWeek {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EntryError::UnknownDay(wanted.to_string()))
    }
}

// Both enums live in SQLite as their display labels.

impl ToSql for YearOfStudy {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

impl FromSql for YearOfStudy {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

impl ToSql for DayOfWeek {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

impl FromSql for DayOfWeek {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One scheduled course session as stored in the entry store.
pub struct TimetableEntry {
    /// Primary key from the database. Edit and delete flows bubble it back to
    /// the persistence layer.
    pub id: i64,
    /// Assigned by the store on insert and never touched again.
    pub created_at: DateTime<Utc>,
    pub program_of_study: String,
    pub year_of_study: YearOfStudy,
    /// Always uppercase.
    pub course_code: String,
    pub course_name: String,
    pub venue: String,
    pub day: DayOfWeek,
    /// Zero-padded 24-hour `HH:MM`, so plain string comparison sorts it.
    pub time: String,
}

impl TimetableEntry {
    /// `Course Name (CODE)`, the headline used by lists and the print view.
    pub fn display_title(&self) -> String {
        format!("{} ({})", self.course_name, self.course_code)
    }

    /// Copy of the user-editable fields, used to seed the edit form.
    pub fn fields(&self) -> NewEntry {
        NewEntry {
            program_of_study: self.program_of_study.clone(),
            year_of_study: self.year_of_study,
            course_code: self.course_code.clone(),
            course_name: self.course_name.clone(),
            venue: self.venue.clone(),
            day: self.day,
            time: self.time.clone(),
        }
    }
}

/// The editable field set of an entry, already normalized. The only way to
/// build one from raw input is [`NewEntry::new`], which enforces the text and
/// time invariants that the projection relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub program_of_study: String,
    pub year_of_study: YearOfStudy,
    pub course_code: String,
    pub course_name: String,
    pub venue: String,
    pub day: DayOfWeek,
    pub time: String,
}

impl NewEntry {
    /// Trim every text field, uppercase the course code and rewrite the time
    /// as zero-padded `HH:MM`.
    pub fn new(
        program_of_study: &str,
        year_of_study: YearOfStudy,
        course_code: &str,
        course_name: &str,
        venue: &str,
        day: DayOfWeek,
        time: &str,
    ) -> Result<Self, EntryError> {
        Ok(Self {
            program_of_study: required("Program of study", program_of_study)?,
            year_of_study,
            course_code: required("Course code", course_code)?.to_uppercase(),
            course_name: required("Course name", course_name)?,
            venue: required("Venue", venue)?,
            day,
            time: normalize_time(time)?,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, EntryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(EntryError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Accept `H:MM` or `HH:MM` (seconds tolerated and dropped) and render the
/// canonical zero-padded form.
pub fn normalize_time(raw: &str) -> Result<String, EntryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EntryError::MissingField("Time"));
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(|time| time.format("%H:%M").to_string())
        .map_err(|_| EntryError::InvalidTime(trimmed.to_string()))
}
