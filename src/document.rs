//! Printable timetable export. A projection is rendered into one standalone
//! HTML page (inline styles, no external assets) and handed to a
//! [`Presenter`], which is responsible for putting it in front of the user.
//! The page calls `window.print()` once loaded so the browser goes straight
//! to its print / save-as-PDF dialog.
//!
//! Rendering is deterministic: the only time-dependent input is the
//! generation timestamp the caller passes in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use thiserror::Error;

use crate::models::{DayOfWeek, TimetableEntry, YearOfStudy};
use crate::projection::{ordered_days, DayGroups};

const DOCUMENT_TITLE: &str = "Class Timetable";

const PRINT_CSS: &str = "\
body{font-family:Helvetica,Arial,sans-serif;margin:2rem;color:#111827}\
h1{color:#4f46e5;margin-bottom:.5rem}\
header p{margin:.2rem 0}\
section{margin-top:1.5rem;page-break-inside:avoid}\
h2{color:#374151;border-bottom:1px solid #9ca3af;padding-bottom:.25rem}\
.course{margin:.6rem 0}\
.course .title{font-weight:bold}\
.course .meta{color:#6b7280}\
@media print{body{margin:0}}";

const PRINT_ON_LOAD: &str = "window.addEventListener('load',function(){window.print();});";

/// Failures of the export flow. Neither is fatal; the caller reports them and
/// the user can try again.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The projection had nothing to print. No document was built.
    #[error("There are no timetable entries to export.")]
    NoData,

    /// The host could not show the document. Nothing was left behind.
    #[error("Could not open the print view: {0}")]
    PresentationUnavailable(String),
}

/// A fully rendered export, ready to be handed to a [`Presenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableDocument {
    /// `Timetable_<program>_<year>`, filesystem-safe.
    pub file_stem: String,
    pub html: String,
}

/// Where finished documents go. The TUI and CLI use [`BrowserPresenter`];
/// tests substitute a recorder.
pub trait Presenter {
    /// Show `document` to the user, returning where it ended up. Must not
    /// wait for the user to finish printing.
    fn present(&self, document: &TimetableDocument) -> Result<PathBuf, ExportError>;
}

/// Hands a saved file to whatever should display it.
pub type Launcher = fn(&Path) -> io::Result<()>;

/// Opens `path` with the system's default handler for `.html` files.
pub fn open_in_default_app(path: &Path) -> io::Result<()> {
    open::that(path)
}

/// Writes the document into `export_dir` and passes it to `launcher`.
#[derive(Clone)]
pub struct BrowserPresenter {
    pub export_dir: PathBuf,
    /// `None` only saves the file.
    pub launcher: Option<Launcher>,
}

impl BrowserPresenter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            launcher: Some(open_in_default_app),
        }
    }

    pub fn save_only(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            launcher: None,
        }
    }
}

impl Presenter for BrowserPresenter {
    fn present(&self, document: &TimetableDocument) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.export_dir).map_err(|err| {
            ExportError::PresentationUnavailable(format!(
                "cannot create {}: {err}",
                self.export_dir.display()
            ))
        })?;

        let path = self.export_dir.join(format!("{}.html", document.file_stem));
        if let Err(err) = fs::write(&path, &document.html) {
            let _ = fs::remove_file(&path);
            return Err(ExportError::PresentationUnavailable(format!(
                "cannot write {}: {err}",
                path.display()
            )));
        }

        if let Some(launch) = self.launcher {
            if let Err(err) = launch(&path) {
                let _ = fs::remove_file(&path);
                return Err(ExportError::PresentationUnavailable(err.to_string()));
            }
        }

        Ok(path)
    }
}

/// `Timetable_<program>_<year>` with whitespace runs collapsed to `_` and
/// path separators or reserved characters replaced by `-`.
pub fn export_file_stem(program: &str, year: YearOfStudy) -> String {
    let raw = format!("Timetable_{}_{}", program.trim(), year.label());
    let mut stem = String::with_capacity(raw.len());
    let mut in_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => stem.push('-'),
            other => stem.push(other),
        }
    }
    stem
}

/// Build the HTML document for a projection. `days` decides section order;
/// within a day, entries are printed exactly as `groups` holds them.
pub fn render_document(
    groups: &DayGroups<'_>,
    days: &[DayOfWeek],
    program: &str,
    year: YearOfStudy,
    generated_at: NaiveDateTime,
) -> Result<TimetableDocument, ExportError> {
    if groups.is_empty() {
        return Err(ExportError::NoData);
    }

    let file_stem = export_file_stem(program, year);
    let generated = generated_at.format("%Y-%m-%d %H:%M").to_string();
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (file_stem) }
                style { (PreEscaped(PRINT_CSS)) }
            }
            body {
                header {
                    h1 { (DOCUMENT_TITLE) }
                    p { "Program: " (program) }
                    p { "Year of Study: " (year.label()) }
                    p { "Generated on: " (generated) }
                }
                @for day in days {
                    @if let Some(entries) = groups.get(*day) {
                        (day_section(*day, entries))
                    }
                }
                script { (PreEscaped(PRINT_ON_LOAD)) }
            }
        }
    };

    Ok(TimetableDocument {
        file_stem,
        html: markup.into_string(),
    })
}

fn day_section(day: DayOfWeek, entries: &[&TimetableEntry]) -> Markup {
    html! {
        section {
            h2 { (day.label()) }
            @for entry in entries {
                div class="course" {
                    p class="title" {
                        (entry.course_name) " (" (entry.course_code) ")"
                    }
                    p class="meta" {
                        "Time: " (entry.time) " | Venue: " (entry.venue)
                    }
                }
            }
        }
    }
}

/// Render the whole document first, then hand it to `presenter`.
pub fn print_timetable(
    presenter: &dyn Presenter,
    groups: &DayGroups<'_>,
    program: &str,
    year: YearOfStudy,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    let document = render_document(groups, ordered_days(), program, year, generated_at)?;
    presenter.present(&document)
}

/// Plain-text rendition of a grouping, used by the `list` subcommand.
pub fn render_plain_text(groups: &DayGroups<'_>, days: &[DayOfWeek]) -> String {
    let mut out = String::new();
    for day in days {
        let Some(entries) = groups.get(*day) else {
            continue;
        };
        out.push_str(&format!("{day}\n"));
        for entry in entries {
            out.push_str(&format!(
                "  {}  {}  @ {}\n",
                entry.time,
                entry.display_title(),
                entry.venue
            ));
        }
    }
    out
}
