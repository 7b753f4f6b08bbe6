use std::mem;

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{create_entry, delete_entry, update_entry};
use crate::document::{print_timetable, ExportError, Presenter};
use crate::models::TimetableEntry;
use crate::projection::{distinct_filter_options, Projection, ProjectionStatus};

use super::forms::{ConfirmEntryDelete, EntryField, EntryForm};
use super::helpers::{centered_rect, surface_error, tab_line};
use super::screens::{FilterSelection, ManageScreen, TimetableScreen};

/// Header space: tab strip plus the filter bar.
const HEADER_HEIGHT: u16 = 4;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const PAGE: isize = 10;

/// The two top-level tabs.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Screen {
    Timetable,
    Manage,
}

impl Screen {
    const TITLES: [&'static str; 2] = ["View Timetable", "Manage Entries"];

    fn index(self) -> usize {
        match self {
            Screen::Timetable => 0,
            Screen::Manage => 1,
        }
    }

    fn toggled(self) -> Self {
        match self {
            Screen::Timetable => Screen::Manage,
            Screen::Manage => Screen::Timetable,
        }
    }
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    Creating(EntryForm),
    Editing { id: i64, form: EntryForm },
    ConfirmDelete(ConfirmEntryDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. `entries` is the
/// in-memory snapshot every projection is computed from; CRUD calls go to
/// the store first and then patch the snapshot.
pub struct App {
    conn: Connection,
    entries: Vec<TimetableEntry>,
    presenter: Box<dyn Presenter>,
    filters: FilterSelection,
    screen: Screen,
    timetable: TimetableScreen,
    manage: ManageScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(
        conn: Connection,
        entries: Vec<TimetableEntry>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self {
            conn,
            entries,
            presenter,
            filters: FilterSelection::default(),
            screen: Screen::Timetable,
            timetable: TimetableScreen::default(),
            manage: ManageScreen::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    fn projection(&self) -> Projection<'_> {
        Projection::build(&self.entries, self.filters.program(), self.filters.year)
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Creating(form) => self.handle_form(code, None, form)?,
            Mode::Editing { id, form } => self.handle_form(code, Some(id), form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.clear_status();
                self.screen = self.screen.toggled();
            }
            KeyCode::Char('p') => self.cycle_program(1),
            KeyCode::Char('P') => self.cycle_program(-1),
            KeyCode::Char('y') => self.cycle_year(1),
            KeyCode::Char('Y') => self.cycle_year(-1),
            KeyCode::Char('x') | KeyCode::Char('X') => self.export(),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::Creating(EntryForm::with_filters(
                    self.filters.program(),
                    self.filters.year,
                )));
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE),
            KeyCode::PageDown => self.move_cursor(PAGE),
            KeyCode::Home => self.move_to_edge(false),
            KeyCode::End => self.move_to_edge(true),
            KeyCode::Char('e') | KeyCode::Char('E') if self.screen == Screen::Manage => {
                match self.selected_entry().cloned() {
                    Some(entry) => {
                        self.clear_status();
                        return Ok(Mode::Editing {
                            id: entry.id,
                            form: EntryForm::from_entry(&entry),
                        });
                    }
                    None => self.set_status("No entry selected to edit.", StatusKind::Error),
                }
            }
            KeyCode::Char('-') | KeyCode::Delete | KeyCode::Char('d')
                if self.screen == Screen::Manage =>
            {
                match self.selected_entry() {
                    Some(entry) => {
                        let confirm = ConfirmEntryDelete::from(entry);
                        self.clear_status();
                        return Ok(Mode::ConfirmDelete(confirm));
                    }
                    None => self.set_status("No entry selected to delete.", StatusKind::Error),
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_form(&mut self, code: KeyCode, id: Option<i64>, mut form: EntryForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if id.is_some() {
                    "Edit cancelled."
                } else {
                    "Add entry cancelled."
                };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => form.cycle_choice(-1),
            KeyCode::Right => form.cycle_choice(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_form(id, &form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if !keep_open {
            return Ok(Mode::Normal);
        }
        Ok(match id {
            Some(id) => Mode::Editing { id, form },
            None => Mode::Creating(form),
        })
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmEntryDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match delete_entry(&self.conn, confirm.id) {
                    Ok(()) => {
                        self.entries.retain(|entry| entry.id != confirm.id);
                        let len = self.projection().filtered.len();
                        self.manage.clamp(len);
                        self.set_status(format!("Deleted {}.", confirm.title), StatusKind::Info);
                    }
                    Err(err) => {
                        warn!(id = confirm.id, error = %err, "delete failed");
                        self.set_status(
                            format!("Failed to delete entry: {}", surface_error(&err)),
                            StatusKind::Error,
                        );
                    }
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Delete cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Validate the form and push it to the store, then patch the snapshot
    /// with the row the store echoed back.
    fn save_form(&mut self, id: Option<i64>, form: &EntryForm) -> Result<()> {
        let fields = form.parse_inputs()?;
        match id {
            None => {
                let entry = create_entry(&self.conn, &fields)?;
                self.set_status(
                    format!("Added {}.", entry.display_title()),
                    StatusKind::Info,
                );
                self.entries.push(entry);
            }
            Some(id) => {
                let entry = update_entry(&self.conn, id, &fields)?;
                self.set_status(
                    format!("Saved {}.", entry.display_title()),
                    StatusKind::Info,
                );
                if let Some(slot) = self.entries.iter_mut().find(|existing| existing.id == id) {
                    *slot = entry;
                }
                let len = self.projection().filtered.len();
                self.manage.clamp(len);
            }
        }
        Ok(())
    }

    fn cycle_program(&mut self, delta: isize) {
        let options = distinct_filter_options(&self.entries);
        self.filters.cycle_program(&options, delta);
        self.after_filter_change();
    }

    fn cycle_year(&mut self, delta: isize) {
        let options = distinct_filter_options(&self.entries);
        self.filters.cycle_year(&options, delta);
        self.after_filter_change();
    }

    fn after_filter_change(&mut self) {
        self.clear_status();
        self.timetable.scroll = 0;
        self.manage = ManageScreen::default();
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.screen {
            Screen::Timetable => {
                let lines = TimetableScreen::display_lines(&self.projection()).len();
                self.timetable.scroll_by(delta, lines);
            }
            Screen::Manage => {
                let len = self.projection().filtered.len();
                self.manage.move_selection(delta, len);
            }
        }
    }

    fn move_to_edge(&mut self, end: bool) {
        match self.screen {
            Screen::Timetable => {
                let lines = TimetableScreen::display_lines(&self.projection()).len();
                let delta = if end {
                    lines as isize
                } else {
                    -(lines as isize)
                };
                self.timetable.scroll_by(delta, lines);
            }
            Screen::Manage => {
                let len = self.projection().filtered.len();
                if end {
                    self.manage.select_last(len);
                } else {
                    self.manage.select_first(len);
                }
            }
        }
    }

    fn selected_entry(&self) -> Option<&TimetableEntry> {
        self.manage.current(&self.projection().filtered)
    }

    /// Render the current projection and hand it to the presenter. Every
    /// failure ends up in the footer so the user can fix it and retry.
    fn export(&mut self) {
        let outcome = {
            let projection = self.projection();
            match (projection.status(), projection.program, projection.year) {
                (ProjectionStatus::NoFilterSelected, _, _) => None,
                (_, Some(program), Some(year)) => Some((
                    program.to_string(),
                    year,
                    print_timetable(
                        self.presenter.as_ref(),
                        &projection.groups,
                        program,
                        year,
                        Local::now().naive_local(),
                    ),
                )),
                _ => None,
            }
        };

        let Some((program, year, result)) = outcome else {
            self.set_status(
                "Select a program and year before exporting.",
                StatusKind::Error,
            );
            return;
        };

        match result {
            Ok(path) => {
                info!(path = %path.display(), %program, %year, "timetable exported");
                self.set_status(
                    format!("Opened print view: {}", path.display()),
                    StatusKind::Info,
                );
            }
            Err(err @ ExportError::NoData) => {
                self.set_status(err.to_string(), StatusKind::Error);
            }
            Err(err @ ExportError::PresentationUnavailable(_)) => {
                warn!(error = %err, "print view unavailable");
                self.set_status(format!("{err} Press x to try again."), StatusKind::Error);
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let projection = self.projection();
        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Timetable => self.draw_timetable(frame, chunks[1], &projection),
            Screen::Manage => self.draw_manage(frame, chunks[1], &projection),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Creating(form) => {
                self.draw_entry_form(frame, area, "Add a New Timetable Entry", form)
            }
            Mode::Editing { form, .. } => {
                self.draw_entry_form(frame, area, "Edit Timetable Entry", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Class Timetable ")
            .borders(Borders::ALL);
        let lines = vec![
            tab_line(&Screen::TITLES, self.screen.index()),
            Line::from(Span::styled(
                self.filters.summary(),
                Style::default().fg(Color::Cyan),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_timetable(&self, frame: &mut Frame, area: Rect, projection: &Projection<'_>) {
        let block = Block::default().title("Timetable").borders(Borders::ALL);
        let lines = TimetableScreen::display_lines(projection);
        let alignment = if projection.status() == ProjectionStatus::Ready {
            Alignment::Left
        } else {
            Alignment::Center
        };
        let paragraph = Paragraph::new(lines.join("\n"))
            .block(block)
            .alignment(alignment)
            .wrap(Wrap { trim: false })
            .scroll((self.timetable.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_manage(&self, frame: &mut Frame, area: Rect, projection: &Projection<'_>) {
        let title = format!("Manage Entries ({})", projection.filtered.len());
        let block = Block::default().title(title).borders(Borders::ALL);
        let alignment = if projection.status() == ProjectionStatus::Ready {
            Alignment::Left
        } else {
            Alignment::Center
        };
        let paragraph = Paragraph::new(self.manage.display_lines(projection).join("\n"))
            .block(block)
            .alignment(alignment)
            .wrap(Wrap { trim: false })
            .scroll((self.manage.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let text = match (&self.mode, self.screen) {
            (Mode::Creating(_) | Mode::Editing { .. }, _) => {
                "Tab/↑↓ field • ←→ choose • Enter save • Esc cancel"
            }
            (Mode::ConfirmDelete(_), _) => "Y confirm • N/Esc cancel",
            (Mode::Normal, Screen::Timetable) => {
                "p/P program • y/Y year • ↑↓ scroll • x print • + add • Tab manage • q quit"
            }
            (Mode::Normal, Screen::Manage) => {
                "p/P program • y/Y year • ↑↓ select • e edit • - delete • + add • x print • Tab view • q quit"
            }
        };
        Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
    }

    fn draw_entry_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &EntryForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = EntryField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        if let Some(offset) = form.cursor_offset() {
            let cursor_x = inner.x + offset as u16;
            let cursor_y = inner.y + form.active.index() as u16;
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmEntryDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete {}?", confirm.title)),
            Line::from(confirm.slot.clone()),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
