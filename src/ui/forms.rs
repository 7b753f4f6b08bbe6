use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{DayOfWeek, EntryError, NewEntry, TimetableEntry, YearOfStudy};

/// Form state shared by the create and edit dialogs.
#[derive(Clone)]
pub(crate) struct EntryForm {
    pub(crate) program: String,
    pub(crate) year: YearOfStudy,
    pub(crate) course_code: String,
    pub(crate) course_name: String,
    pub(crate) venue: String,
    pub(crate) day: DayOfWeek,
    pub(crate) time: String,
    pub(crate) active: EntryField,
    pub(crate) error: Option<String>,
}

/// Fields of the entry form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum EntryField {
    #[default]
    Program,
    Year,
    CourseCode,
    CourseName,
    Venue,
    Day,
    Time,
}

impl EntryField {
    pub(crate) const ORDER: [EntryField; 7] = [
        EntryField::Program,
        EntryField::Year,
        EntryField::CourseCode,
        EntryField::CourseName,
        EntryField::Venue,
        EntryField::Day,
        EntryField::Time,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            EntryField::Program => "Program of Study",
            EntryField::Year => "Year of Study",
            EntryField::CourseCode => "Course Code",
            EntryField::CourseName => "Course Name",
            EntryField::Venue => "Venue",
            EntryField::Day => "Day of the Week",
            EntryField::Time => "Time (HH:MM)",
        }
    }

    /// Row of the field inside the dialog.
    pub(crate) fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    /// Year and day are picked from a closed list rather than typed.
    pub(crate) fn is_choice(self) -> bool {
        matches!(self, EntryField::Year | EntryField::Day)
    }
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            program: String::new(),
            year: YearOfStudy::First,
            course_code: String::new(),
            course_name: String::new(),
            venue: String::new(),
            day: DayOfWeek::Monday,
            time: String::new(),
            active: EntryField::Program,
            error: None,
        }
    }
}

impl EntryForm {
    /// Blank form seeded with whatever filters are currently selected, since
    /// new entries usually belong to the timetable being looked at.
    pub(crate) fn with_filters(program: Option<&str>, year: Option<YearOfStudy>) -> Self {
        let mut form = Self::default();
        if let Some(program) = program {
            form.program = program.to_string();
        }
        if let Some(year) = year {
            form.year = year;
        }
        form
    }

    /// Populate the form from an existing entry when editing.
    pub(crate) fn from_entry(entry: &TimetableEntry) -> Self {
        Self {
            program: entry.program_of_study.clone(),
            year: entry.year_of_study,
            course_code: entry.course_code.clone(),
            course_name: entry.course_name.clone(),
            venue: entry.venue.clone(),
            day: entry.day,
            time: entry.time.clone(),
            active: EntryField::Program,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.shift_focus(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, delta: isize) {
        let len = EntryField::ORDER.len() as isize;
        let next = (self.active.index() as isize + delta).rem_euclid(len);
        self.active = EntryField::ORDER[next as usize];
    }

    /// Step the year or day selection. Ignored on text fields.
    pub(crate) fn cycle_choice(&mut self, delta: isize) {
        match self.active {
            EntryField::Year => self.year = step(&YearOfStudy::ALL, self.year, delta),
            EntryField::Day => self.day = step(&DayOfWeek::ALL, self.day, delta),
            _ => {}
        }
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            EntryField::Program => self.program.push(ch),
            EntryField::CourseCode => self.course_code.push(ch),
            EntryField::CourseName => self.course_name.push(ch),
            EntryField::Venue => self.venue.push(ch),
            EntryField::Time => {
                if !(ch.is_ascii_digit() || ch == ':') || self.time.len() >= 5 {
                    return false;
                }
                self.time.push(ch);
            }
            EntryField::Year | EntryField::Day => return false,
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.text_mut(self.active) {
            value.pop();
        }
    }

    fn text_mut(&mut self, field: EntryField) -> Option<&mut String> {
        match field {
            EntryField::Program => Some(&mut self.program),
            EntryField::CourseCode => Some(&mut self.course_code),
            EntryField::CourseName => Some(&mut self.course_name),
            EntryField::Venue => Some(&mut self.venue),
            EntryField::Time => Some(&mut self.time),
            EntryField::Year | EntryField::Day => None,
        }
    }

    fn display_value(&self, field: EntryField) -> String {
        match field {
            EntryField::Program => self.program.clone(),
            EntryField::Year => self.year.label().to_string(),
            EntryField::CourseCode => self.course_code.clone(),
            EntryField::CourseName => self.course_name.clone(),
            EntryField::Venue => self.venue.clone(),
            EntryField::Day => self.day.label().to_string(),
            EntryField::Time => self.time.clone(),
        }
    }

    /// Validate the inputs and return a normalized entry ready for the store.
    pub(crate) fn parse_inputs(&self) -> Result<NewEntry, EntryError> {
        NewEntry::new(
            &self.program,
            self.year,
            &self.course_code,
            &self.course_name,
            &self.venue,
            self.day,
            &self.time,
        )
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: EntryField) -> Line<'static> {
        let value = self.display_value(field);
        let is_active = self.active == field;

        let display = if field.is_choice() {
            format!("< {value} >")
        } else if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Column offset of the text cursor for the active field, if it is typed.
    pub(crate) fn cursor_offset(&self) -> Option<usize> {
        if self.active.is_choice() {
            return None;
        }
        let prefix = self.active.label().chars().count() + 2;
        Some(prefix + self.display_value(self.active).chars().count())
    }
}

fn step<T: Copy + PartialEq>(all: &[T], current: T, delta: isize) -> T {
    let len = all.len() as isize;
    let index = all.iter().position(|item| *item == current).unwrap_or(0) as isize;
    all[(index + delta).rem_euclid(len) as usize]
}

/// State for confirming permanent entry deletion.
#[derive(Clone)]
pub(crate) struct ConfirmEntryDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slot: String,
}

impl ConfirmEntryDelete {
    pub(crate) fn from(entry: &TimetableEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.display_title(),
            slot: format!("{} at {}, {}", entry.day, entry.time, entry.venue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut EntryForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn filled_form_parses_into_normalized_entry() {
        let mut form = EntryForm::with_filters(Some("Computer Science"), Some(YearOfStudy::Third));
        form.active = EntryField::CourseCode;
        type_text(&mut form, "cs301 ");
        form.next_field();
        type_text(&mut form, "Operating Systems");
        form.next_field();
        type_text(&mut form, "Lab 2");
        form.next_field();
        form.cycle_choice(2);
        form.next_field();
        type_text(&mut form, "9:30");

        let entry = form.parse_inputs().unwrap();
        assert_eq!(entry.program_of_study, "Computer Science");
        assert_eq!(entry.year_of_study, YearOfStudy::Third);
        assert_eq!(entry.course_code, "CS301");
        assert_eq!(entry.day, DayOfWeek::Wednesday);
        assert_eq!(entry.time, "09:30");
    }

    #[test]
    fn missing_fields_are_reported() {
        let form = EntryForm::default();
        assert_eq!(
            form.parse_inputs(),
            Err(EntryError::MissingField("Program of study"))
        );
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = EntryForm::default();
        form.previous_field();
        assert_eq!(form.active, EntryField::Time);
        form.next_field();
        assert_eq!(form.active, EntryField::Program);
    }

    #[test]
    fn choices_wrap_and_ignore_typing() {
        let mut form = EntryForm::default();
        form.active = EntryField::Year;
        form.cycle_choice(-1);
        assert_eq!(form.year, YearOfStudy::Phd);
        assert!(!form.push_char('x'));
        assert_eq!(form.cursor_offset(), None);

        form.active = EntryField::Day;
        form.cycle_choice(7);
        assert_eq!(form.day, DayOfWeek::Monday);
    }

    #[test]
    fn time_field_only_takes_clock_characters() {
        let mut form = EntryForm::default();
        form.active = EntryField::Time;
        assert!(!form.push_char('a'));
        type_text(&mut form, "10:45:00");
        assert_eq!(form.time, "10:45");
        form.backspace();
        assert_eq!(form.time, "10:4");
    }

    #[test]
    fn editing_starts_from_the_entry() {
        let entry = TimetableEntry {
            id: 7,
            created_at: chrono::Utc::now(),
            program_of_study: "Math".into(),
            year_of_study: YearOfStudy::Masters,
            course_code: "MTH500".into(),
            course_name: "Topology".into(),
            venue: "Room 4".into(),
            day: DayOfWeek::Friday,
            time: "16:00".into(),
        };
        let form = EntryForm::from_entry(&entry);
        assert_eq!(form.parse_inputs().unwrap(), entry.fields());

        let confirm = ConfirmEntryDelete::from(&entry);
        assert_eq!(confirm.id, 7);
        assert_eq!(confirm.title, "Topology (MTH500)");
        assert_eq!(confirm.slot, "Friday at 16:00, Room 4");
    }
}
