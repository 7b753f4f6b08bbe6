use std::cmp::min;

use crate::models::{TimetableEntry, YearOfStudy};
use crate::projection::{FilterOptions, Projection, ProjectionStatus};

/// The program/year pair picked in the filter bar. Both screens share one
/// selection so switching tabs keeps the user's place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FilterSelection {
    pub(crate) program: Option<String>,
    pub(crate) year: Option<YearOfStudy>,
}

impl FilterSelection {
    pub(crate) fn program(&self) -> Option<&str> {
        self.program.as_deref()
    }

    /// Step through "unset" followed by every available program.
    pub(crate) fn cycle_program(&mut self, options: &FilterOptions, delta: isize) {
        let current = self
            .program
            .as_ref()
            .and_then(|program| options.programs.iter().position(|p| p == program));
        self.program = cycle(current, options.programs.len(), delta)
            .map(|index| options.programs[index].clone());
    }

    /// Step through "unset" followed by every available year.
    pub(crate) fn cycle_year(&mut self, options: &FilterOptions, delta: isize) {
        let current = self
            .year
            .and_then(|year| options.years.iter().position(|y| *y == year));
        self.year = cycle(current, options.years.len(), delta).map(|index| options.years[index]);
    }

    pub(crate) fn summary(&self) -> String {
        format!(
            "Program: {}   Year: {}",
            self.program().unwrap_or("<select>"),
            self.year.map(YearOfStudy::label).unwrap_or("<select>")
        )
    }
}

/// Treat `None` as slot 0 ahead of `len` real options and move `delta`
/// slots, wrapping around.
fn cycle(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    let slots = len as isize + 1;
    let slot = current.map(|index| index as isize + 1).unwrap_or(0);
    let next = (slot + delta).rem_euclid(slots);
    if next == 0 {
        None
    } else {
        Some(next as usize - 1)
    }
}

/// Message shown in place of an empty projection.
pub(crate) fn empty_state_message(status: ProjectionStatus, manage: bool) -> Option<&'static str> {
    match (status, manage) {
        (ProjectionStatus::Ready, _) => None,
        (ProjectionStatus::NoFilterSelected, false) => {
            Some("Please select a program and year to view the timetable.")
        }
        (ProjectionStatus::NoFilterSelected, true) => {
            Some("Please select a program and year to manage entries.")
        }
        (ProjectionStatus::NoMatchingEntries, false) => {
            Some("No timetable entries found for the selected criteria.")
        }
        (ProjectionStatus::NoMatchingEntries, true) => {
            Some("No entries found for the selected criteria.")
        }
    }
}

/// Scroll state for the read-only day-by-day view.
#[derive(Default)]
pub(crate) struct TimetableScreen {
    pub(crate) scroll: u16,
}

impl TimetableScreen {
    pub(crate) fn scroll_by(&mut self, delta: isize, line_count: usize) {
        let max_scroll = line_count.saturating_sub(1) as isize;
        let next = (self.scroll as isize + delta).clamp(0, max_scroll.max(0));
        self.scroll = next as u16;
    }

    pub(crate) fn display_lines(projection: &Projection<'_>) -> Vec<String> {
        if let Some(message) = empty_state_message(projection.status(), false) {
            return vec![message.to_string()];
        }

        let mut lines = Vec::new();
        for (day, entries) in projection.groups.iter() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(day.label().to_string());
            lines.push("─".repeat(day.label().chars().count()));
            for entry in entries {
                lines.push(format!("  {}  {}", entry.time, entry.display_title()));
                lines.push(format!("         Venue: {}", entry.venue));
            }
        }
        lines
    }
}

/// Selection state for the manage list. The list itself is the filtered
/// projection, recomputed every frame, so only the cursor lives here.
#[derive(Default)]
pub(crate) struct ManageScreen {
    pub(crate) selected_index: usize,
    pub(crate) scroll: u16,
}

impl ManageScreen {
    pub(crate) fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected_index = 0;
            self.scroll = 0;
            return;
        }
        let next = (self.selected_index as isize + delta).clamp(0, len as isize - 1);
        self.selected_index = next as usize;
        self.update_scroll(len);
    }

    pub(crate) fn select_first(&mut self, len: usize) {
        self.selected_index = 0;
        self.update_scroll(len);
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected_index = len.saturating_sub(1);
        self.update_scroll(len);
    }

    /// Keep the cursor inside the list after it shrinks.
    pub(crate) fn clamp(&mut self, len: usize) {
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
        self.update_scroll(len);
    }

    pub(crate) fn current<'a>(
        &self,
        filtered: &[&'a TimetableEntry],
    ) -> Option<&'a TimetableEntry> {
        filtered.get(self.selected_index).copied()
    }

    fn update_scroll(&mut self, len: usize) {
        if len == 0 {
            self.scroll = 0;
            return;
        }
        // Two lines per entry; keep a little context above the cursor.
        let desired = (self.selected_index.saturating_sub(2) * 2) as u16;
        let max_scroll = (len.saturating_sub(1) * 2) as u16;
        self.scroll = min(desired, max_scroll);
    }

    pub(crate) fn display_lines(&self, projection: &Projection<'_>) -> Vec<String> {
        if let Some(message) = empty_state_message(projection.status(), true) {
            return vec![message.to_string()];
        }

        projection
            .filtered
            .iter()
            .enumerate()
            .flat_map(|(idx, entry)| {
                let pointer = if idx == self.selected_index {
                    "▶ "
                } else {
                    "  "
                };
                [
                    format!("{pointer}{}", entry.display_title()),
                    format!(
                        "    {} at {}, Venue: {}",
                        entry.day, entry.time, entry.venue
                    ),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::DayOfWeek;
    use crate::projection::distinct_filter_options;

    fn entry(
        id: i64,
        program: &str,
        year: YearOfStudy,
        day: DayOfWeek,
        time: &str,
    ) -> TimetableEntry {
        TimetableEntry {
            id,
            created_at: Utc::now(),
            program_of_study: program.to_string(),
            year_of_study: year,
            course_code: format!("C{id}"),
            course_name: format!("Course {id}"),
            venue: "Hall".to_string(),
            day,
            time: time.to_string(),
        }
    }

    fn sample() -> Vec<TimetableEntry> {
        vec![
            entry(1, "CS", YearOfStudy::First, DayOfWeek::Tuesday, "09:00"),
            entry(2, "CS", YearOfStudy::First, DayOfWeek::Monday, "10:00"),
            entry(3, "Math", YearOfStudy::Second, DayOfWeek::Monday, "08:00"),
        ]
    }

    #[test]
    fn program_cycle_passes_through_unset() {
        let entries = sample();
        let options = distinct_filter_options(&entries);
        let mut filters = FilterSelection::default();

        filters.cycle_program(&options, 1);
        assert_eq!(filters.program(), Some("CS"));
        filters.cycle_program(&options, 1);
        assert_eq!(filters.program(), Some("Math"));
        filters.cycle_program(&options, 1);
        assert_eq!(filters.program(), None);
        filters.cycle_program(&options, -1);
        assert_eq!(filters.program(), Some("Math"));
    }

    #[test]
    fn stale_selection_restarts_from_unset() {
        let entries = sample();
        let options = distinct_filter_options(&entries);
        let mut filters = FilterSelection {
            program: Some("History".into()),
            year: Some(YearOfStudy::Phd),
        };

        filters.cycle_program(&options, 1);
        filters.cycle_year(&options, 1);
        assert_eq!(filters.program(), Some("CS"));
        assert_eq!(filters.year, Some(YearOfStudy::First));
    }

    #[test]
    fn timetable_lines_follow_calendar_order() {
        let entries = sample();
        let projection = Projection::build(&entries, Some("CS"), Some(YearOfStudy::First));
        let lines = TimetableScreen::display_lines(&projection);

        assert_eq!(lines[0], "Monday");
        assert_eq!(lines[2], "  10:00  Course 2 (C2)");
        assert_eq!(lines[5], "Tuesday");
    }

    #[test]
    fn empty_states_are_distinct() {
        let entries = sample();
        let unset = Projection::build(&entries, Some("CS"), None);
        let none = Projection::build(&entries, Some("CS"), Some(YearOfStudy::Phd));

        assert_eq!(
            TimetableScreen::display_lines(&unset),
            vec!["Please select a program and year to view the timetable."]
        );
        assert_eq!(
            TimetableScreen::display_lines(&none),
            vec!["No timetable entries found for the selected criteria."]
        );
    }

    #[test]
    fn manage_cursor_tracks_filtered_entries() {
        let entries = sample();
        let projection = Projection::build(&entries, Some("CS"), Some(YearOfStudy::First));
        let mut manage = ManageScreen::default();

        manage.move_selection(5, projection.filtered.len());
        assert_eq!(manage.current(&projection.filtered).map(|e| e.id), Some(2));

        let lines = manage.display_lines(&projection);
        assert_eq!(lines[0], "  Course 1 (C1)");
        assert_eq!(lines[2], "▶ Course 2 (C2)");

        manage.clamp(1);
        assert_eq!(manage.selected_index, 0);
        manage.clamp(0);
        assert_eq!(manage.current(&[]), None);
    }

    #[test]
    fn scrolling_stays_in_bounds() {
        let mut screen = TimetableScreen::default();
        screen.scroll_by(-3, 10);
        assert_eq!(screen.scroll, 0);
        screen.scroll_by(50, 10);
        assert_eq!(screen.scroll, 9);
    }
}
