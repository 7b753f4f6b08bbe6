//! Projection of the flat entry list into the filtered, day-grouped view that
//! both the timetable screen and the print document consume.
//!
//! Everything here is a pure function of its arguments: the caller hands in
//! the current snapshot of entries plus the selected filter pair and gets a
//! fresh result back. Nothing is cached and nothing is logged.

use std::collections::{BTreeSet, HashSet};

use crate::models::{DayOfWeek, TimetableEntry, YearOfStudy};

/// Distinct values offered by the program and year filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Lexically ascending.
    pub programs: Vec<String>,
    /// Ordered by [`YearOfStudy::rank`].
    pub years: Vec<YearOfStudy>,
}

/// Collect the filter options present in `entries`.
pub fn distinct_filter_options(entries: &[TimetableEntry]) -> FilterOptions {
    let programs: BTreeSet<&str> = entries
        .iter()
        .map(|entry| entry.program_of_study.as_str())
        .collect();

    let unique_years: HashSet<YearOfStudy> =
        entries.iter().map(|entry| entry.year_of_study).collect();
    let mut years: Vec<YearOfStudy> = unique_years.into_iter().collect();
    years.sort_by_key(|year| year.rank());

    FilterOptions {
        programs: programs.into_iter().map(str::to_string).collect(),
        years,
    }
}

/// Entries matching both filters, in input order. Until both a program and a
/// year are chosen the view is undefined and the result is empty.
pub fn filter_entries<'a>(
    entries: &'a [TimetableEntry],
    program: Option<&str>,
    year: Option<YearOfStudy>,
) -> Vec<&'a TimetableEntry> {
    let (Some(program), Some(year)) = (program.filter(|p| !p.is_empty()), year) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry.program_of_study == program && entry.year_of_study == year)
        .collect()
}

/// The seven days in display order.
pub fn ordered_days() -> &'static [DayOfWeek; 7] {
    &DayOfWeek::ALL
}

/// Entries bucketed per day. Only days with at least one entry are present,
/// and iteration always follows calendar order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayGroups<'a> {
    buckets: Vec<(DayOfWeek, Vec<&'a TimetableEntry>)>,
}

impl<'a> DayGroups<'a> {
    /// Entries for `day`, or `None` when the day has nothing scheduled.
    pub fn get(&self, day: DayOfWeek) -> Option<&[&'a TimetableEntry]> {
        self.buckets
            .iter()
            .find(|(bucket_day, _)| *bucket_day == day)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &[&'a TimetableEntry])> + '_ {
        self.buckets
            .iter()
            .map(|(day, entries)| (*day, entries.as_slice()))
    }

    pub fn days(&self) -> impl Iterator<Item = DayOfWeek> + '_ {
        self.buckets.iter().map(|(day, _)| *day)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of entries across every day.
    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(|(_, entries)| entries.len()).sum()
    }
}

/// Partition `entries` by day and sort each day by time. The sort is stable,
/// so entries sharing a time keep their input order.
pub fn group_by_day<'a>(entries: &[&'a TimetableEntry]) -> DayGroups<'a> {
    let buckets = ordered_days()
        .iter()
        .filter_map(|&day| {
            let mut bucket: Vec<&'a TimetableEntry> = entries
                .iter()
                .copied()
                .filter(|entry| entry.day == day)
                .collect();
            if bucket.is_empty() {
                return None;
            }
            bucket.sort_by(|a, b| a.time.cmp(&b.time));
            Some((day, bucket))
        })
        .collect();

    DayGroups { buckets }
}

/// Which of the three states a projection is in. Both empty states come out
/// of the engine as an empty list; this is how the view tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionStatus {
    NoFilterSelected,
    NoMatchingEntries,
    Ready,
}

/// Filter + group in one go for a given filter pair.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    pub program: Option<&'a str>,
    pub year: Option<YearOfStudy>,
    pub filtered: Vec<&'a TimetableEntry>,
    pub groups: DayGroups<'a>,
}

impl<'a> Projection<'a> {
    pub fn build(
        entries: &'a [TimetableEntry],
        program: Option<&'a str>,
        year: Option<YearOfStudy>,
    ) -> Self {
        let filtered = filter_entries(entries, program, year);
        let groups = group_by_day(&filtered);
        Self {
            program,
            year,
            filtered,
            groups,
        }
    }

    pub fn status(&self) -> ProjectionStatus {
        let program_set = self.program.is_some_and(|p| !p.is_empty());
        if !program_set || self.year.is_none() {
            ProjectionStatus::NoFilterSelected
        } else if self.filtered.is_empty() {
            ProjectionStatus::NoMatchingEntries
        } else {
            ProjectionStatus::Ready
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn entry(
        id: i64,
        program: &str,
        year: YearOfStudy,
        day: DayOfWeek,
        time: &str,
    ) -> TimetableEntry {
        TimetableEntry {
            id,
            created_at: Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
            program_of_study: program.to_string(),
            year_of_study: year,
            course_code: format!("C{id}"),
            course_name: format!("Course {id}"),
            venue: "Room 1".to_string(),
            day,
            time: time.to_string(),
        }
    }

    fn ids(entries: &[&TimetableEntry]) -> Vec<i64> {
        entries.iter().map(|entry| entry.id).collect()
    }

    fn sample() -> Vec<TimetableEntry> {
        use DayOfWeek::*;
        use YearOfStudy::*;
        vec![
            entry(1, "CS", First, Wednesday, "10:00"),
            entry(2, "Math", First, Monday, "09:00"),
            entry(3, "CS", First, Monday, "14:00"),
            entry(4, "CS", Second, Monday, "08:00"),
            entry(5, "CS", First, Monday, "08:30"),
            entry(6, "CS", First, Wednesday, "10:00"),
            entry(7, "CS", First, Friday, "07:45"),
            entry(8, "CS", First, Wednesday, "09:15"),
        ]
    }

    #[test]
    fn options_sort_years_by_enum_order_and_programs_lexically() {
        let entries = vec![
            entry(1, "CS", YearOfStudy::Third, DayOfWeek::Monday, "09:00"),
            entry(2, "CS", YearOfStudy::First, DayOfWeek::Monday, "09:00"),
            entry(3, "Math", YearOfStudy::First, DayOfWeek::Monday, "09:00"),
        ];

        let options = distinct_filter_options(&entries);
        assert_eq!(options.programs, vec!["CS", "Math"]);
        assert_eq!(options.years, vec![YearOfStudy::First, YearOfStudy::Third]);
    }

    #[test]
    fn options_ignore_label_ordering() {
        // Lexically "Masters" < "PhD" < "Second Year", which is not the order we want.
        let entries = vec![
            entry(1, "Physics", YearOfStudy::Phd, DayOfWeek::Monday, "09:00"),
            entry(2, "Bio", YearOfStudy::Second, DayOfWeek::Monday, "09:00"),
            entry(3, "Art", YearOfStudy::Masters, DayOfWeek::Monday, "09:00"),
        ];

        let options = distinct_filter_options(&entries);
        assert_eq!(
            options.years,
            vec![YearOfStudy::Second, YearOfStudy::Masters, YearOfStudy::Phd]
        );
        assert_eq!(options.programs, vec!["Art", "Bio", "Physics"]);
    }

    #[test]
    fn options_of_nothing_are_empty() {
        assert_eq!(distinct_filter_options(&[]), FilterOptions::default());
    }

    #[test]
    fn filter_keeps_only_matches_in_input_order() {
        let entries = sample();
        let filtered = filter_entries(&entries, Some("CS"), Some(YearOfStudy::First));

        assert_eq!(ids(&filtered), vec![1, 3, 5, 6, 7, 8]);
        assert!(filtered
            .iter()
            .all(|e| e.program_of_study == "CS" && e.year_of_study == YearOfStudy::First));
    }

    #[test]
    fn filter_needs_both_halves_of_the_pair() {
        let entries = sample();
        assert!(filter_entries(&entries, None, Some(YearOfStudy::First)).is_empty());
        assert!(filter_entries(&entries, Some("CS"), None).is_empty());
        assert!(filter_entries(&entries, Some(""), Some(YearOfStudy::First)).is_empty());
    }

    #[test]
    fn grouping_sorts_each_day_by_time() {
        let entries = vec![
            entry(1, "CS", YearOfStudy::First, DayOfWeek::Monday, "09:00"),
            entry(2, "CS", YearOfStudy::First, DayOfWeek::Monday, "08:00"),
        ];
        let filtered = filter_entries(&entries, Some("CS"), Some(YearOfStudy::First));
        let groups = group_by_day(&filtered);

        let monday = groups.get(DayOfWeek::Monday).unwrap();
        assert_eq!(ids(monday), vec![2, 1]);
        assert_eq!(groups.days().collect::<Vec<_>>(), vec![DayOfWeek::Monday]);
    }

    #[test]
    fn grouping_partitions_exactly_and_is_stable() {
        let entries = sample();
        let filtered = filter_entries(&entries, Some("CS"), Some(YearOfStudy::First));
        let groups = group_by_day(&filtered);

        assert_eq!(groups.entry_count(), filtered.len());
        let mut seen: Vec<i64> = groups.iter().flat_map(|(_, bucket)| ids(bucket)).collect();
        seen.sort();
        assert_eq!(seen, vec![1, 3, 5, 6, 7, 8]);

        for (day, bucket) in groups.iter() {
            assert!(bucket.iter().all(|e| e.day == day));
            assert!(bucket.windows(2).all(|w| w[0].time <= w[1].time));
        }

        // 1 and 6 share 10:00 on Wednesday; input order wins.
        assert_eq!(
            ids(groups.get(DayOfWeek::Wednesday).unwrap()),
            vec![8, 1, 6]
        );
        assert_eq!(ids(groups.get(DayOfWeek::Monday).unwrap()), vec![5, 3]);
    }

    #[test]
    fn grouping_iterates_in_calendar_order_with_absent_days_missing() {
        let entries = sample();
        let filtered = filter_entries(&entries, Some("CS"), Some(YearOfStudy::First));
        let groups = group_by_day(&filtered);

        assert_eq!(
            groups.days().collect::<Vec<_>>(),
            vec![DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]
        );
        assert!(groups.get(DayOfWeek::Tuesday).is_none());
        assert!(groups.get(DayOfWeek::Sunday).is_none());
    }

    #[test]
    fn zero_matches_give_empty_grouping() {
        let entries = sample();
        let projection = Projection::build(&entries, Some("Math"), Some(YearOfStudy::Phd));

        assert!(projection.filtered.is_empty());
        assert!(projection.groups.is_empty());
        assert!(ordered_days()
            .iter()
            .all(|day| projection.groups.get(*day).is_none()));
        assert_eq!(projection.status(), ProjectionStatus::NoMatchingEntries);
    }

    #[test]
    fn status_separates_unset_filters_from_no_matches() {
        let entries = sample();
        assert_eq!(
            Projection::build(&entries, None, Some(YearOfStudy::First)).status(),
            ProjectionStatus::NoFilterSelected
        );
        assert_eq!(
            Projection::build(&entries, Some("CS"), Some(YearOfStudy::First)).status(),
            ProjectionStatus::Ready
        );
    }

    #[test]
    fn ordered_days_start_on_monday() {
        let days = ordered_days();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], DayOfWeek::Monday);
        assert_eq!(days[6], DayOfWeek::Sunday);
    }
}
