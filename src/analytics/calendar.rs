use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::models::Assignment;

/// Items a day cell shows before collapsing into "+N more".
pub const DAY_DISPLAY_CAP: usize = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_selected: bool,
    pub is_today: bool,
    /// Every assignment due on this day, uncapped.
    pub assignments: Vec<Assignment>,
}

impl DayCell {
    /// How many assignments fall beyond the display cap.
    pub fn overflow(&self) -> usize {
        self.assignments.len().saturating_sub(DAY_DISPLAY_CAP)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.days.chunks(7)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }
}

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn last_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
}

/// `None` when the week leaves chrono's representable range.
fn start_of_week(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

fn end_of_week(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(6 - u64::from(date.weekday().num_days_from_sunday())))
}

/// Visible date range for a month: Sunday on or before the 1st through
/// Saturday on or after the last day.
pub fn grid_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = first_of_month(year, month)?;
    let last = last_of_month(year, month)?;
    Some((start_of_week(first)?, end_of_week(last)?))
}

/// Assignments due on `day`, compared by calendar date only.
pub fn assignments_on(assignments: &[Assignment], day: NaiveDate) -> Vec<Assignment> {
    assignments
        .iter()
        .filter(|a| a.due_date.date_naive() == day)
        .cloned()
        .collect()
}

/// Build the whole-week grid for `year`/`month`. `None` for an invalid month
/// or one whose padding weeks fall outside the supported date range.
pub fn month_grid(
    year: i32,
    month: u32,
    selected: NaiveDate,
    today: NaiveDate,
    assignments: &[Assignment],
) -> Option<MonthGrid> {
    let (start, end) = grid_range(year, month)?;

    let days = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| DayCell {
            date,
            in_month: date.year() == year && date.month() == month,
            is_selected: date == selected,
            is_today: date == today,
            assignments: assignments_on(assignments, date),
        })
        .collect();

    Some(MonthGrid { year, month, days })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{TimeZone, Utc, Weekday};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn due(id: i64, y: i32, m: u32, d: u32, hour: u32) -> Assignment {
        Assignment {
            id,
            course_id: 1,
            title: format!("A{}", id),
            description: None,
            due_date: Utc.with_ymd_and_hms(y, m, d, hour, 30, 0).unwrap(),
            priority: Priority::Medium,
            total_points: 10.0,
            completed: false,
            grade: None,
        }
    }

    #[test]
    fn test_grid_covers_whole_weeks() {
        for month in 1..=12 {
            let grid = month_grid(2024, month, day(2024, month, 1), day(2024, 1, 1), &[]).unwrap();
            assert_eq!(grid.days.len() % 7, 0, "month {}", month);
            assert_eq!(grid.first_day().unwrap().weekday(), Weekday::Sun);
            assert_eq!(grid.last_day().unwrap().weekday(), Weekday::Sat);
            assert!(grid.weeks().all(|w| w.len() == 7));
        }
    }

    #[test]
    fn test_february_2024_grid() {
        // Feb 1st 2024 is a Thursday, Feb 29th a Thursday
        let (start, end) = grid_range(2024, 2).unwrap();
        assert_eq!(start, day(2024, 1, 28));
        assert_eq!(end, day(2024, 3, 2));

        let grid = month_grid(2024, 2, day(2024, 2, 14), day(2024, 2, 20), &[]).unwrap();
        assert_eq!(grid.days.len(), 35);
        assert!(!grid.days[0].in_month);
        assert!(grid.days[4].in_month);
        assert_eq!(grid.days.iter().filter(|d| d.in_month).count(), 29);
        assert_eq!(grid.days.iter().filter(|d| d.is_selected).count(), 1);
        assert_eq!(grid.days.iter().filter(|d| d.is_today).count(), 1);
    }

    #[test]
    fn test_flags_are_independent() {
        // selected and today both in the leading days of the previous month
        let grid = month_grid(2024, 2, day(2024, 1, 29), day(2024, 1, 29), &[]).unwrap();
        let cell = grid.days.iter().find(|d| d.date == day(2024, 1, 29)).unwrap();
        assert!(!cell.in_month);
        assert!(cell.is_selected);
        assert!(cell.is_today);
    }

    #[test]
    fn test_every_visible_assignment_lands_in_one_bucket() {
        let assignments = vec![
            due(1, 2024, 1, 28, 0),
            due(2, 2024, 2, 14, 23),
            due(3, 2024, 2, 14, 1),
            due(4, 2024, 2, 14, 12),
            due(5, 2024, 3, 2, 9),
            due(6, 2024, 3, 3, 9),
        ];
        let grid = month_grid(2024, 2, day(2024, 2, 1), day(2024, 2, 1), &assignments).unwrap();

        for a in &assignments[..5] {
            let hits = grid
                .days
                .iter()
                .filter(|d| d.assignments.iter().any(|x| x.id == a.id))
                .count();
            assert_eq!(hits, 1, "assignment {}", a.id);
        }
        let outside = grid
            .days
            .iter()
            .flat_map(|d| d.assignments.iter())
            .any(|x| x.id == 6);
        assert!(!outside);

        let valentines = grid.days.iter().find(|d| d.date == day(2024, 2, 14)).unwrap();
        assert_eq!(valentines.assignments.len(), 3);
        assert_eq!(valentines.overflow(), 1);
    }

    #[test]
    fn test_invalid_month() {
        assert!(month_grid(2024, 13, day(2024, 1, 1), day(2024, 1, 1), &[]).is_none());
        assert_eq!(last_of_month(2023, 12), Some(day(2023, 12, 31)));
    }

    #[test]
    fn test_months_at_the_date_range_edges() {
        let min_year = NaiveDate::MIN.year();
        // the first week of the earliest month starts before the earliest date
        assert_eq!(grid_range(min_year, 1), None);
        assert!(month_grid(min_year, 1, NaiveDate::MIN, NaiveDate::MIN, &[]).is_none());
        assert!(grid_range(min_year, 3).is_some());

        let max_year = NaiveDate::MAX.year();
        if let Some((start, end)) = grid_range(max_year, 12) {
            assert_eq!(start.weekday(), Weekday::Sun);
            assert_eq!(end.weekday(), Weekday::Sat);
        }
        assert!(grid_range(max_year, 6).is_some());
    }
}
