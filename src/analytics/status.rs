use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{Assignment, Priority};

/// Length of the due-soon window `[now, now + 3 days)`.
pub const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStatus {
    Completed,
    Overdue,
    DueSoon,
    Upcoming,
}

impl AssignmentStatus {
    /// Badge variant shown next to an assignment.
    pub fn badge(&self) -> &'static str {
        match self {
            AssignmentStatus::Completed => "success",
            AssignmentStatus::Overdue => "error",
            AssignmentStatus::DueSoon => "warning",
            AssignmentStatus::Upcoming => "default",
        }
    }
}

pub fn classify(assignment: &Assignment, now: DateTime<Utc>) -> AssignmentStatus {
    classify_parts(assignment.completed, assignment.due_date, now)
}

pub fn classify_parts(completed: bool, due_date: DateTime<Utc>, now: DateTime<Utc>) -> AssignmentStatus {
    if completed {
        AssignmentStatus::Completed
    } else if due_date < now {
        AssignmentStatus::Overdue
    } else if due_date < now + Duration::days(DUE_SOON_DAYS) {
        AssignmentStatus::DueSoon
    } else {
        AssignmentStatus::Upcoming
    }
}

/// Badge variant for a priority level.
pub fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "error",
        Priority::Medium => "warning",
        Priority::Low => "success",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_classification_relative_to_now() {
        let now = at(2024, 1, 10);
        assert_eq!(classify_parts(false, at(2024, 1, 9), now), AssignmentStatus::Overdue);
        assert_eq!(classify_parts(false, at(2024, 1, 12), now), AssignmentStatus::DueSoon);
        assert_eq!(classify_parts(false, at(2024, 1, 20), now), AssignmentStatus::Upcoming);
    }

    #[test]
    fn test_completed_wins_regardless_of_date() {
        let now = at(2024, 1, 10);
        for due in [at(2023, 12, 1), at(2024, 1, 10), at(2024, 1, 11), at(2025, 1, 1)] {
            assert_eq!(classify_parts(true, due, now), AssignmentStatus::Completed);
        }
    }

    #[test]
    fn test_window_edges() {
        let now = at(2024, 1, 10);
        // due exactly now is not overdue
        assert_eq!(classify_parts(false, now, now), AssignmentStatus::DueSoon);
        assert_eq!(
            classify_parts(false, now - Duration::seconds(1), now),
            AssignmentStatus::Overdue
        );
        assert_eq!(
            classify_parts(false, now + Duration::days(3) - Duration::seconds(1), now),
            AssignmentStatus::DueSoon
        );
        assert_eq!(classify_parts(false, at(2024, 1, 13), now), AssignmentStatus::Upcoming);
    }

    #[test]
    fn test_badges() {
        assert_eq!(AssignmentStatus::Overdue.badge(), "error");
        assert_eq!(AssignmentStatus::Upcoming.badge(), "default");
        assert_eq!(priority_badge(Priority::Low), "success");
        assert_eq!(priority_badge(Priority::High), "error");
    }
}
