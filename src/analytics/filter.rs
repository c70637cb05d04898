use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::status::{AssignmentStatus, classify};
use crate::error::{AppError, FieldErrors};
use crate::models::{Assignment, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
    DueSoon,
}

impl StatusFilter {
    fn admits(&self, assignment: &Assignment, now: DateTime<Utc>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !assignment.completed,
            StatusFilter::Completed => assignment.completed,
            StatusFilter::Overdue => classify(assignment, now) == AssignmentStatus::Overdue,
            StatusFilter::DueSoon => classify(assignment, now) == AssignmentStatus::DueSoon,
        }
    }
}

/// Active filters; `None` means "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignmentFilter {
    pub status: StatusFilter,
    pub course: Option<i64>,
    pub priority: Option<Priority>,
}

/// Filter values as they arrive in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub status: Option<String>,
    pub course: Option<String>,
    pub priority: Option<String>,
}

impl TryFrom<FilterQuery> for AssignmentFilter {
    type Error = AppError;

    fn try_from(query: FilterQuery) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        let mut filter = AssignmentFilter::default();

        match query.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => {}
            Some("pending") => filter.status = StatusFilter::Pending,
            Some("completed") => filter.status = StatusFilter::Completed,
            Some("overdue") => filter.status = StatusFilter::Overdue,
            Some("due-soon") => filter.status = StatusFilter::DueSoon,
            Some(other) => errors.add("status", format!("Unknown status filter: {}", other)),
        }

        match query.course.as_deref().map(str::trim) {
            None | Some("") | Some("all") => {}
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => filter.course = Some(id),
                Err(_) => errors.add("course", format!("Unknown course filter: {}", raw)),
            },
        }

        match query.priority.as_deref().map(str::trim) {
            None | Some("") | Some("all") => {}
            Some(raw) => match raw.parse::<Priority>() {
                Ok(p) => filter.priority = Some(p),
                Err(_) => errors.add("priority", format!("Unknown priority filter: {}", raw)),
            },
        }

        errors.into_result()?;
        Ok(filter)
    }
}

impl AssignmentFilter {
    pub fn matches(&self, assignment: &Assignment, now: DateTime<Utc>) -> bool {
        self.status.admits(assignment, now)
            && self.course.is_none_or(|id| assignment.course_id == id)
            && self.priority.is_none_or(|p| assignment.priority == p)
    }
}

/// Due date ascending, then higher priority first.
pub fn due_order(a: &Assignment, b: &Assignment) -> Ordering {
    a.due_date
        .cmp(&b.due_date)
        .then_with(|| b.priority.weight().cmp(&a.priority.weight()))
}

/// Apply every active filter and return survivors in due order.
/// The sort is stable, so equal keys keep their input order.
pub fn filter_and_sort(
    assignments: &[Assignment],
    filter: &AssignmentFilter,
    now: DateTime<Utc>,
) -> Vec<Assignment> {
    let mut matched: Vec<Assignment> = assignments
        .iter()
        .filter(|a| filter.matches(a, now))
        .cloned()
        .collect();
    matched.sort_by(due_order);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn assignment(id: i64, course_id: i64, due: DateTime<Utc>, priority: Priority) -> Assignment {
        Assignment {
            id,
            course_id,
            title: format!("A{}", id),
            description: None,
            due_date: due,
            priority,
            total_points: 10.0,
            completed: false,
            grade: None,
        }
    }

    fn ids(list: &[Assignment]) -> Vec<i64> {
        list.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_sort_date_then_priority() {
        let a = assignment(1, 1, at(2024, 2, 1), Priority::High);
        let b = assignment(2, 1, at(2024, 2, 1), Priority::Low);
        let c = assignment(3, 1, at(2024, 1, 15), Priority::Medium);

        let sorted = filter_and_sort(&[b, a, c], &AssignmentFilter::default(), at(2024, 1, 1));
        assert_eq!(ids(&sorted), vec![3, 1, 2]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let list: Vec<Assignment> = (1..=5)
            .map(|id| assignment(id, 1, at(2024, 3, 1), Priority::Medium))
            .collect();
        let first = filter_and_sort(&list, &AssignmentFilter::default(), at(2024, 1, 1));
        let second = filter_and_sort(&list, &AssignmentFilter::default(), at(2024, 1, 1));
        assert_eq!(ids(&first), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_status_filters_follow_classifier() {
        let now = at(2024, 1, 10);
        let overdue = assignment(1, 1, at(2024, 1, 9), Priority::Low);
        let soon = assignment(2, 1, at(2024, 1, 12), Priority::Low);
        let later = assignment(3, 1, at(2024, 1, 20), Priority::Low);
        let mut done = assignment(4, 1, at(2024, 1, 5), Priority::Low);
        done.completed = true;
        let list = vec![overdue, soon, later, done];

        let run = |status| {
            let filter = AssignmentFilter { status, ..Default::default() };
            ids(&filter_and_sort(&list, &filter, now))
        };

        assert_eq!(run(StatusFilter::All), vec![4, 1, 2, 3]);
        assert_eq!(run(StatusFilter::Pending), vec![1, 2, 3]);
        assert_eq!(run(StatusFilter::Completed), vec![4]);
        assert_eq!(run(StatusFilter::Overdue), vec![1]);
        assert_eq!(run(StatusFilter::DueSoon), vec![2]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let list = vec![
            assignment(1, 1, at(2024, 2, 1), Priority::High),
            assignment(2, 2, at(2024, 2, 1), Priority::High),
            assignment(3, 1, at(2024, 2, 2), Priority::Low),
        ];
        let filter = AssignmentFilter {
            status: StatusFilter::All,
            course: Some(1),
            priority: Some(Priority::High),
        };
        assert_eq!(ids(&filter_and_sort(&list, &filter, at(2024, 1, 1))), vec![1]);
    }

    #[test]
    fn test_query_parsing() {
        let filter = AssignmentFilter::try_from(FilterQuery {
            status: Some("due-soon".to_string()),
            course: Some("4".to_string()),
            priority: Some("all".to_string()),
        })
        .expect("valid query");
        assert_eq!(filter.status, StatusFilter::DueSoon);
        assert_eq!(filter.course, Some(4));
        assert_eq!(filter.priority, None);

        let bad = AssignmentFilter::try_from(FilterQuery {
            status: Some("late".to_string()),
            course: Some("abc".to_string()),
            priority: Some("urgent".to_string()),
        });
        match bad {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
