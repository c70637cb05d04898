use crate::analytics::grading::to_gpa_point;
use crate::models::{Assignment, Course};

/// Points-weighted percentage of a set of assignments: `sum(grade) / sum(total) * 100`.
/// Only completed, graded assignments count. `None` when nothing is graded.
pub fn weighted_percentage<'a, I>(assignments: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let (earned, total, count) = assignments
        .into_iter()
        .filter_map(|a| a.earned_points().map(|grade| (grade, a.total_points)))
        .fold((0.0, 0.0, 0usize), |(earned, total, n), (grade, points)| {
            (earned + grade, total + points, n + 1)
        });

    if count == 0 || total <= 0.0 {
        None
    } else {
        Some(earned / total * 100.0)
    }
}

/// A course's percentage grade, or `None` when it has no graded work.
pub fn course_grade(assignments: &[Assignment], course_id: i64) -> Option<f64> {
    weighted_percentage(assignments.iter().filter(|a| a.course_id == course_id))
}

/// Unweighted mean of the graded courses' percentages, mapped to the 4.0 scale.
/// Reports 0.0 when no course has a grade, the same value a failing average gets.
pub fn overall_gpa(courses: &[Course], assignments: &[Assignment]) -> f64 {
    let grades: Vec<f64> = courses
        .iter()
        .filter_map(|course| course_grade(assignments, course.id))
        .collect();

    if grades.is_empty() {
        return 0.0;
    }

    let average = grades.iter().sum::<f64>() / grades.len() as f64;
    to_gpa_point(average)
}

/// GPA of every graded assignment pooled together, regardless of course.
pub fn points_gpa(assignments: &[Assignment]) -> f64 {
    weighted_percentage(assignments).map(to_gpa_point).unwrap_or(0.0)
}

pub fn graded_count<'a, I>(assignments: I) -> usize
where
    I: IntoIterator<Item = &'a Assignment>,
{
    assignments.into_iter().filter(|a| a.earned_points().is_some()).count()
}
