//! View models built from a loaded [`Snapshot`]. Pure: "now" is always passed in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::analytics::aggregate::{self, course_grade, graded_count, overall_gpa, points_gpa};
use crate::analytics::calendar::{self, MonthGrid};
use crate::analytics::filter::{AssignmentFilter, due_order, filter_and_sort};
use crate::analytics::grading::{BreakdownTier, ColorTier, to_breakdown_tier, to_color_tier, to_letter_grade};
use crate::analytics::status::{AssignmentStatus, classify, priority_badge};
use crate::models::{Assignment, Course, CourseLabel};
use crate::services::tracker::Snapshot;

const UPCOMING_LIMIT: usize = 5;
const DASHBOARD_COURSE_LIMIT: usize = 5;

/// One assignment row with everything a list needs to render it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub course: CourseLabel,
    pub status: AssignmentStatus,
    pub status_badge: &'static str,
    pub priority_badge: &'static str,
}

impl AssignmentRow {
    pub fn build(assignment: Assignment, courses: &[Course], now: DateTime<Utc>) -> Self {
        let status = classify(&assignment, now);
        Self {
            course: CourseLabel::resolve(courses, assignment.course_id),
            status,
            status_badge: status.badge(),
            priority_badge: priority_badge(assignment.priority),
            assignment,
        }
    }
}

fn rows(assignments: Vec<Assignment>, courses: &[Course], now: DateTime<Utc>) -> Vec<AssignmentRow> {
    assignments
        .into_iter()
        .map(|a| AssignmentRow::build(a, courses, now))
        .collect()
}

/// Not completed and due strictly after `now`, soonest first.
fn upcoming(assignments: &[Assignment], now: DateTime<Utc>, limit: usize) -> Vec<Assignment> {
    let mut pending: Vec<Assignment> = assignments
        .iter()
        .filter(|a| !a.completed && a.due_date > now)
        .cloned()
        .collect();
    pending.sort_by(|a, b| a.due_date.cmp(&b.due_date));
    pending.truncate(limit);
    pending
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentList {
    pub count: usize,
    pub assignments: Vec<AssignmentRow>,
}

pub fn assignment_list(snapshot: &Snapshot, filter: &AssignmentFilter, now: DateTime<Utc>) -> AssignmentList {
    let matched = filter_and_sort(&snapshot.assignments, filter, now);
    AssignmentList {
        count: matched.len(),
        assignments: rows(matched, &snapshot.courses, now),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course: CourseLabel,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Points-weighted over every graded assignment; 0.0 when nothing is graded.
    pub current_gpa: f64,
    pub active_courses: usize,
    pub completed_assignments: usize,
    pub total_assignments: usize,
    pub overdue_count: usize,
    pub upcoming: Vec<AssignmentRow>,
    pub course_progress: Vec<CourseProgress>,
}

pub fn dashboard(snapshot: &Snapshot, now: DateTime<Utc>) -> Dashboard {
    let assignments = &snapshot.assignments;

    let course_progress = snapshot
        .courses
        .iter()
        .take(DASHBOARD_COURSE_LIMIT)
        .map(|course| {
            let own = assignments.iter().filter(|a| a.course_id == course.id);
            let (completed, total) = own.fold((0, 0), |(done, all), a| {
                (done + usize::from(a.completed), all + 1)
            });
            CourseProgress {
                course: CourseLabel::resolve(&snapshot.courses, course.id),
                completed,
                total,
            }
        })
        .collect();

    Dashboard {
        current_gpa: points_gpa(assignments),
        active_courses: snapshot.courses.len(),
        completed_assignments: assignments.iter().filter(|a| a.completed).count(),
        total_assignments: assignments.len(),
        overdue_count: assignments
            .iter()
            .filter(|a| classify(a, now) == AssignmentStatus::Overdue)
            .count(),
        upcoming: rows(upcoming(assignments, now, UPCOMING_LIMIT), &snapshot.courses, now),
        course_progress,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCard {
    #[serde(flatten)]
    pub course: Course,
    pub total_assignments: usize,
    pub completed_assignments: usize,
    /// Percentage of assignments completed, 0 when there are none.
    pub completion_rate: f64,
    pub current_grade: Option<f64>,
}

pub fn course_cards(snapshot: &Snapshot) -> Vec<CourseCard> {
    snapshot
        .courses
        .iter()
        .map(|course| {
            let own: Vec<&Assignment> = snapshot
                .assignments
                .iter()
                .filter(|a| a.course_id == course.id)
                .collect();
            let completed = own.iter().filter(|a| a.completed).count();
            let completion_rate = if own.is_empty() {
                0.0
            } else {
                completed as f64 / own.len() as f64 * 100.0
            };
            CourseCard {
                course: course.clone(),
                total_assignments: own.len(),
                completed_assignments: completed,
                completion_rate,
                current_grade: course_grade(&snapshot.assignments, course.id),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAssignment {
    pub id: i64,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub priority: crate::models::Priority,
    pub grade: f64,
    pub total_points: f64,
    pub percentage: f64,
    pub tier: ColorTier,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseBreakdown {
    pub course: Course,
    pub percentage: Option<f64>,
    pub letter: Option<&'static str>,
    pub badge: Option<BreakdownTier>,
    pub progress: Option<ColorTier>,
    pub assignments: Vec<GradedAssignment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesReport {
    pub has_grades: bool,
    pub overall_gpa: f64,
    pub courses_with_grades: usize,
    pub total_courses: usize,
    pub graded_assignments: usize,
    pub breakdown: Vec<CourseBreakdown>,
}

/// Grade report, optionally narrowed to one course's breakdown.
pub fn grades_report(snapshot: &Snapshot, selected_course: Option<i64>) -> GradesReport {
    let assignments = &snapshot.assignments;

    let breakdown = snapshot
        .courses
        .iter()
        .filter(|c| selected_course.is_none_or(|id| c.id == id))
        .map(|course| {
            let percentage = course_grade(assignments, course.id);
            let graded = assignments
                .iter()
                .filter(|a| a.course_id == course.id)
                .filter_map(|a| {
                    let grade = a.earned_points()?;
                    let percentage = a.percentage()?;
                    Some(GradedAssignment {
                        id: a.id,
                        title: a.title.clone(),
                        due_date: a.due_date,
                        priority: a.priority,
                        grade,
                        total_points: a.total_points,
                        percentage,
                        tier: to_color_tier(percentage),
                    })
                })
                .collect();
            CourseBreakdown {
                course: course.clone(),
                percentage,
                letter: percentage.map(to_letter_grade),
                badge: percentage.map(to_breakdown_tier),
                progress: percentage.map(to_color_tier),
                assignments: graded,
            }
        })
        .collect();

    // orphaned assignments have no breakdown row, so they do not count as grades
    let graded = graded_count(
        assignments
            .iter()
            .filter(|a| snapshot.courses.iter().any(|c| c.id == a.course_id)),
    );
    GradesReport {
        has_grades: graded > 0,
        overall_gpa: overall_gpa(&snapshot.courses, assignments),
        courses_with_grades: snapshot
            .courses
            .iter()
            .filter(|c| aggregate::course_grade(assignments, c.id).is_some())
            .count(),
        total_courses: snapshot.courses.len(),
        graded_assignments: graded,
        breakdown,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub grid: MonthGrid,
    pub selected_date: NaiveDate,
    pub selected: Vec<AssignmentRow>,
    pub upcoming: Vec<AssignmentRow>,
}

/// `None` when `year`/`month` do not name a real month.
pub fn calendar_view(
    snapshot: &Snapshot,
    year: i32,
    month: u32,
    selected_date: NaiveDate,
    now: DateTime<Utc>,
) -> Option<CalendarView> {
    let grid = calendar::month_grid(year, month, selected_date, now.date_naive(), &snapshot.assignments)?;

    let mut on_selected = calendar::assignments_on(&snapshot.assignments, selected_date);
    on_selected.sort_by(due_order);

    Some(CalendarView {
        grid,
        selected_date,
        selected: rows(on_selected, &snapshot.courses, now),
        upcoming: rows(upcoming(&snapshot.assignments, now, UPCOMING_LIMIT), &snapshot.courses, now),
    })
}
